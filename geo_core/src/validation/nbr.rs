//! # NBR 6122:2019 Checks
//!
//! Normative tables used to judge a shallow footing:
//!
//! | Load combination | Minimum FS |   | Structure        | Settlement limit |
//! |------------------|------------|---|------------------|------------------|
//! | Normal           | 2.0        |   | Ordinary building| 25 mm            |
//! | Special          | 1.8        |   | Tall building    | 15 mm            |
//! | Exceptional      | 1.6        |   | Bridge / viaduct | 10 mm            |
//! |                  |            |   | Tank / silo      | 20 mm            |
//!
//! plus the presumptive admissible pressure of each soil class (Annex A) and
//! the water-table assessment of item 4.2.3.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{check_bearing, check_settlement, BearingCheck, SettlementCheck};

/// Load combination of NBR 6122 Table 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadCombination {
    #[default]
    Normal,
    Special,
    Exceptional,
}

impl LoadCombination {
    pub const ALL: [LoadCombination; 3] = [
        LoadCombination::Normal,
        LoadCombination::Special,
        LoadCombination::Exceptional,
    ];

    /// Minimum global safety factor against bearing failure
    pub fn minimum_safety_factor(self) -> f64 {
        match self {
            LoadCombination::Normal => 2.0,
            LoadCombination::Special => 1.8,
            LoadCombination::Exceptional => 1.6,
        }
    }
}

impl fmt::Display for LoadCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadCombination::Normal => write!(f, "normal"),
            LoadCombination::Special => write!(f, "special"),
            LoadCombination::Exceptional => write!(f, "exceptional"),
        }
    }
}

/// Structure class of NBR 6122 Table 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    #[default]
    OrdinaryBuilding,
    TallBuilding,
    BridgeViaduct,
    TankSilo,
}

impl StructureType {
    pub const ALL: [StructureType; 4] = [
        StructureType::OrdinaryBuilding,
        StructureType::TallBuilding,
        StructureType::BridgeViaduct,
        StructureType::TankSilo,
    ];

    /// Admissible settlement (m)
    pub fn settlement_limit_m(self) -> f64 {
        match self {
            StructureType::OrdinaryBuilding => 0.025,
            StructureType::TallBuilding => 0.015,
            StructureType::BridgeViaduct => 0.010,
            StructureType::TankSilo => 0.020,
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StructureType::OrdinaryBuilding => "ordinary building",
            StructureType::TallBuilding => "tall building",
            StructureType::BridgeViaduct => "bridge or viaduct",
            StructureType::TankSilo => "tank or silo",
        };
        f.write_str(name)
    }
}

/// Soil class (NBR 6484 description)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilClass {
    SoftClay,
    StiffClay,
    Silt,
    FineSand,
    MediumSand,
    CoarseSand,
    Gravel,
    SedimentaryRock,
    IgneousRock,
}

impl SoilClass {
    pub const ALL: [SoilClass; 9] = [
        SoilClass::SoftClay,
        SoilClass::StiffClay,
        SoilClass::Silt,
        SoilClass::FineSand,
        SoilClass::MediumSand,
        SoilClass::CoarseSand,
        SoilClass::Gravel,
        SoilClass::SedimentaryRock,
        SoilClass::IgneousRock,
    ];

    /// Presumptive admissible pressure (kPa), NBR 6122 Annex A
    pub fn presumptive_pressure_kpa(self) -> f64 {
        match self {
            SoilClass::SoftClay => 50.0,
            SoilClass::StiffClay => 200.0,
            SoilClass::Silt => 100.0,
            SoilClass::FineSand => 150.0,
            SoilClass::MediumSand => 250.0,
            SoilClass::CoarseSand => 400.0,
            SoilClass::Gravel => 600.0,
            SoilClass::SedimentaryRock => 1000.0,
            SoilClass::IgneousRock => 2000.0,
        }
    }
}

impl fmt::Display for SoilClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SoilClass::SoftClay => "soft clay",
            SoilClass::StiffClay => "stiff clay",
            SoilClass::Silt => "silt",
            SoilClass::FineSand => "fine sand",
            SoilClass::MediumSand => "medium sand",
            SoilClass::CoarseSand => "coarse sand",
            SoilClass::Gravel => "gravel",
            SoilClass::SedimentaryRock => "sedimentary rock",
            SoilClass::IgneousRock => "igneous rock",
        };
        f.write_str(name)
    }
}

/// Applied pressure against the presumptive value of the soil class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresumptiveCheck {
    pub soil_class: SoilClass,
    pub admissible_kpa: f64,
    pub applied_kpa: f64,
    pub passes: bool,
}

pub fn check_presumptive_pressure(soil_class: SoilClass, applied_kpa: f64) -> PresumptiveCheck {
    let admissible_kpa = soil_class.presumptive_pressure_kpa();
    PresumptiveCheck {
        soil_class,
        admissible_kpa,
        applied_kpa,
        passes: applied_kpa <= admissible_kpa,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    High,
}

/// Position of the footing base relative to the water table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterTableAssessment {
    pub below_water_table: bool,
    pub foundation_depth_m: f64,
    pub water_table_depth_m: f64,
    pub risk: RiskLevel,
    pub recommendation: String,
}

/// A base deeper than the water table is high risk.
pub fn assess_water_table(foundation_depth_m: f64, water_table_depth_m: f64) -> WaterTableAssessment {
    let below_water_table = foundation_depth_m > water_table_depth_m;
    let (risk, recommendation) = if below_water_table {
        (
            RiskLevel::High,
            "Base below the water table: use submerged unit weights, plan for dewatering and check piping in sands."
                .to_string(),
        )
    } else {
        (
            RiskLevel::Low,
            "Base above the water table: favourable conditions for excavation.".to_string(),
        )
    };
    WaterTableAssessment {
        below_water_table,
        foundation_depth_m,
        water_table_depth_m,
        risk,
        recommendation,
    }
}

/// Everything NBR 6122 says about one footing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NbrCompliance {
    pub load_combination: LoadCombination,
    pub structure_type: Option<StructureType>,
    /// qu / q against the combination minimum
    pub bearing: BearingCheck,
    /// Final settlement against the structure limit
    pub settlement: SettlementCheck,
    pub presumptive: Option<PresumptiveCheck>,
    pub water_table: Option<WaterTableAssessment>,
}

impl NbrCompliance {
    /// Bearing and settlement both within the norm. The presumptive value and
    /// the water table are advisory.
    pub fn passes(&self) -> bool {
        self.bearing.passes && self.settlement.passes
    }
}

/// Inputs of [`evaluate_nbr`]
#[derive(Debug, Clone, Copy)]
pub struct NbrInputs {
    pub ultimate_kpa: f64,
    /// Pressure the bearing check is made against (kPa)
    pub applied_kpa: f64,
    pub settlement_m: f64,
    /// Used when no structure type is given (m)
    pub default_settlement_limit_m: f64,
    pub load_combination: LoadCombination,
    pub structure_type: Option<StructureType>,
    pub soil_class: Option<SoilClass>,
    pub embedment_depth_m: f64,
    pub water_table_depth_m: Option<f64>,
}

pub fn evaluate_nbr(inputs: &NbrInputs) -> NbrCompliance {
    let limit = inputs
        .structure_type
        .map(StructureType::settlement_limit_m)
        .unwrap_or(inputs.default_settlement_limit_m);
    NbrCompliance {
        load_combination: inputs.load_combination,
        structure_type: inputs.structure_type,
        bearing: check_bearing(
            inputs.ultimate_kpa,
            inputs.applied_kpa,
            inputs.load_combination.minimum_safety_factor(),
        ),
        settlement: check_settlement(inputs.settlement_m, limit),
        presumptive: inputs
            .soil_class
            .map(|class| check_presumptive_pressure(class, inputs.applied_kpa)),
        water_table: inputs
            .water_table_depth_m
            .map(|dw| assess_water_table(inputs.embedment_depth_m, dw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> NbrInputs {
        NbrInputs {
            ultimate_kpa: 380.0,
            applied_kpa: 200.0,
            settlement_m: 0.018,
            default_settlement_limit_m: 0.025,
            load_combination: LoadCombination::Normal,
            structure_type: None,
            soil_class: None,
            embedment_depth_m: 1.0,
            water_table_depth_m: None,
        }
    }

    #[test]
    fn test_combination_safety_factors() {
        let factors: Vec<f64> = LoadCombination::ALL.iter().map(|c| c.minimum_safety_factor()).collect();
        assert_eq!(factors, [2.0, 1.8, 1.6]);
    }

    #[test]
    fn test_structure_limits() {
        let mm: Vec<f64> = StructureType::ALL.iter().map(|s| s.settlement_limit_m() * 1000.0).collect();
        assert_eq!(mm, [25.0, 15.0, 10.0, 20.0]);
    }

    #[test]
    fn test_presumptive_pressures() {
        assert_eq!(SoilClass::SoftClay.presumptive_pressure_kpa(), 50.0);
        assert_eq!(SoilClass::MediumSand.presumptive_pressure_kpa(), 250.0);
        assert_eq!(SoilClass::IgneousRock.presumptive_pressure_kpa(), 2000.0);
        assert!(check_presumptive_pressure(SoilClass::MediumSand, 250.0).passes);
        assert!(!check_presumptive_pressure(SoilClass::Silt, 120.0).passes);
    }

    #[test]
    fn test_combination_changes_verdict() {
        // FS = 1.9
        let normal = evaluate_nbr(&inputs());
        assert!(!normal.bearing.passes);
        assert_eq!(normal.bearing.required_safety_factor, 2.0);

        let special = evaluate_nbr(&NbrInputs {
            load_combination: LoadCombination::Special,
            ..inputs()
        });
        assert!(special.bearing.passes);
    }

    #[test]
    fn test_structure_type_sets_limit() {
        let default = evaluate_nbr(&NbrInputs {
            ultimate_kpa: 1000.0,
            ..inputs()
        });
        assert!(default.passes());
        assert_eq!(default.settlement.limit_m, 0.025);

        let tall = evaluate_nbr(&NbrInputs {
            ultimate_kpa: 1000.0,
            structure_type: Some(StructureType::TallBuilding),
            ..inputs()
        });
        assert!(!tall.passes());
        assert_eq!(tall.settlement.limit_m, 0.015);
    }

    #[test]
    fn test_water_table_assessment() {
        let below = assess_water_table(2.0, 1.5);
        assert!(below.below_water_table);
        assert_eq!(below.risk, RiskLevel::High);
        assert!(below.recommendation.contains("dewatering"));

        let above = assess_water_table(1.0, 1.0);
        assert!(!above.below_water_table);
        assert_eq!(above.risk, RiskLevel::Low);

        let report = evaluate_nbr(&NbrInputs {
            water_table_depth_m: Some(0.5),
            soil_class: Some(SoilClass::FineSand),
            ..inputs()
        });
        assert_eq!(report.water_table.map(|w| w.risk), Some(RiskLevel::High));
        assert_eq!(report.presumptive.map(|p| p.admissible_kpa), Some(150.0));
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&StructureType::BridgeViaduct).unwrap(), "\"bridge_viaduct\"");
        let class: SoilClass = serde_json::from_str("\"stiff_clay\"").unwrap();
        assert_eq!(class, SoilClass::StiffClay);
    }
}
