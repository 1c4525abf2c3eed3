//! # Analysis Pipeline
//!
//! One call runs a complete shallow-footing study:
//!
//! 1. Validate the request (every violation reported together)
//! 2. Run the reference-case self check
//! 3. Evaluate the stress bulb
//! 4. Bearing capacity, immediate and consolidation settlement, and their
//!    design checks
//! 5. NBR 6122 compliance (load combination, structure type, soil class,
//!    water table)
//!
//! ## Example
//!
//! ```rust
//! use geo_core::analysis::{analyze, AnalysisRequest};
//! use geo_core::settings::Settings;
//!
//! let outcome = analyze(&AnalysisRequest::example(), &Settings::default()).unwrap();
//! assert!(outcome.bearing_check.passes);
//! assert_eq!(outcome.bulb.samples().len(), 20 * 20 * 20);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::bearing::{bearing_capacity, BearingCapacityInput, BearingCapacityResult, BearingOptions};
use crate::calculations::consolidation::{consolidation_settlement, ConsolidationInput, ConsolidationResult, Overburden};
use crate::calculations::settlement::{elastic_settlement, SettlementResult};
use crate::calculations::stress::{compute_bulb_with_threshold, compute_stress, influence_depth, BulbResult, Point};
use crate::equations::bearing::BearingFactorMethod;
use crate::errors::GeoResult;
use crate::models::{FootingShape, FoundationInput, GridInput, LoadInput, SoilInput};
use crate::report::ReportMetadata;
use crate::settings::Settings;
use crate::soils::SoilCatalogEntry;
use crate::validation::nbr::{evaluate_nbr, LoadCombination, NbrCompliance, NbrInputs, SoilClass, StructureType};
use crate::validation::{
    check_bearing, check_settlement, validate_with_report, BearingCheck, ReferenceWarning, SettlementCheck,
    ValidatedRequest,
};

/// Fractions of q reported as influence depths
pub const INFLUENCE_FRACTIONS: [f64; 3] = [0.20, 0.10, 0.05];

/// Complete analysis input.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "S-1",
///   "soil": {
///     "name": "Areia Média",
///     "unit_weight": 18.0,
///     "friction_angle": 32.0,
///     "cohesion": 0.0,
///     "elastic_modulus": 35000.0
///   },
///   "foundation": { "length_m": 2.0, "width_m": 2.0 },
///   "load": { "applied_pressure": 200.0 },
///   "grid": { "depth_start": 0.1, "depth_end": 6.0, "resolution": 20 },
///   "embedment_depth_m": 1.0,
///   "shape": "square",
///   "bearing_options": { "load_inclination_deg": 5.0, "eccentricity_width_m": 0.1 },
///   "consolidation": {
///     "layers": [{ "thickness_m": 3.0, "compression_index": 0.3, "recompression_index": 0.05 }],
///     "time_years": 2.0
///   },
///   "load_combination": "normal",
///   "structure_type": "ordinary_building",
///   "soil_class": "medium_sand"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// User label (e.g. "S-1", "Pilar P4")
    #[serde(default)]
    pub label: String,
    pub soil: SoilInput,
    pub foundation: FoundationInput,
    pub load: LoadInput,
    pub grid: GridInput,
    /// Embedment depth Df (m)
    #[serde(default)]
    pub embedment_depth_m: f64,
    #[serde(default)]
    pub shape: FootingShape,
    #[serde(default)]
    pub bearing_method: BearingFactorMethod,
    /// Global safety factor; `Settings::safety_factor` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_factor: Option<f64>,
    /// Water table depth below ground (m); dry when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_table_depth_m: Option<f64>,
    /// Rigid footing (settlement reduced to 80 %)
    #[serde(default)]
    pub rigid: bool,
    /// Inclined or eccentric load, depth factors, surcharge
    #[serde(default, skip_serializing_if = "BearingOptions::is_default")]
    pub bearing_options: BearingOptions,
    /// Clay layers below the base for consolidation settlement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consolidation: Option<ConsolidationInput>,
    /// NBR 6122 load combination; sets the minimum safety factor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_combination: Option<LoadCombination>,
    /// NBR 6122 structure type; sets the settlement limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_type: Option<StructureType>,
    /// Soil class for the presumptive admissible pressure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_class: Option<SoilClass>,
}

impl AnalysisRequest {
    /// Request for a soil taken from the catalog, with default grid and bearing options.
    pub fn for_catalog_soil(entry: &SoilCatalogEntry, length_m: f64, width_m: f64, applied_pressure: f64) -> Self {
        AnalysisRequest {
            label: String::new(),
            soil: SoilInput::from(entry),
            foundation: FoundationInput { length_m, width_m },
            load: LoadInput { applied_pressure },
            grid: GridInput {
                depth_start: 0.1,
                depth_end: 3.0 * length_m.max(width_m),
                resolution: 20,
                lateral_extent: None,
            },
            embedment_depth_m: 0.0,
            shape: FootingShape::default(),
            bearing_method: BearingFactorMethod::default(),
            safety_factor: None,
            water_table_depth_m: None,
            rigid: false,
            bearing_options: BearingOptions::default(),
            consolidation: None,
            load_combination: None,
            structure_type: None,
            soil_class: entry.soil_class,
        }
    }

    /// A 2 m square footing at 200 kPa on medium sand.
    pub fn example() -> Self {
        AnalysisRequest {
            label: "S-1".to_string(),
            soil: SoilInput {
                name: "Areia Média".to_string(),
                unit_weight: 18.0,
                friction_angle: 32.0,
                cohesion: 0.0,
                elastic_modulus: 35_000.0,
                poisson_ratio: None,
            },
            foundation: FoundationInput {
                length_m: 2.0,
                width_m: 2.0,
            },
            load: LoadInput { applied_pressure: 200.0 },
            grid: GridInput {
                depth_start: 0.1,
                depth_end: 6.0,
                resolution: 20,
                lateral_extent: None,
            },
            embedment_depth_m: 1.0,
            shape: FootingShape::Square,
            bearing_method: BearingFactorMethod::Terzaghi,
            safety_factor: None,
            water_table_depth_m: None,
            rigid: false,
            bearing_options: BearingOptions::default(),
            consolidation: None,
            load_combination: None,
            structure_type: None,
            soil_class: None,
        }
    }
}

/// Δσz below the footing centre at a named depth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentreStress {
    pub depth_m: f64,
    pub delta_sigma_z: f64,
    /// Δσz / q in percent
    pub influence_pct: f64,
}

/// Depth at which the centre stress falls to a fraction of q
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfluenceDepth {
    pub fraction: f64,
    pub depth_m: f64,
}

/// Everything one analysis produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub metadata: ReportMetadata,
    pub request: ValidatedRequest,
    pub bulb: BulbResult,
    pub bearing: BearingCapacityResult,
    pub bearing_check: BearingCheck,
    pub settlement: SettlementResult,
    pub consolidation: Option<ConsolidationResult>,
    /// Immediate plus end-of-primary consolidation settlement (m)
    pub total_settlement_m: f64,
    pub settlement_check: SettlementCheck,
    pub nbr: NbrCompliance,
    /// Centre stress at z = B and z = 2B
    pub centre_stresses: Vec<CentreStress>,
    pub influence_depths: Vec<InfluenceDepth>,
    pub warnings: Vec<ReferenceWarning>,
}

/// Validate `request` and run the full analysis.
pub fn analyze(request: &AnalysisRequest, settings: &Settings) -> GeoResult<AnalysisOutcome> {
    let (validated, warnings) = validate_with_report(request, settings)?;
    analyze_validated(validated, warnings, settings)
}

/// Run the analysis for an already validated request.
pub fn analyze_validated(
    request: ValidatedRequest,
    warnings: Vec<ReferenceWarning>,
    settings: &Settings,
) -> GeoResult<AnalysisOutcome> {
    let foundation = request.foundation();
    let load = request.load();
    let soil = request.soil();

    log::debug!(
        "Analyzing '{}': {} m × {} m at {} kPa on {}",
        request.label(),
        foundation.length().0,
        foundation.width().0,
        load.applied_pressure().0,
        soil
    );

    let bulb = compute_bulb_with_threshold(request.grid(), foundation, load, settings.parallel_threshold);

    let bearing = bearing_capacity(&BearingCapacityInput {
        soil: soil.clone(),
        foundation: *foundation,
        embedment_depth_m: request.embedment_depth_m(),
        shape: request.shape(),
        method: request.bearing_method(),
        water_table_depth_m: request.water_table_depth_m(),
        safety_factor: request.safety_factor(),
        water_unit_weight: settings.water_unit_weight,
        options: *request.bearing_options(),
    })?;
    let effective_pressure = bearing.effective_pressure(load.applied_pressure().0);
    let bearing_check = check_bearing(bearing.ultimate_kpa, effective_pressure, request.safety_factor());

    let settlement = elastic_settlement(load, foundation, soil, request.shape(), request.rigid());
    let consolidation = request
        .consolidation()
        .map(|input| {
            let overburden = Overburden {
                embedment_depth_m: request.embedment_depth_m(),
                unit_weight: soil.unit_weight().0,
                water_table_depth_m: request.water_table_depth_m(),
                water_unit_weight: settings.water_unit_weight,
            };
            consolidation_settlement(input, foundation, load, &overburden)
        })
        .transpose()?;
    let total_settlement_m = settlement.settlement_m + consolidation.as_ref().map_or(0.0, |c| c.total_m);
    let settlement_limit_m = request
        .structure_type()
        .map_or(settings.settlement_limit_m, StructureType::settlement_limit_m);
    let settlement_check = check_settlement(total_settlement_m, settlement_limit_m);

    let nbr = evaluate_nbr(&NbrInputs {
        ultimate_kpa: bearing.ultimate_kpa,
        applied_kpa: effective_pressure,
        settlement_m: total_settlement_m,
        default_settlement_limit_m: settings.settlement_limit_m,
        load_combination: request.load_combination().unwrap_or_default(),
        structure_type: request.structure_type(),
        soil_class: request.soil_class(),
        embedment_depth_m: request.embedment_depth_m(),
        water_table_depth_m: request.water_table_depth_m(),
    });

    let b = foundation.least_dimension();
    let q = load.applied_pressure().0;
    let centre_stresses = [b, 2.0 * b]
        .iter()
        .map(|&z| {
            compute_stress(Point::new(0.0, 0.0, z), foundation, load).map(|s| CentreStress {
                depth_m: z,
                delta_sigma_z: s,
                influence_pct: 100.0 * s / q,
            })
        })
        .collect::<GeoResult<Vec<_>>>()?;

    let influence_depths = INFLUENCE_FRACTIONS
        .iter()
        .map(|&fraction| influence_depth(foundation, fraction).map(|depth_m| InfluenceDepth { fraction, depth_m }))
        .collect::<GeoResult<Vec<_>>>()?;

    let metadata = ReportMetadata::new(&request);

    Ok(AnalysisOutcome {
        metadata,
        request,
        bulb,
        bearing,
        bearing_check,
        settlement,
        consolidation,
        total_settlement_m,
        settlement_check,
        nbr,
        centre_stresses,
        influence_depths,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soils::SoilDatabase;

    #[test]
    fn test_example_outcome() {
        let outcome = analyze(&AnalysisRequest::example(), &Settings::default()).unwrap();
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.bulb.statistics().invalid, 0);
        assert!(outcome.bearing.ultimate_kpa > 200.0 * 3.0);
        assert_eq!(outcome.centre_stresses.len(), 2);
        assert_eq!(outcome.centre_stresses[0].depth_m, 2.0);
        assert!((outcome.centre_stresses[0].delta_sigma_z - 67.22).abs() < 0.01);
        assert_eq!(outcome.influence_depths.len(), 3);
        assert!(outcome.influence_depths[0].depth_m < outcome.influence_depths[2].depth_m);
    }

    #[test]
    fn test_invalid_request_never_reaches_solver() {
        let mut r = AnalysisRequest::example();
        r.soil.friction_angle = -5.0;
        let err = analyze(&r, &Settings::default()).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_catalog_request() {
        let db = SoilDatabase::builtin().unwrap();
        let entry = db.lookup("Argila Rija").unwrap();
        let mut r = AnalysisRequest::for_catalog_soil(entry, 2.0, 1.5, 150.0);
        r.grid.resolution = 5;
        let outcome = analyze(&r, &Settings::default()).unwrap();
        assert_eq!(outcome.request.soil().poisson_ratio(), 0.40);
        assert_eq!(outcome.bulb.samples().len(), 125);
    }

    #[test]
    fn test_request_json_defaults() {
        let json = r#"{
            "soil": {"unit_weight": 18.0, "friction_angle": 30.0, "cohesion": 0.0, "elastic_modulus": 20000.0},
            "foundation": {"length_m": 2.0, "width_m": 1.5},
            "load": {"applied_pressure": 150.0},
            "grid": {"depth_start": 0.0, "depth_end": 4.0, "resolution": 10}
        }"#;
        let r: AnalysisRequest = serde_json::from_str(json).unwrap();
        assert_eq!(r.shape, FootingShape::Rectangular);
        assert_eq!(r.bearing_method, BearingFactorMethod::Terzaghi);
        assert_eq!(r.embedment_depth_m, 0.0);
        assert!(!r.rigid);
    }

    #[test]
    fn test_consolidation_adds_to_settlement() {
        let mut r = AnalysisRequest::example();
        r.grid.resolution = 3;
        let dry = analyze(&r, &Settings::default()).unwrap();
        assert!(dry.consolidation.is_none());
        assert_eq!(dry.total_settlement_m, dry.settlement.settlement_m);

        r.consolidation = Some(ConsolidationInput {
            layers: vec![crate::calculations::consolidation::ClayLayer {
                thickness_m: 3.0,
                compression_index: 0.3,
                recompression_index: 0.05,
                initial_void_ratio: 1.0,
                overconsolidation_ratio: 1.0,
                initial_effective_stress_kpa: None,
                unit_weight: None,
            }],
            time_years: Some(1.0),
            coefficient_of_consolidation: None,
            double_drainage: true,
        });
        let outcome = analyze(&r, &Settings::default()).unwrap();
        let c = outcome.consolidation.as_ref().unwrap();
        assert!(c.total_m > 0.0);
        assert!(c.at_time_m < c.total_m);
        assert!((outcome.total_settlement_m - (outcome.settlement.settlement_m + c.total_m)).abs() < 1e-15);
        assert_eq!(outcome.settlement_check.settlement_m, outcome.total_settlement_m);
        assert!(!outcome.settlement_check.passes);
    }

    #[test]
    fn test_circular_footing_settles_less() {
        let mut r = AnalysisRequest::example();
        r.grid.resolution = 2;
        let square = analyze(&r, &Settings::default()).unwrap();
        r.shape = FootingShape::Circular;
        let circle = analyze(&r, &Settings::default()).unwrap();
        assert_eq!(circle.settlement.influence_factor, 0.79);
        assert!(circle.settlement.settlement_m < square.settlement.settlement_m);
    }

    #[test]
    fn test_eccentric_load_checked_on_effective_area() {
        let mut r = AnalysisRequest::example();
        r.grid.resolution = 2;
        let centred = analyze(&r, &Settings::default()).unwrap();
        r.bearing_options.eccentricity_width_m = 0.25;
        let eccentric = analyze(&r, &Settings::default()).unwrap();
        assert!((eccentric.bearing.area_ratio - 4.0 / 3.0).abs() < 1e-12);
        assert!(eccentric.bearing_check.safety_factor < centred.bearing_check.safety_factor);
    }

    #[test]
    fn test_nbr_tables_drive_the_checks() {
        let mut r = AnalysisRequest::example();
        r.grid.resolution = 2;
        r.structure_type = Some(StructureType::BridgeViaduct);
        r.soil_class = Some(SoilClass::Silt);
        r.water_table_depth_m = Some(0.5);
        let outcome = analyze(&r, &Settings::default()).unwrap();
        assert_eq!(outcome.settlement_check.limit_m, 0.010);
        assert_eq!(outcome.nbr.settlement.limit_m, 0.010);
        assert_eq!(outcome.nbr.load_combination, LoadCombination::Normal);
        assert_eq!(outcome.nbr.bearing.required_safety_factor, 2.0);
        assert_eq!(outcome.nbr.presumptive.map(|p| p.passes), Some(false));
        assert!(outcome.nbr.water_table.as_ref().map_or(false, |w| w.below_water_table));
    }
}
