//! # Consolidation Settlement
//!
//! One-dimensional primary consolidation of clay layers below the footing.
//! Layers are listed top-down and stacked from the footing base. Each layer
//! settles under the stress increase at its mid-depth below the footing
//! centre:
//!
//! ```text
//! σ'p = OCR·σ'0,   σ'f = σ'0 + Δσz
//!
//! σ'f ≤ σ'p:  s = Cr·H/(1+e0)·log10(σ'f/σ'0)
//! σ'f > σ'p:  s = Cr·H/(1+e0)·log10(σ'p/σ'0) + Cc·H/(1+e0)·log10(σ'f/σ'p)
//! ```
//!
//! The settlement reached after `t` years is `U·s`. With a coefficient of
//! consolidation `cv` the degree follows Terzaghi's theory
//!
//! ```text
//! Tv = cv·t / Hdr²
//! U  = √(4·Tv/π)                      Tv ≤ 0.197
//! U  = 1 - 10^(-(Tv + 0.085)/0.933)   otherwise
//! ```
//!
//! where `Hdr` is half the clay thickness (double drainage) or all of it.
//! Without `cv` the empirical rate `U = 1 - e^(-0.5·t)` is used; without a
//! time the settlement is the end-of-primary value (U = 1).

use serde::{Deserialize, Serialize};

use crate::calculations::stress::{compute_stress, Point};
use crate::errors::{GeoError, GeoResult};
use crate::models::{FoundationGeometry, LoadCondition};

/// Tv where the two branches of U(Tv) meet
const TV_BRANCH: f64 = 0.197;

/// Compressible layer below the footing base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClayLayer {
    /// Layer thickness H (m)
    pub thickness_m: f64,
    /// Cc
    pub compression_index: f64,
    /// Cr
    pub recompression_index: f64,
    /// e0
    #[serde(default = "default_void_ratio")]
    pub initial_void_ratio: f64,
    /// OCR = σ'p / σ'0
    #[serde(default = "default_ocr")]
    pub overconsolidation_ratio: f64,
    /// σ'0 at mid-layer (kPa); computed from unit weights when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_effective_stress_kpa: Option<f64>,
    /// γ of the layer (kN/m³); the request soil's γ when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_weight: Option<f64>,
}

fn default_void_ratio() -> f64 {
    1.0
}

fn default_ocr() -> f64 {
    1.0
}

/// Clay profile and time of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationInput {
    pub layers: Vec<ClayLayer>,
    /// Elapsed time (years); end of primary consolidation when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_years: Option<f64>,
    /// cv (m²/year)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficient_of_consolidation: Option<f64>,
    /// Drained at the top and bottom of the clay
    #[serde(default = "default_double_drainage")]
    pub double_drainage: bool,
}

fn default_double_drainage() -> bool {
    true
}

/// Ground conditions above and around the clay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overburden {
    /// Df (m)
    pub embedment_depth_m: f64,
    /// γ of the soil above the base and default γ of the layers (kN/m³)
    pub unit_weight: f64,
    pub water_table_depth_m: Option<f64>,
    pub water_unit_weight: f64,
}

impl Overburden {
    fn pore_pressure(&self, depth_m: f64) -> f64 {
        match self.water_table_depth_m {
            Some(dw) if depth_m > dw => self.water_unit_weight * (depth_m - dw),
            _ => 0.0,
        }
    }
}

/// Settlement of one layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSettlement {
    /// Below the footing base (m)
    pub top_m: f64,
    pub bottom_m: f64,
    pub mid_depth_m: f64,
    /// σ'0 (kPa)
    pub initial_stress_kpa: f64,
    /// Δσz at mid-layer (kPa)
    pub stress_increase_kpa: f64,
    /// σ'p (kPa)
    pub preconsolidation_kpa: f64,
    pub settlement_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationResult {
    pub layers: Vec<LayerSettlement>,
    /// End-of-primary settlement (m)
    pub total_m: f64,
    /// Average degree of consolidation U
    pub degree: f64,
    /// Tv, when cv and a time were given
    pub time_factor: Option<f64>,
    /// U·total (m)
    pub at_time_m: f64,
}

impl ConsolidationResult {
    pub fn total_mm(&self) -> f64 {
        self.total_m * 1000.0
    }
}

/// Average degree of consolidation for a time factor `tv`
pub fn degree_of_consolidation(tv: f64) -> f64 {
    if tv <= 0.0 {
        0.0
    } else if tv <= TV_BRANCH {
        (4.0 * tv / std::f64::consts::PI).sqrt()
    } else {
        (1.0 - 10f64.powf(-(tv + 0.085) / 0.933)).min(1.0)
    }
}

/// Empirical degree after `time_years` when cv is unknown
pub fn empirical_degree(time_years: f64) -> f64 {
    1.0 - (-0.5 * time_years.max(0.0)).exp()
}

/// Settlement of a layer from σ'0 to σ'f
fn layer_settlement(layer: &ClayLayer, initial: f64, final_stress: f64, preconsolidation: f64) -> f64 {
    if final_stress <= initial {
        return 0.0;
    }
    let scale = layer.thickness_m / (1.0 + layer.initial_void_ratio);
    if final_stress <= preconsolidation {
        layer.recompression_index * scale * (final_stress / initial).log10()
    } else {
        layer.recompression_index * scale * (preconsolidation / initial).log10()
            + layer.compression_index * scale * (final_stress / preconsolidation).log10()
    }
}

/// Primary consolidation of `input.layers` under `load` on `foundation`.
pub fn consolidation_settlement(
    input: &ConsolidationInput,
    foundation: &FoundationGeometry,
    load: &LoadCondition,
    overburden: &Overburden,
) -> GeoResult<ConsolidationResult> {
    if input.layers.is_empty() {
        return Err(GeoError::domain("consolidation.layers", 0, "At least one clay layer is required"));
    }

    let mut layers = Vec::with_capacity(input.layers.len());
    let mut top = 0.0;
    let mut total_stress_at_top = overburden.unit_weight * overburden.embedment_depth_m;

    for (index, layer) in input.layers.iter().enumerate() {
        let h = layer.thickness_m;
        if !(h > 0.0 && h.is_finite()) {
            return Err(GeoError::domain(
                format!("consolidation.layers[{}].thickness_m", index),
                h,
                "Thickness must be positive",
            ));
        }
        let gamma = layer.unit_weight.unwrap_or(overburden.unit_weight);
        let mid = top + h / 2.0;

        let initial = match layer.initial_effective_stress_kpa {
            Some(s) => s,
            None => {
                total_stress_at_top + gamma * h / 2.0 - overburden.pore_pressure(overburden.embedment_depth_m + mid)
            }
        };
        if !(initial > 0.0 && initial.is_finite()) {
            return Err(GeoError::domain(
                format!("consolidation.layers[{}].initial_effective_stress_kpa", index),
                initial,
                "Initial effective stress must be positive",
            ));
        }

        let delta = compute_stress(Point::new(0.0, 0.0, mid), foundation, load)?;
        let preconsolidation = layer.overconsolidation_ratio * initial;
        let settlement_m = layer_settlement(layer, initial, initial + delta, preconsolidation);

        layers.push(LayerSettlement {
            top_m: top,
            bottom_m: top + h,
            mid_depth_m: mid,
            initial_stress_kpa: initial,
            stress_increase_kpa: delta,
            preconsolidation_kpa: preconsolidation,
            settlement_m,
        });
        top += h;
        total_stress_at_top += gamma * h;
    }

    let total_m: f64 = layers.iter().map(|l| l.settlement_m).sum();
    let (degree, time_factor) = match (input.time_years, input.coefficient_of_consolidation) {
        (None, _) => (1.0, None),
        (Some(t), Some(cv)) => {
            let drainage_path = if input.double_drainage { top / 2.0 } else { top };
            let tv = cv * t / (drainage_path * drainage_path);
            (degree_of_consolidation(tv), Some(tv))
        }
        (Some(t), None) => (empirical_degree(t), None),
    };

    log::debug!(
        "Consolidation of {} layer(s): {:.1} mm final, U = {:.3}",
        layers.len(),
        total_m * 1000.0,
        degree
    );

    Ok(ConsolidationResult {
        layers,
        total_m,
        degree,
        time_factor,
        at_time_m: degree * total_m,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn clay(h: f64, sigma0: Option<f64>, ocr: f64) -> ClayLayer {
        ClayLayer {
            thickness_m: h,
            compression_index: 0.3,
            recompression_index: 0.05,
            initial_void_ratio: 0.9,
            overconsolidation_ratio: ocr,
            initial_effective_stress_kpa: sigma0,
            unit_weight: None,
        }
    }

    fn single(layer: ClayLayer) -> ConsolidationInput {
        ConsolidationInput {
            layers: vec![layer],
            time_years: None,
            coefficient_of_consolidation: None,
            double_drainage: true,
        }
    }

    fn dry(df: f64) -> Overburden {
        Overburden {
            embedment_depth_m: df,
            unit_weight: 18.0,
            water_table_depth_m: None,
            water_unit_weight: 9.81,
        }
    }

    fn footing() -> (FoundationGeometry, LoadCondition) {
        (FoundationGeometry::new(2.0, 2.0).unwrap(), LoadCondition::new(200.0).unwrap())
    }

    #[test]
    fn test_normally_consolidated_layer() {
        let (f, q) = footing();
        let r = consolidation_settlement(&single(clay(2.0, Some(50.0), 1.0)), &f, &q, &dry(1.0)).unwrap();
        let layer = r.layers[0];
        assert_eq!(layer.mid_depth_m, 1.0);
        // Δσz below the centre of a 2 m square at z = 1 m
        assert_relative_eq!(layer.stress_increase_kpa, 200.0 * 4.0 * 0.175_221, epsilon = 1e-2);
        let expected = 0.3 * 2.0 / 1.9 * ((50.0 + layer.stress_increase_kpa) / 50.0).log10();
        assert_relative_eq!(layer.settlement_m, expected, epsilon = 1e-12);
        assert_eq!(r.degree, 1.0);
        assert_eq!(r.at_time_m, r.total_m);
    }

    #[test]
    fn test_overconsolidation_reduces_settlement() {
        let (f, q) = footing();
        let nc = consolidation_settlement(&single(clay(2.0, Some(50.0), 1.0)), &f, &q, &dry(1.0)).unwrap();
        let oc = consolidation_settlement(&single(clay(2.0, Some(50.0), 2.0)), &f, &q, &dry(1.0)).unwrap();
        let heavily = consolidation_settlement(&single(clay(2.0, Some(50.0), 10.0)), &f, &q, &dry(1.0)).unwrap();
        assert!(oc.total_m < nc.total_m);
        assert!(heavily.total_m < oc.total_m);

        // σ'f stays below σ'p: recompression only
        let layer = heavily.layers[0];
        let expected = 0.05 * 2.0 / 1.9 * ((50.0 + layer.stress_increase_kpa) / 50.0).log10();
        assert_relative_eq!(layer.settlement_m, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_initial_stress_from_overburden() {
        let (f, q) = footing();
        let input = ConsolidationInput {
            layers: vec![clay(2.0, None, 1.0), clay(4.0, None, 1.0)],
            ..single(clay(1.0, None, 1.0))
        };
        let wet = Overburden {
            water_table_depth_m: Some(1.0),
            ..dry(1.0)
        };
        let r = consolidation_settlement(&input, &f, &q, &wet).unwrap();
        // 18·(1 + 1) - 9.81·1
        assert_relative_eq!(r.layers[0].initial_stress_kpa, 36.0 - 9.81, epsilon = 1e-9);
        // 18·(1 + 2 + 2) - 9.81·4
        assert_relative_eq!(r.layers[1].initial_stress_kpa, 90.0 - 39.24, epsilon = 1e-9);
        assert_eq!(r.layers[1].top_m, 2.0);
        assert_eq!(r.layers[1].mid_depth_m, 4.0);
        assert!(r.layers[1].stress_increase_kpa < r.layers[0].stress_increase_kpa);
        assert_relative_eq!(r.total_m, r.layers[0].settlement_m + r.layers[1].settlement_m, epsilon = 1e-15);
    }

    #[test]
    fn test_degree_of_consolidation() {
        assert_eq!(degree_of_consolidation(0.0), 0.0);
        assert_relative_eq!(degree_of_consolidation(0.197), 0.5, epsilon = 2e-3);
        assert_relative_eq!(degree_of_consolidation(0.848), 0.9, epsilon = 2e-3);
        assert!(degree_of_consolidation(5.0) > 0.999);
        assert_relative_eq!(empirical_degree(2.0), 1.0 - (-1.0_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_time_dependent_settlement() {
        let (f, q) = footing();
        let mut input = single(clay(4.0, Some(60.0), 1.0));
        input.time_years = Some(1.0);
        input.coefficient_of_consolidation = Some(0.788);
        let r = consolidation_settlement(&input, &f, &q, &dry(0.0)).unwrap();
        // Hdr = 2 m, Tv = 0.197
        assert_relative_eq!(r.time_factor.unwrap(), 0.197, epsilon = 1e-12);
        assert_relative_eq!(r.at_time_m, r.degree * r.total_m, epsilon = 1e-15);

        input.double_drainage = false;
        let single_drained = consolidation_settlement(&input, &f, &q, &dry(0.0)).unwrap();
        assert!(single_drained.degree < r.degree);

        input.coefficient_of_consolidation = None;
        let empirical = consolidation_settlement(&input, &f, &q, &dry(0.0)).unwrap();
        assert_eq!(empirical.time_factor, None);
        assert_relative_eq!(empirical.degree, empirical_degree(1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_layers() {
        let (f, q) = footing();
        let empty = ConsolidationInput {
            layers: vec![],
            ..single(clay(1.0, None, 1.0))
        };
        assert!(consolidation_settlement(&empty, &f, &q, &dry(1.0)).is_err());

        let thin = single(clay(0.0, Some(50.0), 1.0));
        let err = consolidation_settlement(&thin, &f, &q, &dry(1.0)).unwrap_err();
        assert!(err.to_string().contains("layers[0].thickness_m"));

        let floating = Overburden {
            unit_weight: 5.0,
            water_table_depth_m: Some(0.0),
            ..dry(1.0)
        };
        let err = consolidation_settlement(&single(clay(2.0, None, 1.0)), &f, &q, &floating).unwrap_err();
        assert_eq!(err.error_code(), "DOMAIN_ERROR");
    }

    #[test]
    fn test_json_defaults() {
        let input: ConsolidationInput = serde_json::from_str(
            r#"{"layers": [{"thickness_m": 3.0, "compression_index": 0.25, "recompression_index": 0.04}]}"#,
        )
        .unwrap();
        assert!(input.double_drainage);
        assert_eq!(input.layers[0].initial_void_ratio, 1.0);
        assert_eq!(input.layers[0].overconsolidation_ratio, 1.0);
        assert_eq!(input.time_years, None);
    }
}
