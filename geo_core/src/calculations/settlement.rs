//! # Immediate Settlement
//!
//! Elastic settlement of a footing on a homogeneous half-space:
//!
//! ```text
//! s = q·B·I·(1 - ν²) / E
//! ```
//!
//! with `B` the least plan dimension (the diameter of a circular footing)
//! and the influence factor
//!
//! ```text
//! I = 0.79                           circular
//! I = min(0.73 + 0.27·√(L/B), π/2)   rectangular, L/B < 10
//! I = π/2                            L/B ≥ 10 (strip)
//! ```
//!
//! A rigid footing settles uniformly at about 80 % of the flexible average.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::models::{FootingShape, FoundationGeometry, LoadCondition, SoilProfile};

/// L/B from which a footing behaves as a strip
pub const STRIP_ASPECT_RATIO: f64 = 10.0;

/// Rigid over flexible-average settlement
pub const RIGIDITY_FACTOR: f64 = 0.8;

/// Influence factor of a circular footing
pub const CIRCULAR_INFLUENCE_FACTOR: f64 = 0.79;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    /// Immediate settlement (m)
    pub settlement_m: f64,
    pub influence_factor: f64,
    /// 1.0 flexible, 0.8 rigid
    pub rigidity_factor: f64,
    /// B (m)
    pub width_m: f64,
}

impl SettlementResult {
    pub fn settlement_mm(&self) -> f64 {
        self.settlement_m * 1000.0
    }
}

/// Influence factor for a rectangular footing with the given L/B (≥ 1).
///
/// The fit is capped at the strip value, so the factor never drops when a
/// footing crosses into the strip range.
pub fn influence_factor(aspect_ratio: f64) -> f64 {
    if aspect_ratio >= STRIP_ASPECT_RATIO {
        FRAC_PI_2
    } else {
        (0.73 + 0.27 * aspect_ratio.max(1.0).sqrt()).min(FRAC_PI_2)
    }
}

/// Influence factor for `shape` with the given L/B
pub fn shape_influence_factor(shape: FootingShape, aspect_ratio: f64) -> f64 {
    match shape {
        FootingShape::Circular => CIRCULAR_INFLUENCE_FACTOR,
        FootingShape::Strip => FRAC_PI_2,
        FootingShape::Square => influence_factor(1.0),
        FootingShape::Rectangular => influence_factor(aspect_ratio),
    }
}

/// Immediate elastic settlement of `foundation` under `load`.
///
/// `SoilProfile` guarantees E > 0 and 0 ≤ ν < 0.5, so the result is finite.
pub fn elastic_settlement(
    load: &LoadCondition,
    foundation: &FoundationGeometry,
    soil: &SoilProfile,
    shape: FootingShape,
    rigid: bool,
) -> SettlementResult {
    let e = soil.elastic_modulus().0;
    let nu = soil.poisson_ratio();
    let b = foundation.least_dimension();
    let i = shape_influence_factor(shape, foundation.aspect_ratio());
    let rigidity_factor = if rigid { RIGIDITY_FACTOR } else { 1.0 };

    let settlement_m = load.applied_pressure().0 * b * i * (1.0 - nu * nu) / e * rigidity_factor;

    SettlementResult {
        settlement_m,
        influence_factor: i,
        rigidity_factor,
        width_m: b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SoilInput;
    use approx::assert_relative_eq;

    fn sand() -> SoilProfile {
        SoilProfile::new(
            SoilInput {
                name: "Areia Média".to_string(),
                unit_weight: 18.0,
                friction_angle: 32.0,
                cohesion: 0.0,
                elastic_modulus: 35_000.0,
                poisson_ratio: Some(0.3),
            },
            0.3,
        )
        .unwrap()
    }

    #[test]
    fn test_square_settlement() {
        let f = FoundationGeometry::new(2.0, 2.0).unwrap();
        let q = LoadCondition::new(200.0).unwrap();
        let s = elastic_settlement(&q, &f, &sand(), FootingShape::Square, false);
        assert_relative_eq!(s.influence_factor, 1.0, epsilon = 1e-12);
        // 200·2·1.0·0.91/35000
        assert_relative_eq!(s.settlement_m, 0.0104, epsilon = 1e-4);
        assert_relative_eq!(s.settlement_mm(), 10.4, epsilon = 0.1);
    }

    #[test]
    fn test_rigid_is_smaller() {
        let f = FoundationGeometry::new(3.0, 1.5).unwrap();
        let q = LoadCondition::new(150.0).unwrap();
        let flexible = elastic_settlement(&q, &f, &sand(), FootingShape::Rectangular, false);
        let rigid = elastic_settlement(&q, &f, &sand(), FootingShape::Rectangular, true);
        assert_relative_eq!(rigid.settlement_m, 0.8 * flexible.settlement_m, epsilon = 1e-12);
    }

    #[test]
    fn test_strip_influence() {
        assert_relative_eq!(influence_factor(12.0), FRAC_PI_2);
        assert!(influence_factor(9.9) <= influence_factor(10.0));
        assert_relative_eq!(influence_factor(9.999), influence_factor(10.0), epsilon = 1e-12);
    }

    #[test]
    fn test_influence_never_decreases_with_aspect_ratio() {
        let mut previous = influence_factor(1.0);
        for step in 1..=300 {
            let m = 1.0 + 0.05 * step as f64;
            let i = influence_factor(m);
            assert!(i >= previous, "I({}) = {} < {}", m, i, previous);
            assert!(i <= FRAC_PI_2);
            previous = i;
        }
    }

    #[test]
    fn test_circular_influence() {
        let f = FoundationGeometry::new(2.0, 2.0).unwrap();
        let q = LoadCondition::new(200.0).unwrap();
        let circle = elastic_settlement(&q, &f, &sand(), FootingShape::Circular, false);
        let square = elastic_settlement(&q, &f, &sand(), FootingShape::Square, false);
        assert_eq!(circle.influence_factor, CIRCULAR_INFLUENCE_FACTOR);
        // 200·2·0.79·0.91/35000
        assert_relative_eq!(circle.settlement_m, 0.0082160, epsilon = 1e-6);
        assert!(circle.settlement_m < square.settlement_m);
    }

    #[test]
    fn test_strip_shape_uses_strip_factor() {
        let f = FoundationGeometry::new(4.0, 1.0).unwrap();
        assert_eq!(shape_influence_factor(FootingShape::Strip, f.aspect_ratio()), FRAC_PI_2);
        assert!(shape_influence_factor(FootingShape::Rectangular, f.aspect_ratio()) < FRAC_PI_2);
    }
}
