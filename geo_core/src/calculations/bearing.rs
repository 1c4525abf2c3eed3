//! # Bearing Capacity
//!
//! Ultimate and allowable bearing capacity of a shallow footing under
//! general shear failure.
//!
//! ```text
//! qu    = c·Nc·sc·dc·ic + (γ1·Df + q0)·Nq·sq·dq·iq + ½·γ2·B'·Nγ·sγ·dγ·iγ
//! q_adm = qu / FS
//! ```
//!
//! `B` is the least plan dimension (the diameter for circular footings).
//! `γ1` and `γ2` are the unit weights above and below the base, reduced when
//! the water table is close. `q0` is a surface surcharge.
//!
//! Depth factors are applied only on request; inclination factors follow the
//! load inclination and are 1 for a vertical load.
//!
//! ## Eccentric loads
//!
//! An eccentric load acts on the effective rectangle centred on it
//! (Meyerhof):
//!
//! ```text
//! B' = B - 2·|eB|,   L' = L - 2·|eL|,   A' = B'·L'
//! ```
//!
//! `B'` replaces `B` in the Nγ term, the shape factors and the water-table
//! correction. The bearing check then compares qu with the pressure on `A'`.
//!
//! ## Water table
//!
//! | Water table depth Dw   | γ1 (surcharge) | γ2 (base wedge)          |
//! |------------------------|----------------|--------------------------|
//! | Dw ≤ Df                | γ - γw         | γ - γw                   |
//! | Df < Dw < Df + B       | γ              | γ - γw·(1 - (Dw - Df)/B) |
//! | Dw ≥ Df + B, or none   | γ              | γ                        |
//!
//! ## Example
//!
//! ```rust
//! use geo_core::calculations::bearing::ultimate_bearing_capacity;
//! use geo_core::models::{FootingShape, FoundationGeometry, SoilInput, SoilProfile};
//!
//! let clay = SoilProfile::new(
//!     SoilInput {
//!         name: "Argila Rija".to_string(),
//!         unit_weight: 18.0,
//!         friction_angle: 0.0,
//!         cohesion: 50.0,
//!         elastic_modulus: 25000.0,
//!         poisson_ratio: None,
//!     },
//!     0.3,
//! )
//! .unwrap();
//! let strip = FoundationGeometry::new(10.0, 1.0).unwrap();
//!
//! let qu = ultimate_bearing_capacity(&clay, &strip, 1.0, FootingShape::Strip).unwrap();
//! assert!((qu - 303.62).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::bearing::{
    bearing_factors, depth_factors, inclination_factors, shape_factors, BearingFactorMethod, BearingFactors,
    DepthFactors, InclinationFactors, ShapeFactors,
};
use crate::errors::{GeoError, GeoResult};
use crate::models::{FootingShape, FoundationGeometry, SoilProfile};
use crate::units::GAMMA_WATER;

/// Friction angles outside this range are rejected (degrees)
pub const MIN_FRICTION_ANGLE: f64 = 0.0;
pub const MAX_FRICTION_ANGLE: f64 = 50.0;

/// Loads that are not a plain vertical, centred pressure, plus optional
/// factors. The default is a vertical centred load without depth factors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BearingOptions {
    /// Load inclination from the vertical (degrees, below 90)
    pub load_inclination_deg: f64,
    /// Eccentricity along the footing width (m)
    pub eccentricity_width_m: f64,
    /// Eccentricity along the footing length (m)
    pub eccentricity_length_m: f64,
    /// Apply Hansen depth factors
    pub depth_factors: bool,
    /// Uniform surcharge on the ground surface (kPa)
    pub surcharge_kpa: f64,
}

impl BearingOptions {
    pub fn is_default(&self) -> bool {
        *self == BearingOptions::default()
    }

    /// True when either eccentricity is non-zero
    pub fn is_eccentric(&self) -> bool {
        self.eccentricity_width_m != 0.0 || self.eccentricity_length_m != 0.0
    }
}

/// Input for a full bearing-capacity evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearingCapacityInput {
    pub soil: SoilProfile,
    pub foundation: FoundationGeometry,
    /// Embedment depth Df (m)
    pub embedment_depth_m: f64,
    pub shape: FootingShape,
    #[serde(default)]
    pub method: BearingFactorMethod,
    /// Depth of the water table below ground (m); none means dry
    #[serde(default)]
    pub water_table_depth_m: Option<f64>,
    pub safety_factor: f64,
    /// γw (kN/m³)
    #[serde(default = "default_water_unit_weight")]
    pub water_unit_weight: f64,
    #[serde(default, skip_serializing_if = "BearingOptions::is_default")]
    pub options: BearingOptions,
}

impl BearingCapacityInput {
    /// Terzaghi factors, dry soil, FS = 3, vertical centred load.
    pub fn new(soil: SoilProfile, foundation: FoundationGeometry, embedment_depth_m: f64, shape: FootingShape) -> Self {
        BearingCapacityInput {
            soil,
            foundation,
            embedment_depth_m,
            shape,
            method: BearingFactorMethod::Terzaghi,
            water_table_depth_m: None,
            safety_factor: 3.0,
            water_unit_weight: GAMMA_WATER.0,
            options: BearingOptions::default(),
        }
    }
}

fn default_water_unit_weight() -> f64 {
    GAMMA_WATER.0
}

/// Bearing-capacity breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearingCapacityResult {
    pub method: BearingFactorMethod,
    pub shape: FootingShape,
    pub factors: BearingFactors,
    pub shape_factors: ShapeFactors,
    pub depth_factors: DepthFactors,
    pub inclination_factors: InclinationFactors,
    /// B' used in the Nγ term (m); B for a centred load
    pub width_m: f64,
    /// L' (m)
    pub effective_length_m: f64,
    /// A' = B'·L' (m²)
    pub effective_area_m2: f64,
    /// A / A'
    pub area_ratio: f64,
    /// γ1 used in the surcharge term (kN/m³)
    pub surcharge_unit_weight: f64,
    /// γ2 used in the Nγ term (kN/m³)
    pub base_unit_weight: f64,
    /// c·Nc·sc·dc·ic (kPa)
    pub cohesion_term: f64,
    /// (γ1·Df + q0)·Nq·sq·dq·iq (kPa)
    pub surcharge_term: f64,
    /// ½·γ2·B'·Nγ·sγ·dγ·iγ (kPa)
    pub self_weight_term: f64,
    /// qu (kPa)
    pub ultimate_kpa: f64,
    /// qu - γ1·Df (kPa)
    pub net_ultimate_kpa: f64,
    /// q_adm = qu / FS (kPa)
    pub allowable_kpa: f64,
    pub safety_factor: f64,
}

impl BearingCapacityResult {
    /// Pressure on the effective area for a nominal pressure `applied_kpa`
    pub fn effective_pressure(&self, applied_kpa: f64) -> f64 {
        applied_kpa * self.area_ratio
    }
}

fn check_friction_angle(phi: f64) -> GeoResult<()> {
    if (MIN_FRICTION_ANGLE..=MAX_FRICTION_ANGLE).contains(&phi) {
        Ok(())
    } else {
        Err(GeoError::domain(
            "friction_angle",
            phi,
            format!(
                "Bearing factors are defined for {} to {} degrees",
                MIN_FRICTION_ANGLE, MAX_FRICTION_ANGLE
            ),
        ))
    }
}

fn check_depth(quantity: &str, value: f64) -> GeoResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GeoError::domain(quantity, value, "Depth must be finite and non-negative"))
    }
}

fn check_options(options: &BearingOptions) -> GeoResult<()> {
    let alpha = options.load_inclination_deg;
    if !(alpha.is_finite() && (0.0..90.0).contains(&alpha)) {
        return Err(GeoError::domain(
            "load_inclination",
            alpha,
            "Inclination must be at least 0 and below 90 degrees",
        ));
    }
    let q0 = options.surcharge_kpa;
    if !(q0.is_finite() && q0 >= 0.0) {
        return Err(GeoError::domain("surcharge", q0, "Surcharge must be finite and non-negative"));
    }
    Ok(())
}

/// Effective plan dimensions (B', L') of an eccentric load, least first
fn effective_dimensions(foundation: &FoundationGeometry, options: &BearingOptions) -> GeoResult<(f64, f64)> {
    let width = foundation.width().0 - 2.0 * options.eccentricity_width_m.abs();
    let length = foundation.length().0 - 2.0 * options.eccentricity_length_m.abs();
    if !(width > 0.0) {
        return Err(GeoError::domain(
            "eccentricity_width",
            options.eccentricity_width_m,
            "Load falls outside the footing width",
        ));
    }
    if !(length > 0.0) {
        return Err(GeoError::domain(
            "eccentricity_length",
            options.eccentricity_length_m,
            "Load falls outside the footing length",
        ));
    }
    Ok((width.min(length), width.max(length)))
}

/// Effective unit weights (γ1, γ2) for the surcharge and base terms
fn effective_unit_weights(gamma: f64, gamma_w: f64, df: f64, b: f64, water_table: Option<f64>) -> (f64, f64) {
    match water_table {
        Some(dw) if dw <= df => {
            let submerged = (gamma - gamma_w).max(0.0);
            (submerged, submerged)
        }
        Some(dw) if dw < df + b => {
            let reduced = gamma - gamma_w * (1.0 - (dw - df) / b);
            (gamma, reduced.max(0.0))
        }
        _ => (gamma, gamma),
    }
}

/// Ultimate bearing capacity qu (kPa), Terzaghi factors, dry soil.
pub fn ultimate_bearing_capacity(
    soil: &SoilProfile,
    foundation: &FoundationGeometry,
    depth_of_foundation: f64,
    shape: FootingShape,
) -> GeoResult<f64> {
    let input = BearingCapacityInput {
        soil: soil.clone(),
        foundation: *foundation,
        embedment_depth_m: depth_of_foundation,
        shape,
        method: BearingFactorMethod::Terzaghi,
        water_table_depth_m: None,
        safety_factor: 1.0,
        water_unit_weight: GAMMA_WATER.0,
        options: BearingOptions::default(),
    };
    bearing_capacity(&input).map(|r| r.ultimate_kpa)
}

/// Allowable bearing capacity qu / FS (kPa).
pub fn allowable_bearing_capacity(ultimate_kpa: f64, safety_factor: f64) -> GeoResult<f64> {
    if !safety_factor.is_finite() || safety_factor <= 0.0 {
        return Err(GeoError::domain(
            "safety_factor",
            safety_factor,
            "Safety factor must be positive and finite",
        ));
    }
    if !ultimate_kpa.is_finite() {
        return Err(GeoError::domain("ultimate_capacity", ultimate_kpa, "Capacity must be finite"));
    }
    Ok(ultimate_kpa / safety_factor)
}

/// Full bearing-capacity evaluation with factor breakdown.
pub fn bearing_capacity(input: &BearingCapacityInput) -> GeoResult<BearingCapacityResult> {
    let phi = input.soil.friction_angle().0;
    check_friction_angle(phi)?;
    check_depth("embedment_depth", input.embedment_depth_m)?;
    if let Some(dw) = input.water_table_depth_m {
        check_depth("water_table_depth", dw)?;
    }
    let options = &input.options;
    check_options(options)?;

    let (b, l) = effective_dimensions(&input.foundation, options)?;
    let df = input.embedment_depth_m;
    let c = input.soil.cohesion().0;
    let gamma = input.soil.unit_weight().0;

    let factors = bearing_factors(phi, input.method);
    let shape = shape_factors(input.shape, b / l);
    let depth = if options.depth_factors {
        depth_factors(phi, df / input.foundation.least_dimension())
    } else {
        DepthFactors::NONE
    };
    let inclination = inclination_factors(phi, options.load_inclination_deg);
    let (gamma1, gamma2) = effective_unit_weights(gamma, input.water_unit_weight, df, b, input.water_table_depth_m);

    let cohesion_term = c * factors.nc * shape.sc * depth.dc * inclination.ic;
    let surcharge_term =
        (gamma1 * df + options.surcharge_kpa) * factors.nq * shape.sq * depth.dq * inclination.iq;
    let self_weight_term =
        0.5 * gamma2 * b * factors.ngamma * shape.sgamma * depth.dgamma * inclination.igamma;
    let ultimate_kpa = cohesion_term + surcharge_term + self_weight_term;
    let allowable_kpa = allowable_bearing_capacity(ultimate_kpa, input.safety_factor)?;
    let effective_area_m2 = b * l;

    log::debug!(
        "Bearing capacity ({}, {}): φ = {}°, B' = {:.3} m, qu = {:.2} kPa, q_adm = {:.2} kPa",
        input.method,
        input.shape,
        phi,
        b,
        ultimate_kpa,
        allowable_kpa
    );

    Ok(BearingCapacityResult {
        method: input.method,
        shape: input.shape,
        factors,
        shape_factors: shape,
        depth_factors: depth,
        inclination_factors: inclination,
        width_m: b,
        effective_length_m: l,
        effective_area_m2,
        area_ratio: input.foundation.area_m2() / effective_area_m2,
        surcharge_unit_weight: gamma1,
        base_unit_weight: gamma2,
        cohesion_term,
        surcharge_term,
        self_weight_term,
        ultimate_kpa,
        net_ultimate_kpa: ultimate_kpa - gamma1 * df,
        allowable_kpa,
        safety_factor: input.safety_factor,
    })
}
