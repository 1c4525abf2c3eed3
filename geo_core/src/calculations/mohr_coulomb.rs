//! # Mohr-Coulomb Criterion
//!
//! Shear strength `τf = c + σ'·tanφ` and the plane-stress tools around it:
//! principal stresses, stress on an inclined plane and the margin between a
//! Mohr circle and the failure envelope.
//!
//! Compression is positive. Angles are in degrees, measured from the x axis.
//!
//! ```rust
//! use geo_core::calculations::mohr_coulomb::{is_failed, shear_strength};
//! use geo_core::models::{SoilInput, SoilProfile};
//!
//! let soil = SoilProfile::new(
//!     SoilInput {
//!         name: String::new(),
//!         unit_weight: 18.0,
//!         friction_angle: 30.0,
//!         cohesion: 10.0,
//!         elastic_modulus: 20000.0,
//!         poisson_ratio: None,
//!     },
//!     0.3,
//! )
//! .unwrap();
//!
//! let tau_f = shear_strength(100.0, &soil).unwrap();
//! assert!((tau_f - 67.735).abs() < 1e-3);
//! assert!(!is_failed(50.0, 100.0, &soil).unwrap());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{GeoError, GeoResult};
use crate::models::{linspace, SoilProfile};

/// Plane stress state at a point (kPa)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StressState {
    pub sigma_x: f64,
    pub sigma_z: f64,
    pub tau_xz: f64,
    /// Pore pressure u
    #[serde(default)]
    pub pore_pressure: f64,
}

impl StressState {
    pub fn new(sigma_x: f64, sigma_z: f64, tau_xz: f64) -> Self {
        StressState {
            sigma_x,
            sigma_z,
            tau_xz,
            pore_pressure: 0.0,
        }
    }

    pub fn with_pore_pressure(mut self, u: f64) -> Self {
        self.pore_pressure = u;
        self
    }
}

/// Principal stresses and Mohr circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrincipalStresses {
    pub sigma_1: f64,
    pub sigma_3: f64,
    /// Circle centre (σ1 + σ3)/2
    pub centre: f64,
    /// Circle radius, the maximum shear stress
    pub radius: f64,
    /// Angle of the major principal plane (degrees)
    pub theta_p_deg: f64,
}

/// Stresses on a plane inclined at θ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneStress {
    pub theta_deg: f64,
    pub sigma_theta: f64,
    pub tau_theta: f64,
    /// Shear strength available on the plane
    pub strength: f64,
    /// strength / |τθ|; `None` when the plane carries no shear
    pub safety_factor: Option<f64>,
}

/// Distance between a Mohr circle and the envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyMargin {
    /// τ_strength(centre) / radius; `None` for a hydrostatic state
    pub safety_factor: Option<f64>,
    /// Friction angle mobilised by the circle; `None` when φ = 0
    pub phi_mobilized_deg: Option<f64>,
    /// Share of the available strength in use, capped at 100
    pub mobilization_pct: f64,
    pub max_shear: f64,
    pub strength: f64,
    /// strength - max_shear (negative past failure)
    pub distance_to_failure: f64,
}

fn check_stress(quantity: &str, value: f64) -> GeoResult<()> {
    if !value.is_finite() {
        return Err(GeoError::domain(quantity, value, "Stress must be finite"));
    }
    if value < 0.0 {
        return Err(GeoError::domain(quantity, value, "Stress cannot be negative"));
    }
    Ok(())
}

fn check_finite(quantity: &str, value: f64) -> GeoResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GeoError::domain(quantity, value, "Value must be finite"))
    }
}

/// τf = c + σn·tanφ (kPa)
pub fn shear_strength(sigma_n: f64, soil: &SoilProfile) -> GeoResult<f64> {
    check_stress("sigma_n", sigma_n)?;
    Ok(soil.cohesion().0 + sigma_n * soil.friction_angle().to_radians().tan())
}

/// True when τ reaches the strength at σn.
pub fn is_failed(tau: f64, sigma_n: f64, soil: &SoilProfile) -> GeoResult<bool> {
    check_stress("tau", tau)?;
    Ok(tau >= shear_strength(sigma_n, soil)?)
}

/// τf = c + (σn - u)·tanφ, with σ' = σn - u ≥ 0
pub fn effective_shear_strength(sigma_n: f64, pore_pressure: f64, soil: &SoilProfile) -> GeoResult<f64> {
    check_stress("sigma_n", sigma_n)?;
    check_finite("pore_pressure", pore_pressure)?;
    let effective = sigma_n - pore_pressure;
    if effective < 0.0 {
        return Err(GeoError::domain(
            "effective_stress",
            effective,
            "Pore pressure exceeds total normal stress",
        ));
    }
    shear_strength(effective, soil)
}

/// Principal stresses of a plane stress state
pub fn principal_stresses(sigma_x: f64, sigma_z: f64, tau_xz: f64) -> GeoResult<PrincipalStresses> {
    check_finite("sigma_x", sigma_x)?;
    check_finite("sigma_z", sigma_z)?;
    check_finite("tau_xz", tau_xz)?;

    let centre = 0.5 * (sigma_x + sigma_z);
    let half_diff = 0.5 * (sigma_x - sigma_z);
    let radius = half_diff.hypot(tau_xz);

    let theta_p = if (sigma_x - sigma_z).abs() > 1e-10 {
        0.5 * (2.0 * tau_xz).atan2(sigma_x - sigma_z)
    } else if tau_xz > 0.0 {
        std::f64::consts::FRAC_PI_4
    } else {
        -std::f64::consts::FRAC_PI_4
    };

    Ok(PrincipalStresses {
        sigma_1: centre + radius,
        sigma_3: centre - radius,
        centre,
        radius,
        theta_p_deg: theta_p.to_degrees(),
    })
}

/// Normal and shear stress on the plane at `theta_deg`, with its strength.
pub fn stress_on_plane(state: &StressState, theta_deg: f64, soil: &SoilProfile) -> GeoResult<PlaneStress> {
    check_finite("theta", theta_deg)?;
    check_finite("sigma_x", state.sigma_x)?;
    check_finite("sigma_z", state.sigma_z)?;
    check_finite("tau_xz", state.tau_xz)?;

    let two_theta = 2.0 * theta_deg.to_radians();
    let centre = 0.5 * (state.sigma_x + state.sigma_z);
    let half_diff = 0.5 * (state.sigma_x - state.sigma_z);

    let sigma_theta = centre + half_diff * two_theta.cos() + state.tau_xz * two_theta.sin();
    let tau_theta = -half_diff * two_theta.sin() + state.tau_xz * two_theta.cos();

    let strength = effective_shear_strength(sigma_theta, state.pore_pressure, soil)?;
    let safety_factor = if tau_theta.abs() > 0.0 {
        Some(strength / tau_theta.abs())
    } else {
        None
    };

    Ok(PlaneStress {
        theta_deg,
        sigma_theta,
        tau_theta,
        strength,
        safety_factor,
    })
}

/// Theoretical failure plane inclination, 45° + φ/2 from the minor principal plane
pub fn failure_plane_angle(soil: &SoilProfile) -> f64 {
    45.0 + soil.friction_angle().0 / 2.0
}

/// Failure envelope sampled at `points` normal stresses in [0, sigma_max]
pub fn failure_envelope(soil: &SoilProfile, sigma_max: f64, points: usize) -> GeoResult<Vec<(f64, f64)>> {
    check_stress("sigma_max", sigma_max)?;
    linspace(0.0, sigma_max, points)
        .into_iter()
        .map(|s| shear_strength(s, soil).map(|t| (s, t)))
        .collect()
}

/// How far the Mohr circle of `state` sits from the envelope.
pub fn safety_margin(state: &StressState, soil: &SoilProfile) -> GeoResult<SafetyMargin> {
    let principals = principal_stresses(state.sigma_x, state.sigma_z, state.tau_xz)?;
    let strength = effective_shear_strength(principals.centre, state.pore_pressure, soil)?;
    let max_shear = principals.radius;
    let effective_centre = principals.centre - state.pore_pressure;

    let phi = soil.friction_angle().0;
    let c = soil.cohesion().0;

    let safety_factor = if max_shear > 0.0 { Some(strength / max_shear) } else { None };

    let phi_mobilized_deg = if phi > 0.0 {
        let intercept = c / phi.to_radians().tan();
        Some((max_shear / (effective_centre + intercept)).atan().to_degrees())
    } else {
        None
    };

    let mobilization_pct = match phi_mobilized_deg {
        Some(mobilized) => 100.0 * mobilized / phi,
        None if c > 0.0 => 100.0 * max_shear / c,
        None => 100.0,
    }
    .min(100.0);

    Ok(SafetyMargin {
        safety_factor,
        phi_mobilized_deg,
        mobilization_pct,
        max_shear,
        strength,
        distance_to_failure: strength - max_shear,
    })
}
