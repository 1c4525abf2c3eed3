//! # Bearing Capacity Factors
//!
//! Dimensionless factors for the general bearing-capacity equation
//!
//! ```text
//! qu = c·Nc·sc + γ·Df·Nq·sq + ½·γ·B·Nγ·sγ
//! ```
//!
//! optionally multiplied by Hansen depth factors (`dc`, `dq`, `dγ`) and
//! Meyerhof inclination factors (`ic`, `iq`, `iγ`).
//!
//! Two factor families are available. [`BearingFactorMethod::Terzaghi`] is
//! Terzaghi's original (general shear) solution with the closed-form fit of
//! his tabulated Nγ; [`BearingFactorMethod::Vesic`] uses the Prandtl-Reissner
//! Nq with Vesić's Nγ.
//!
//! Reference values at φ = 30°:
//!
//! | Method   | Nc    | Nq    | Nγ    |
//! |----------|-------|-------|-------|
//! | Terzaghi | 37.16 | 22.46 | 20.12 |
//! | Vesic    | 30.14 | 18.40 | 22.40 |

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::FootingShape;

/// Below this friction angle (radians) the φ = 0 limits are returned.
const PHI_EPS: f64 = 1e-10;

/// Factor family used for Nc, Nq and Nγ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BearingFactorMethod {
    /// Terzaghi (1943), classic values
    #[default]
    Terzaghi,
    /// Vesić (1973)
    Vesic,
}

impl fmt::Display for BearingFactorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BearingFactorMethod::Terzaghi => write!(f, "Terzaghi"),
            BearingFactorMethod::Vesic => write!(f, "Vesić"),
        }
    }
}

/// Bearing capacity factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingFactors {
    pub nc: f64,
    pub nq: f64,
    pub ngamma: f64,
}

/// Shape factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeFactors {
    pub sc: f64,
    pub sq: f64,
    pub sgamma: f64,
}

/// Depth factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthFactors {
    pub dc: f64,
    pub dq: f64,
    pub dgamma: f64,
}

impl DepthFactors {
    pub const NONE: DepthFactors = DepthFactors {
        dc: 1.0,
        dq: 1.0,
        dgamma: 1.0,
    };
}

/// Load inclination factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InclinationFactors {
    pub ic: f64,
    pub iq: f64,
    pub igamma: f64,
}

impl InclinationFactors {
    pub const NONE: InclinationFactors = InclinationFactors {
        ic: 1.0,
        iq: 1.0,
        igamma: 1.0,
    };
}

// =============================================================================
// BEARING FACTORS
// =============================================================================

/// Factors for friction angle `phi_deg` with the chosen method
#[inline]
pub fn bearing_factors(phi_deg: f64, method: BearingFactorMethod) -> BearingFactors {
    match method {
        BearingFactorMethod::Terzaghi => terzaghi_factors(phi_deg),
        BearingFactorMethod::Vesic => vesic_factors(phi_deg),
    }
}

/// Terzaghi general-shear factors
///
/// # Formulas
/// ```text
/// Nq = e^{2(3π/4 - φ/2)·tanφ} / (2·cos²(45° + φ/2))
/// Nc = (Nq - 1)·cotφ                 (φ = 0: 1.5π + 1 = 5.71)
/// Nγ = 2(Nq + 1)·tanφ / (1 + 0.4·sin4φ)
/// ```
pub fn terzaghi_factors(phi_deg: f64) -> BearingFactors {
    let phi = phi_deg.to_radians();
    if phi.abs() < PHI_EPS {
        return BearingFactors {
            nc: 1.5 * PI + 1.0,
            nq: 1.0,
            ngamma: 0.0,
        };
    }
    let tan_phi = phi.tan();
    let cos_term = (PI / 4.0 + phi / 2.0).cos();

    let nq = (2.0 * (0.75 * PI - phi / 2.0) * tan_phi).exp() / (2.0 * cos_term * cos_term);
    let nc = (nq - 1.0) / tan_phi;
    let ngamma = 2.0 * (nq + 1.0) * tan_phi / (1.0 + 0.4 * (4.0 * phi).sin());

    BearingFactors { nc, nq, ngamma }
}

/// Vesić factors
///
/// # Formulas
/// ```text
/// Nq = e^{π·tanφ}·tan²(45° + φ/2)
/// Nc = (Nq - 1)·cotφ                 (φ = 0: π + 2 = 5.14)
/// Nγ = 2(Nq + 1)·tanφ
/// ```
pub fn vesic_factors(phi_deg: f64) -> BearingFactors {
    let phi = phi_deg.to_radians();
    if phi.abs() < PHI_EPS {
        return BearingFactors {
            nc: PI + 2.0,
            nq: 1.0,
            ngamma: 0.0,
        };
    }
    let tan_phi = phi.tan();
    let passive = (PI / 4.0 + phi / 2.0).tan();

    let nq = (PI * tan_phi).exp() * passive * passive;
    let nc = (nq - 1.0) / tan_phi;
    let ngamma = 2.0 * (nq + 1.0) * tan_phi;

    BearingFactors { nc, nq, ngamma }
}

// =============================================================================
// SHAPE FACTORS
// =============================================================================

/// Shape factors for a footing
///
/// `b_over_l` is least over greatest plan dimension, clamped to [0, 1]; only
/// the rectangular policy uses it.
///
/// | Shape       | sc          | sq  | sγ          |
/// |-------------|-------------|-----|-------------|
/// | Strip       | 1.0         | 1.0 | 1.0         |
/// | Square      | 1.3         | 1.0 | 0.8         |
/// | Circular    | 1.3         | 1.0 | 0.6         |
/// | Rectangular | 1 + 0.3·B/L | 1.0 | 1 - 0.2·B/L |
#[inline]
pub fn shape_factors(shape: FootingShape, b_over_l: f64) -> ShapeFactors {
    match shape {
        FootingShape::Strip => ShapeFactors {
            sc: 1.0,
            sq: 1.0,
            sgamma: 1.0,
        },
        FootingShape::Square => ShapeFactors {
            sc: 1.3,
            sq: 1.0,
            sgamma: 0.8,
        },
        FootingShape::Circular => ShapeFactors {
            sc: 1.3,
            sq: 1.0,
            sgamma: 0.6,
        },
        FootingShape::Rectangular => {
            let r = b_over_l.clamp(0.0, 1.0);
            ShapeFactors {
                sc: 1.0 + 0.3 * r,
                sq: 1.0,
                sgamma: 1.0 - 0.2 * r,
            }
        }
    }
}

// =============================================================================
// DEPTH AND INCLINATION FACTORS
// =============================================================================

/// Hansen (1970) depth factors
///
/// # Formulas
/// ```text
/// k  = Df/B              Df/B ≤ 1
/// k  = atan(Df/B)        Df/B > 1   (radians)
/// dc = 1 + 0.4·k
/// dq = 1 + 0.1·k·√tan(45° + φ/2)
/// dγ = 1
/// ```
#[inline]
pub fn depth_factors(phi_deg: f64, df_over_b: f64) -> DepthFactors {
    let ratio = df_over_b.max(0.0);
    let k = if ratio <= 1.0 { ratio } else { ratio.atan() };
    let passive = (PI / 4.0 + phi_deg.to_radians() / 2.0).tan();
    DepthFactors {
        dc: 1.0 + 0.4 * k,
        dq: 1.0 + 0.1 * k * passive.sqrt(),
        dgamma: 1.0,
    }
}

/// Meyerhof (1963) inclination factors for a load inclined `alpha_deg` from
/// the vertical
///
/// # Formulas
/// ```text
/// ic = iq = (1 - α/90°)²
/// iγ      = (1 - α/φ)²     (0 when α ≥ φ)
/// ```
#[inline]
pub fn inclination_factors(phi_deg: f64, alpha_deg: f64) -> InclinationFactors {
    let alpha = alpha_deg.abs();
    if alpha == 0.0 {
        return InclinationFactors::NONE;
    }
    let icq = (1.0 - alpha / 90.0).max(0.0).powi(2);
    let igamma = if phi_deg > alpha {
        (1.0 - alpha / phi_deg).powi(2)
    } else {
        0.0
    };
    InclinationFactors {
        ic: icq,
        iq: icq,
        igamma,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_terzaghi_phi_zero() {
        let f = terzaghi_factors(0.0);
        assert_relative_eq!(f.nc, 5.712, epsilon = 1e-3);
        assert_eq!(f.nq, 1.0);
        assert_eq!(f.ngamma, 0.0);
    }

    #[test]
    fn test_terzaghi_phi_zero_is_continuous() {
        let f = terzaghi_factors(1e-6);
        assert_relative_eq!(f.nc, 1.5 * PI + 1.0, epsilon = 1e-3);
        assert_relative_eq!(f.nq, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_terzaghi_phi_30() {
        let f = terzaghi_factors(30.0);
        assert_relative_eq!(f.nq, 22.456, epsilon = 1e-2);
        assert_relative_eq!(f.nc, 37.16, epsilon = 1e-2);
        assert_relative_eq!(f.ngamma, 20.1, epsilon = 0.1);
    }

    #[test]
    fn test_vesic_phi_30() {
        let f = vesic_factors(30.0);
        assert_relative_eq!(f.nq, 18.40, epsilon = 1e-2);
        assert_relative_eq!(f.nc, 30.14, epsilon = 1e-2);
        assert_relative_eq!(f.ngamma, 22.40, epsilon = 1e-2);
        assert_relative_eq!(vesic_factors(0.0).nc, 5.14, epsilon = 1e-2);
    }

    #[test]
    fn test_factors_increase_with_phi() {
        let mut prev = terzaghi_factors(0.0);
        for phi in (5..=50).step_by(5) {
            let f = terzaghi_factors(phi as f64);
            assert!(f.nc > prev.nc && f.nq > prev.nq && f.ngamma > prev.ngamma);
            prev = f;
        }
    }

    #[test]
    fn test_rectangular_shape_limits() {
        let strip = shape_factors(FootingShape::Strip, 0.5);
        let square = shape_factors(FootingShape::Square, 1.0);
        assert_eq!(shape_factors(FootingShape::Rectangular, 0.0), strip);
        let rect = shape_factors(FootingShape::Rectangular, 1.0);
        assert_relative_eq!(rect.sc, square.sc, epsilon = 1e-12);
        assert_relative_eq!(rect.sgamma, square.sgamma, epsilon = 1e-12);
    }

    #[test]
    fn test_depth_factors_branches() {
        assert_eq!(depth_factors(30.0, 0.0), DepthFactors::NONE);
        let shallow = depth_factors(30.0, 0.5);
        assert_relative_eq!(shallow.dc, 1.2, epsilon = 1e-12);
        // √tan(60°) = 1.31607
        assert_relative_eq!(shallow.dq, 1.0 + 0.05 * 1.316_074, epsilon = 1e-6);
        assert_eq!(shallow.dgamma, 1.0);

        let deep = depth_factors(0.0, 2.0);
        assert_relative_eq!(deep.dc, 1.0 + 0.4 * 2.0_f64.atan(), epsilon = 1e-12);
        assert!(depth_factors(0.0, 50.0).dc < 1.0 + 0.2 * PI);
    }

    #[test]
    fn test_inclination_factors() {
        assert_eq!(inclination_factors(30.0, 0.0), InclinationFactors::NONE);
        let i = inclination_factors(30.0, 10.0);
        assert_relative_eq!(i.ic, (80.0_f64 / 90.0).powi(2), epsilon = 1e-12);
        assert_eq!(i.ic, i.iq);
        assert_relative_eq!(i.igamma, (2.0_f64 / 3.0).powi(2), epsilon = 1e-12);

        assert_eq!(inclination_factors(20.0, 25.0).igamma, 0.0);
        assert_eq!(inclination_factors(0.0, 5.0).igamma, 0.0);
        assert!(inclination_factors(30.0, 20.0).iq < i.iq);
    }
}
