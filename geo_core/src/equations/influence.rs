//! # Elastic Stress Influence
//!
//! Vertical stress increase in a homogeneous, isotropic, linear-elastic
//! half-space.
//!
//! ## Notation
//!
//! - `q` = Uniform surface pressure
//! - `Q` = Concentrated surface load
//! - `z` = Depth below the loaded surface
//! - `m`, `n` = Corner rectangle sides divided by depth (`a/z`, `b/z`)
//! - `I` = Influence factor, Δσz = q·I
//!
//! ## Corner superposition
//!
//! Any point (x, y, z) is the shared corner of four rectangles whose far
//! corners are the footprint corners. With signed sides the footprint
//! `[x1, x2] × [y1, y2]` becomes
//!
//! ```text
//! I = F(x2-x, y2-y) - F(x1-x, y2-y) - F(x2-x, y1-y) + F(x1-x, y1-y)
//! F(a, b) = sgn(a)·sgn(b)·I(|a|/z, |b|/z)
//! ```
//!
//! which covers points inside, outside and on the edge of the footprint
//! without case analysis.

use std::f64::consts::PI;

/// Sides larger than this (in units of depth) are clamped. The factor is
/// within 1e-6 of its asymptote there and squares stay far from overflow.
const MAX_RATIO: f64 = 1.0e6;

// =============================================================================
// UNIFORMLY LOADED RECTANGLE
// =============================================================================

/// Newmark influence factor below the corner of a uniformly loaded rectangle
///
/// # Formula (Newmark 1935)
/// ```text
/// I = 1/(4π)·[ 2mn√(m²+n²+1)/(m²+n²+m²n²+1) · (m²+n²+2)/(m²+n²+1)
///            + atan2(2mn√(m²+n²+1), m²+n²+1-m²n²) ]
/// ```
///
/// `atan2` keeps the angle in (0, π) when m²n² > m²+n²+1, where the plain
/// arctangent would need a +π branch correction.
///
/// # Limits
/// - m = 0 or n = 0 → 0
/// - m, n → ∞ → 1/4
///
/// # Returns
/// I in [0, 0.25]; NaN only when an input is NaN
#[inline]
pub fn corner_influence(m: f64, n: f64) -> f64 {
    if m.is_nan() || n.is_nan() {
        return f64::NAN;
    }
    if m <= 0.0 || n <= 0.0 {
        return 0.0;
    }
    let m = m.min(MAX_RATIO);
    let n = n.min(MAX_RATIO);

    let m2 = m * m;
    let n2 = n * n;
    let v = m2 + n2 + 1.0;
    let root = v.sqrt();

    let term1 = (2.0 * m * n * root / (v + m2 * n2)) * ((v + 1.0) / v);
    let term2 = (2.0 * m * n * root).atan2(v - m2 * n2);

    (term1 + term2) / (4.0 * PI)
}

/// Sign function with sgn(0) = 0
#[inline]
fn sgn(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Signed corner term F(a, b) at depth z
///
/// ```text
/// F(a, b) = sgn(a)·sgn(b)·I(|a|/z, |b|/z)
/// ```
///
/// At z = 0 the factor takes its surface limit: 1/4 when both sides are
/// non-zero, 0 otherwise.
#[inline]
pub fn signed_corner_influence(a: f64, b: f64, z: f64) -> f64 {
    let sign = sgn(a) * sgn(b);
    if sign == 0.0 {
        return 0.0;
    }
    if z == 0.0 {
        return sign * 0.25;
    }
    sign * corner_influence(a.abs() / z, b.abs() / z)
}

/// Influence factor Δσz/q at (x, y, z) for the footprint `[x1, x2] × [y1, y2]`
///
/// # Returns
/// I in [0, 1] (1 only at the contact surface inside the footprint)
#[inline]
pub fn rectangle_influence(x: f64, y: f64, z: f64, x1: f64, x2: f64, y1: f64, y2: f64) -> f64 {
    signed_corner_influence(x2 - x, y2 - y, z) - signed_corner_influence(x1 - x, y2 - y, z)
        - signed_corner_influence(x2 - x, y1 - y, z)
        + signed_corner_influence(x1 - x, y1 - y, z)
}

// =============================================================================
// POINT LOAD
// =============================================================================

/// Boussinesq vertical stress under a surface point load
///
/// # Formula (Boussinesq 1885)
/// ```text
/// Δσz = 3Q·z³ / (2π·R⁵),   R = √(x² + y² + z²)
/// ```
///
/// # Returns
/// Δσz; 0 at R = 0 where the solution is singular
#[inline]
pub fn boussinesq_point_load(q: f64, x: f64, y: f64, z: f64) -> f64 {
    let r = (x * x + y * y + z * z).sqrt();
    if r == 0.0 {
        return 0.0;
    }
    3.0 * q * z.powi(3) / (2.0 * PI * r.powi(5))
}
