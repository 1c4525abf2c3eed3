//! # Geotechnical Equations
//!
//! Closed-form formulas used by the solvers in [`crate::calculations`]. The
//! functions here are pure and unchecked: they take plain `f64` values and
//! leave input validation and error reporting to their callers.
//!
//! ## Modules
//!
//! - [`influence`] - Elastic stress influence (Newmark corner factor, Boussinesq)
//! - [`bearing`] - Bearing-capacity, shape, depth and inclination factors
//!
//! ## Sign Conventions
//!
//! - **Depth**: `z` positive downward from the loaded surface
//! - **Stress**: compression positive
//! - **Angles**: degrees at function boundaries unless the name says otherwise
//!
//! ## References
//!
//! - Newmark, N. M. (1935), *Simplified computation of vertical pressures in
//!   elastic foundations*, Univ. of Illinois Circular 24
//! - Terzaghi, K. (1943), *Theoretical Soil Mechanics*
//! - Meyerhof, G. G. (1963), *Some recent research on the bearing capacity of foundations*
//! - Hansen, J. B. (1970), *A revised and extended formula for bearing capacity*
//! - Vesić, A. S. (1973), *Analysis of ultimate loads of shallow foundations*
//! - Das, B. M., *Principles of Foundation Engineering*

pub mod bearing;
pub mod influence;

pub use bearing::{
    bearing_factors, depth_factors, inclination_factors, shape_factors, BearingFactorMethod, BearingFactors,
    DepthFactors, InclinationFactors, ShapeFactors,
};
pub use influence::{boussinesq_point_load, corner_influence, rectangle_influence, signed_corner_influence};
