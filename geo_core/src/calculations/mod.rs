//! # Geotechnical Calculations
//!
//! Solvers built on the formulas in [`crate::equations`]. Every solver is a
//! pure function of its inputs; shared inputs are borrowed and results are
//! owned, JSON-serializable values.
//!
//! ## Available Calculations
//!
//! - [`stress`] - Δσz at a point, stress bulb over a grid, depth profiles
//! - [`bearing`] - Terzaghi / Vesić bearing capacity with depth, inclination
//!   and eccentricity corrections
//! - [`mohr_coulomb`] - Shear strength and Mohr circle checks
//! - [`settlement`] - Immediate elastic settlement
//! - [`consolidation`] - Primary consolidation of clay layers

pub mod bearing;
pub mod consolidation;
pub mod mohr_coulomb;
pub mod settlement;
pub mod stress;

pub use bearing::{
    allowable_bearing_capacity, bearing_capacity, ultimate_bearing_capacity, BearingCapacityInput,
    BearingCapacityResult, BearingOptions,
};
pub use consolidation::{consolidation_settlement, ClayLayer, ConsolidationInput, ConsolidationResult};
pub use mohr_coulomb::{is_failed, shear_strength, StressState};
pub use settlement::{elastic_settlement, SettlementResult};
pub use stress::{compute_bulb, compute_stress, influence_depth, profile_at, BulbResult, Point, StressSample};
