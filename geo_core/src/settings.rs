//! # Analysis Settings
//!
//! Engine-wide configuration: safety factor, default material constants,
//! serviceability limits, parallelism threshold and the normative bounds the
//! validation layer enforces. Settings serialize to TOML (standalone config
//! file) and JSON (embedded in project files).
//!
//! ```toml
//! safety_factor = 3.0
//! settlement_limit_m = 0.025
//!
//! [limits]
//! min_footing_width_m = 0.6
//! max_aspect_ratio = 3.0
//! ```
//!
//! Any key left out of the file keeps its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{GeoError, GeoResult};

/// Global engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Global safety factor applied to the ultimate bearing capacity
    pub safety_factor: f64,

    /// Poisson's ratio used when a soil profile does not specify one
    pub default_poisson_ratio: f64,

    /// Unit weight of water (kN/m³)
    pub water_unit_weight: f64,

    /// Admissible immediate settlement (m), 25 mm for ordinary buildings
    pub settlement_limit_m: f64,

    /// Grids with more points than this are evaluated in parallel
    pub parallel_threshold: usize,

    /// Normative validation bounds
    pub limits: ValidationLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            safety_factor: 3.0,
            default_poisson_ratio: 0.3,
            water_unit_weight: 9.81,
            settlement_limit_m: 0.025,
            parallel_threshold: 4096,
            limits: ValidationLimits::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> GeoResult<Self> {
        toml::from_str(text).map_err(|e| GeoError::serialization(format!("Invalid settings TOML: {}", e)))
    }

    /// Load settings from a TOML file.
    pub fn from_toml_file(path: &Path) -> GeoResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| GeoError::file_error("read settings", path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&text)
    }

    /// Render settings as TOML text.
    pub fn to_toml_string(&self) -> GeoResult<String> {
        toml::to_string_pretty(self).map_err(GeoError::serialization)
    }
}

/// Bounds checked by [`crate::validation::validate`].
///
/// Footing and safety-factor bounds follow NBR 6122:2019; soil ranges cover
/// the physically meaningful span of natural soils.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Maximum unit weight γ (kN/m³)
    pub max_unit_weight: f64,
    /// Minimum friction angle φ (degrees)
    pub min_friction_angle: f64,
    /// Maximum friction angle φ (degrees), upper end of the bearing tables
    pub max_friction_angle: f64,
    /// Maximum cohesion c (kPa)
    pub max_cohesion: f64,
    /// Maximum Poisson's ratio (exclusive)
    pub max_poisson_ratio: f64,
    /// Minimum footing dimension (m), NBR 6122 item 6.3.2
    pub min_footing_width_m: f64,
    /// Maximum footing dimension for a shallow footing (m)
    pub max_footing_dimension_m: f64,
    /// Maximum L/B for isolated footings
    pub max_aspect_ratio: f64,
    /// Maximum applied pressure (kPa)
    pub max_applied_pressure: f64,
    /// Maximum grid resolution per axis
    pub max_grid_resolution: usize,
    /// Minimum global safety factor, NBR 6122 normal combination
    pub min_safety_factor: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        ValidationLimits {
            max_unit_weight: 30.0,
            min_friction_angle: 0.0,
            max_friction_angle: 50.0,
            max_cohesion: 1000.0,
            max_poisson_ratio: 0.5,
            min_footing_width_m: 0.60,
            max_footing_dimension_m: 10.0,
            max_aspect_ratio: 3.0,
            max_applied_pressure: 10_000.0,
            max_grid_resolution: 200,
            min_safety_factor: 2.0,
        }
    }
}
