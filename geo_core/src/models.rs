//! # Geotechnical Models
//!
//! Value objects describing one analysis: the soil, the footing, the load it
//! carries and the grid on which the stress field is sampled.
//!
//! Each domain type comes in two flavours:
//!
//! - `*Input` - plain JSON-friendly structs with public fields, exactly what a
//!   form or a request file provides. They may hold any value.
//! - The validated type ([`SoilProfile`], [`FoundationGeometry`],
//!   [`LoadCondition`], [`AnalysisGrid`]) - private fields, built through
//!   `new`/`TryFrom`, immutable afterwards. Constructors enforce the physical
//!   invariants; the narrower normative bounds live in [`crate::validation`].
//!
//! ## Coordinates
//!
//! The footprint is centred at the origin with its length `L` along x and its
//! width `B` along y. Depth `z` is positive downwards from the footing base.
//!
//! ## Example
//!
//! ```rust
//! use geo_core::models::{FoundationGeometry, LoadCondition};
//!
//! let footing = FoundationGeometry::new(2.0, 1.5).unwrap();
//! let load = LoadCondition::new(200.0).unwrap();
//! assert_eq!(footing.area_m2(), 3.0);
//! assert_eq!(load.total_load(&footing).0, 600.0);
//! assert!(FoundationGeometry::new(-1.0, 1.0).is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{GeoError, GeoResult};
use crate::soils::SoilCatalogEntry;
use crate::units::{Degrees, KiloNewtons, KiloPascals, KnPerM3, Meters};

/// Poisson's ratio assumed when neither the input nor the catalog gives one
pub const DEFAULT_POISSON_RATIO: f64 = 0.3;

fn require_finite(quantity: &str, value: f64) -> GeoResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GeoError::domain(quantity, value, "Value must be a finite number"))
    }
}

// ============================================================================
// Soil
// ============================================================================

/// Raw soil parameters.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "Areia Média",
///   "unit_weight": 18.0,
///   "friction_angle": 32.0,
///   "cohesion": 0.0,
///   "elastic_modulus": 35000.0,
///   "poisson_ratio": 0.3
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilInput {
    /// Display name (free text, may be empty)
    #[serde(default)]
    pub name: String,
    /// Unit weight γ (kN/m³)
    pub unit_weight: f64,
    /// Friction angle φ (degrees)
    pub friction_angle: f64,
    /// Cohesion c (kPa)
    pub cohesion: f64,
    /// Elastic modulus E (kPa)
    pub elastic_modulus: f64,
    /// Poisson's ratio ν; default applied when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poisson_ratio: Option<f64>,
}

impl From<&SoilCatalogEntry> for SoilInput {
    fn from(entry: &SoilCatalogEntry) -> Self {
        SoilInput {
            name: entry.name.clone(),
            unit_weight: entry.unit_weight,
            friction_angle: entry.friction_angle,
            cohesion: entry.cohesion,
            elastic_modulus: entry.elastic_modulus,
            poisson_ratio: entry.poisson_ratio,
        }
    }
}

/// Validated soil profile (homogeneous half-space).
///
/// Invariants: γ > 0, 0 ≤ φ < 90, c ≥ 0, E > 0, 0 ≤ ν < 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SoilInput", into = "SoilInput")]
pub struct SoilProfile {
    name: String,
    unit_weight: f64,
    friction_angle: f64,
    cohesion: f64,
    elastic_modulus: f64,
    poisson_ratio: f64,
}

impl SoilProfile {
    /// Build a profile, filling a missing Poisson's ratio with `default_poisson_ratio`.
    pub fn new(input: SoilInput, default_poisson_ratio: f64) -> GeoResult<Self> {
        let poisson_ratio = input.poisson_ratio.unwrap_or(default_poisson_ratio);

        require_finite("unit_weight", input.unit_weight)?;
        require_finite("friction_angle", input.friction_angle)?;
        require_finite("cohesion", input.cohesion)?;
        require_finite("elastic_modulus", input.elastic_modulus)?;
        require_finite("poisson_ratio", poisson_ratio)?;

        if input.unit_weight <= 0.0 {
            return Err(GeoError::domain("unit_weight", input.unit_weight, "Unit weight must be positive"));
        }
        if !(0.0..90.0).contains(&input.friction_angle) {
            return Err(GeoError::domain(
                "friction_angle",
                input.friction_angle,
                "Friction angle must be in [0, 90) degrees",
            ));
        }
        if input.cohesion < 0.0 {
            return Err(GeoError::domain("cohesion", input.cohesion, "Cohesion cannot be negative"));
        }
        if input.elastic_modulus <= 0.0 {
            return Err(GeoError::domain(
                "elastic_modulus",
                input.elastic_modulus,
                "Elastic modulus must be positive",
            ));
        }
        if !(0.0..0.5).contains(&poisson_ratio) {
            return Err(GeoError::domain("poisson_ratio", poisson_ratio, "Poisson's ratio must be in [0, 0.5)"));
        }

        Ok(SoilProfile {
            name: input.name,
            unit_weight: input.unit_weight,
            friction_angle: input.friction_angle,
            cohesion: input.cohesion,
            elastic_modulus: input.elastic_modulus,
            poisson_ratio,
        })
    }

    /// Build a profile straight from a catalog entry.
    pub fn from_catalog(entry: &SoilCatalogEntry) -> GeoResult<Self> {
        Self::new(SoilInput::from(entry), DEFAULT_POISSON_RATIO)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// γ (kN/m³)
    pub fn unit_weight(&self) -> KnPerM3 {
        KnPerM3(self.unit_weight)
    }

    /// φ (degrees)
    pub fn friction_angle(&self) -> Degrees {
        Degrees(self.friction_angle)
    }

    /// c (kPa)
    pub fn cohesion(&self) -> KiloPascals {
        KiloPascals(self.cohesion)
    }

    /// E (kPa)
    pub fn elastic_modulus(&self) -> KiloPascals {
        KiloPascals(self.elastic_modulus)
    }

    /// ν
    pub fn poisson_ratio(&self) -> f64 {
        self.poisson_ratio
    }
}

impl TryFrom<SoilInput> for SoilProfile {
    type Error = GeoError;

    fn try_from(input: SoilInput) -> GeoResult<Self> {
        SoilProfile::new(input, DEFAULT_POISSON_RATIO)
    }
}

impl From<SoilProfile> for SoilInput {
    fn from(profile: SoilProfile) -> Self {
        SoilInput {
            name: profile.name,
            unit_weight: profile.unit_weight,
            friction_angle: profile.friction_angle,
            cohesion: profile.cohesion,
            elastic_modulus: profile.elastic_modulus,
            poisson_ratio: Some(profile.poisson_ratio),
        }
    }
}

impl fmt::Display for SoilProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() { "Soil" } else { &self.name };
        write!(
            f,
            "{} (γ = {} kN/m³, φ = {}°, c = {} kPa)",
            name, self.unit_weight, self.friction_angle, self.cohesion
        )
    }
}

// ============================================================================
// Foundation
// ============================================================================

/// Raw footing dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoundationInput {
    /// Length L along x (m)
    pub length_m: f64,
    /// Width B along y (m)
    pub width_m: f64,
}

/// Rectangular footprint centred at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FoundationInput", into = "FoundationInput")]
pub struct FoundationGeometry {
    length: f64,
    width: f64,
}

impl FoundationGeometry {
    pub fn new(length_m: f64, width_m: f64) -> GeoResult<Self> {
        require_finite("length", length_m)?;
        require_finite("width", width_m)?;
        if length_m <= 0.0 {
            return Err(GeoError::domain("length", length_m, "Footing length must be positive"));
        }
        if width_m <= 0.0 {
            return Err(GeoError::domain("width", width_m, "Footing width must be positive"));
        }
        Ok(FoundationGeometry {
            length: length_m,
            width: width_m,
        })
    }

    /// L, along x (m)
    pub fn length(&self) -> Meters {
        Meters(self.length)
    }

    /// B, along y (m)
    pub fn width(&self) -> Meters {
        Meters(self.width)
    }

    pub fn area_m2(&self) -> f64 {
        self.length * self.width
    }

    /// Smaller plan dimension, the `B` of bearing-capacity formulas
    pub fn least_dimension(&self) -> f64 {
        self.length.min(self.width)
    }

    pub fn greatest_dimension(&self) -> f64 {
        self.length.max(self.width)
    }

    /// Greatest over least dimension (≥ 1)
    pub fn aspect_ratio(&self) -> f64 {
        self.greatest_dimension() / self.least_dimension()
    }

    /// Footprint bounds `(x1, x2, y1, y2)`
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let hl = self.length / 2.0;
        let hw = self.width / 2.0;
        (-hl, hl, -hw, hw)
    }

    /// True when (x, y) lies inside or on the edge of the footprint
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x.abs() <= self.length / 2.0 && y.abs() <= self.width / 2.0
    }
}

impl TryFrom<FoundationInput> for FoundationGeometry {
    type Error = GeoError;

    fn try_from(input: FoundationInput) -> GeoResult<Self> {
        FoundationGeometry::new(input.length_m, input.width_m)
    }
}

impl From<FoundationGeometry> for FoundationInput {
    fn from(geometry: FoundationGeometry) -> Self {
        FoundationInput {
            length_m: geometry.length,
            width_m: geometry.width,
        }
    }
}

/// Footing plan shape, selects the bearing-capacity shape factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FootingShape {
    /// Continuous footing (L ≫ B)
    Strip,
    /// Square footing
    Square,
    /// Circular footing, width is the diameter
    Circular,
    /// Rectangular footing, factors interpolated on B/L
    #[default]
    Rectangular,
}

impl FootingShape {
    pub const ALL: [FootingShape; 4] = [
        FootingShape::Strip,
        FootingShape::Square,
        FootingShape::Circular,
        FootingShape::Rectangular,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            FootingShape::Strip => "Strip",
            FootingShape::Square => "Square",
            FootingShape::Circular => "Circular",
            FootingShape::Rectangular => "Rectangular",
        }
    }

    /// Isolated footings are subject to the L/B limit
    pub fn is_isolated(&self) -> bool {
        !matches!(self, FootingShape::Strip)
    }
}

impl fmt::Display for FootingShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Load
// ============================================================================

/// Raw applied load
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadInput {
    /// Uniform contact pressure q (kPa)
    pub applied_pressure: f64,
}

/// Uniform pressure over the whole footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LoadInput", into = "LoadInput")]
pub struct LoadCondition {
    applied_pressure: f64,
}

impl LoadCondition {
    pub fn new(applied_pressure_kpa: f64) -> GeoResult<Self> {
        require_finite("applied_pressure", applied_pressure_kpa)?;
        if applied_pressure_kpa <= 0.0 {
            return Err(GeoError::domain(
                "applied_pressure",
                applied_pressure_kpa,
                "Applied pressure must be positive",
            ));
        }
        Ok(LoadCondition {
            applied_pressure: applied_pressure_kpa,
        })
    }

    /// q (kPa)
    pub fn applied_pressure(&self) -> KiloPascals {
        KiloPascals(self.applied_pressure)
    }

    /// Resultant q·L·B (kN)
    pub fn total_load(&self, foundation: &FoundationGeometry) -> KiloNewtons {
        self.applied_pressure().over_area(foundation.area_m2())
    }
}

impl TryFrom<LoadInput> for LoadCondition {
    type Error = GeoError;

    fn try_from(input: LoadInput) -> GeoResult<Self> {
        LoadCondition::new(input.applied_pressure)
    }
}

impl From<LoadCondition> for LoadInput {
    fn from(load: LoadCondition) -> Self {
        LoadInput {
            applied_pressure: load.applied_pressure,
        }
    }
}

// ============================================================================
// Grid
// ============================================================================

/// Raw sampling grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridInput {
    /// First sampled depth z0 (m)
    pub depth_start: f64,
    /// Last sampled depth z1 (m)
    pub depth_end: f64,
    /// Points per axis
    pub resolution: usize,
    /// Half-width X of the lateral window; 2·max(L, B) when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lateral_extent: Option<f64>,
}

/// Sampling grid for the stress bulb.
///
/// Depths are `resolution` evenly spaced values in `[z0, z1]`; each lateral
/// axis holds `resolution` evenly spaced offsets in `[-X, X]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridInput", into = "GridInput")]
pub struct AnalysisGrid {
    depth_start: f64,
    depth_end: f64,
    resolution: usize,
    lateral_extent: Option<f64>,
}

impl AnalysisGrid {
    pub fn new(depth_start: f64, depth_end: f64, resolution: usize) -> GeoResult<Self> {
        require_finite("depth_start", depth_start)?;
        require_finite("depth_end", depth_end)?;
        if depth_start < 0.0 {
            return Err(GeoError::domain("depth_start", depth_start, "Start depth cannot be negative"));
        }
        if depth_end <= depth_start {
            return Err(GeoError::domain(
                "depth_end",
                depth_end,
                format!("End depth must exceed start depth {}", depth_start),
            ));
        }
        if resolution < 1 {
            return Err(GeoError::domain("resolution", resolution, "Resolution must be at least 1"));
        }
        Ok(AnalysisGrid {
            depth_start,
            depth_end,
            resolution,
            lateral_extent: None,
        })
    }

    /// Fix the lateral half-width instead of deriving it from the footing.
    pub fn with_lateral_extent(mut self, extent_m: f64) -> GeoResult<Self> {
        require_finite("lateral_extent", extent_m)?;
        if extent_m <= 0.0 {
            return Err(GeoError::domain("lateral_extent", extent_m, "Lateral extent must be positive"));
        }
        self.lateral_extent = Some(extent_m);
        Ok(self)
    }

    /// Grid covering `depth_ratio` × the greatest footing dimension, like the
    /// classic bulb plots (0.01 m start avoids the contact surface).
    pub fn for_foundation(foundation: &FoundationGeometry, depth_ratio: f64, resolution: usize) -> GeoResult<Self> {
        Self::new(0.01, depth_ratio * foundation.greatest_dimension(), resolution)
    }

    pub fn depth_start(&self) -> f64 {
        self.depth_start
    }

    pub fn depth_end(&self) -> f64 {
        self.depth_end
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Lateral half-width X used for `foundation`
    pub fn lateral_extent(&self, foundation: &FoundationGeometry) -> f64 {
        self.lateral_extent
            .unwrap_or_else(|| 2.0 * foundation.greatest_dimension())
    }

    /// Sampled depths, ascending
    pub fn depths(&self) -> Vec<f64> {
        linspace(self.depth_start, self.depth_end, self.resolution)
    }

    /// Sampled lateral offsets on one horizontal axis
    pub fn lateral_offsets(&self, foundation: &FoundationGeometry) -> Vec<f64> {
        if self.resolution == 1 {
            return vec![0.0];
        }
        let extent = self.lateral_extent(foundation);
        linspace(-extent, extent, self.resolution)
    }

    /// Total number of 3D points (n³)
    pub fn point_count(&self) -> usize {
        self.resolution.pow(3)
    }
}

impl TryFrom<GridInput> for AnalysisGrid {
    type Error = GeoError;

    fn try_from(input: GridInput) -> GeoResult<Self> {
        let grid = AnalysisGrid::new(input.depth_start, input.depth_end, input.resolution)?;
        match input.lateral_extent {
            Some(extent) => grid.with_lateral_extent(extent),
            None => Ok(grid),
        }
    }
}

impl From<AnalysisGrid> for GridInput {
    fn from(grid: AnalysisGrid) -> Self {
        GridInput {
            depth_start: grid.depth_start,
            depth_end: grid.depth_end,
            resolution: grid.resolution,
            lateral_extent: grid.lateral_extent,
        }
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive (`[start]` for n = 1)
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
