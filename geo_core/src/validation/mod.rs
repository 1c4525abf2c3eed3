//! # Validation
//!
//! Gatekeeper between raw requests and the solvers.
//!
//! [`validate`] checks every field of an [`AnalysisRequest`] against
//! [`ValidationLimits`] and reports **all** broken rules at once, in field
//! order. Nothing is clamped. On success it returns a [`ValidatedRequest`],
//! which is the only way into [`crate::analysis::analyze_validated`].
//!
//! Result checks ([`check_bearing`], [`check_settlement`]) follow
//! NBR 6122:2019: FS ≥ 2.0 for the normal combination and a 25 mm
//! settlement limit for ordinary buildings. [`nbr`] holds the full tables
//! (other combinations and structures, presumptive pressures, water table).
//!
//! ## Example
//!
//! ```rust
//! use geo_core::analysis::AnalysisRequest;
//! use geo_core::settings::Settings;
//! use geo_core::validation::validate;
//!
//! let mut request = AnalysisRequest::example();
//! request.soil.friction_angle = -5.0;
//! request.load.applied_pressure = 0.0;
//!
//! let err = validate(&request, &Settings::default()).unwrap_err();
//! let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
//! assert_eq!(fields, ["soil.friction_angle", "load.applied_pressure"]);
//! ```

pub mod nbr;
pub mod reference_cases;

pub use reference_cases::{run_reference_cases, ReferenceCase, ReferenceWarning};

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisRequest;
use crate::calculations::bearing::BearingOptions;
use crate::calculations::consolidation::ConsolidationInput;
use crate::equations::bearing::BearingFactorMethod;
use crate::errors::{GeoError, GeoResult, Violation};
use crate::models::{AnalysisGrid, FootingShape, FoundationGeometry, LoadCondition, SoilProfile};
use crate::settings::{Settings, ValidationLimits};
use nbr::{LoadCombination, SoilClass, StructureType};

/// A request whose every field passed validation.
///
/// Only [`validate`] builds one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRequest {
    label: String,
    soil: SoilProfile,
    foundation: FoundationGeometry,
    load: LoadCondition,
    grid: AnalysisGrid,
    embedment_depth_m: f64,
    shape: FootingShape,
    bearing_method: BearingFactorMethod,
    safety_factor: f64,
    water_table_depth_m: Option<f64>,
    rigid: bool,
    bearing_options: BearingOptions,
    consolidation: Option<ConsolidationInput>,
    load_combination: Option<LoadCombination>,
    structure_type: Option<StructureType>,
    soil_class: Option<SoilClass>,
}

impl ValidatedRequest {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn soil(&self) -> &SoilProfile {
        &self.soil
    }

    pub fn foundation(&self) -> &FoundationGeometry {
        &self.foundation
    }

    pub fn load(&self) -> &LoadCondition {
        &self.load
    }

    pub fn grid(&self) -> &AnalysisGrid {
        &self.grid
    }

    pub fn embedment_depth_m(&self) -> f64 {
        self.embedment_depth_m
    }

    pub fn shape(&self) -> FootingShape {
        self.shape
    }

    pub fn bearing_method(&self) -> BearingFactorMethod {
        self.bearing_method
    }

    /// FS requested, or the settings default
    pub fn safety_factor(&self) -> f64 {
        self.safety_factor
    }

    pub fn water_table_depth_m(&self) -> Option<f64> {
        self.water_table_depth_m
    }

    pub fn rigid(&self) -> bool {
        self.rigid
    }

    pub fn bearing_options(&self) -> &BearingOptions {
        &self.bearing_options
    }

    pub fn consolidation(&self) -> Option<&ConsolidationInput> {
        self.consolidation.as_ref()
    }

    pub fn load_combination(&self) -> Option<LoadCombination> {
        self.load_combination
    }

    pub fn structure_type(&self) -> Option<StructureType> {
        self.structure_type
    }

    pub fn soil_class(&self) -> Option<SoilClass> {
        self.soil_class
    }
}

/// Collects violations in the order fields are checked.
#[derive(Default)]
struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    /// Record a violation unless `ok`. NaN fails every comparison, so write
    /// `ok` as the positive condition.
    fn require(&mut self, ok: bool, field: &str, value: impl ToString, rule: impl Into<String>) {
        if !ok {
            self.violations.push(Violation::new(field, value, rule));
        }
    }
}

fn check_soil(c: &mut Checker, request: &AnalysisRequest, settings: &Settings) {
    let limits = &settings.limits;
    let soil = &request.soil;

    c.require(
        soil.unit_weight > 0.0 && soil.unit_weight <= limits.max_unit_weight,
        "soil.unit_weight",
        soil.unit_weight,
        format!("must be in (0, {}] kN/m³", limits.max_unit_weight),
    );
    c.require(
        soil.friction_angle >= limits.min_friction_angle && soil.friction_angle <= limits.max_friction_angle,
        "soil.friction_angle",
        soil.friction_angle,
        format!(
            "must be in [{}, {}] degrees",
            limits.min_friction_angle, limits.max_friction_angle
        ),
    );
    c.require(
        soil.cohesion >= 0.0 && soil.cohesion <= limits.max_cohesion,
        "soil.cohesion",
        soil.cohesion,
        format!("must be in [0, {}] kPa", limits.max_cohesion),
    );
    c.require(
        soil.elastic_modulus > 0.0 && soil.elastic_modulus.is_finite(),
        "soil.elastic_modulus",
        soil.elastic_modulus,
        "must be positive",
    );
    let nu = soil.poisson_ratio.unwrap_or(settings.default_poisson_ratio);
    c.require(
        nu >= 0.0 && nu < limits.max_poisson_ratio,
        "soil.poisson_ratio",
        nu,
        format!("must be in [0, {})", limits.max_poisson_ratio),
    );
}

fn check_foundation(c: &mut Checker, request: &AnalysisRequest, limits: &ValidationLimits) {
    let f = &request.foundation;
    let length_ok = f.length_m > 0.0 && f.length_m.is_finite();
    let width_ok = f.width_m > 0.0 && f.width_m.is_finite();
    c.require(length_ok, "foundation.length_m", f.length_m, "must be positive");
    c.require(width_ok, "foundation.width_m", f.width_m, "must be positive");
    if !(length_ok && width_ok) {
        return;
    }

    let least = f.length_m.min(f.width_m);
    let greatest = f.length_m.max(f.width_m);
    c.require(
        least >= limits.min_footing_width_m,
        "foundation.least_dimension",
        least,
        format!("must be at least {} m (NBR 6122)", limits.min_footing_width_m),
    );

    if request.shape.is_isolated() {
        c.require(
            greatest <= limits.max_footing_dimension_m,
            "foundation.greatest_dimension",
            greatest,
            format!("must not exceed {} m for a shallow footing", limits.max_footing_dimension_m),
        );
        let ratio = greatest / least;
        c.require(
            ratio <= limits.max_aspect_ratio,
            "foundation.aspect_ratio",
            format!("{:.3}", ratio),
            format!("L/B must not exceed {} for isolated footings", limits.max_aspect_ratio),
        );
    } else {
        c.require(
            least <= limits.max_footing_dimension_m,
            "foundation.least_dimension",
            least,
            format!("must not exceed {} m for a shallow footing", limits.max_footing_dimension_m),
        );
    }
}

fn check_load(c: &mut Checker, request: &AnalysisRequest, limits: &ValidationLimits) {
    let q = request.load.applied_pressure;
    c.require(
        q > 0.0 && q <= limits.max_applied_pressure,
        "load.applied_pressure",
        q,
        format!("must be in (0, {}] kPa", limits.max_applied_pressure),
    );
}

fn check_grid(c: &mut Checker, request: &AnalysisRequest, limits: &ValidationLimits) {
    let g = &request.grid;
    c.require(
        g.depth_start >= 0.0 && g.depth_start.is_finite(),
        "grid.depth_start",
        g.depth_start,
        "must be finite and non-negative",
    );
    c.require(
        g.depth_end > g.depth_start && g.depth_end.is_finite(),
        "grid.depth_end",
        g.depth_end,
        format!("must be greater than depth_start ({})", g.depth_start),
    );
    c.require(
        g.resolution >= 1 && g.resolution <= limits.max_grid_resolution,
        "grid.resolution",
        g.resolution,
        format!("must be in [1, {}]", limits.max_grid_resolution),
    );
    if let Some(extent) = g.lateral_extent {
        c.require(
            extent > 0.0 && extent.is_finite(),
            "grid.lateral_extent",
            extent,
            "must be positive",
        );
    }
}

fn check_bearing_inputs(c: &mut Checker, request: &AnalysisRequest, settings: &Settings) {
    c.require(
        request.embedment_depth_m >= 0.0 && request.embedment_depth_m.is_finite(),
        "embedment_depth_m",
        request.embedment_depth_m,
        "must be finite and non-negative",
    );
    if let Some(dw) = request.water_table_depth_m {
        c.require(
            dw >= 0.0 && dw.is_finite(),
            "water_table_depth_m",
            dw,
            "must be finite and non-negative",
        );
    }
    let fs = request.safety_factor.unwrap_or(settings.safety_factor);
    let (min_fs, basis) = match request.load_combination {
        Some(combination) => (combination.minimum_safety_factor(), format!("{} combination", combination)),
        None => (settings.limits.min_safety_factor, "normal combination".to_string()),
    };
    c.require(
        fs >= min_fs && fs.is_finite(),
        "safety_factor",
        fs,
        format!("must be at least {} (NBR 6122, {})", min_fs, basis),
    );

    let options = &request.bearing_options;
    let alpha = options.load_inclination_deg;
    c.require(
        alpha >= 0.0 && alpha < 90.0,
        "bearing_options.load_inclination_deg",
        alpha,
        "must be in [0, 90) degrees",
    );
    let f = &request.foundation;
    c.require(
        options.eccentricity_width_m.is_finite() && 2.0 * options.eccentricity_width_m.abs() < f.width_m,
        "bearing_options.eccentricity_width_m",
        options.eccentricity_width_m,
        format!("must be less than half the width ({} m)", f.width_m / 2.0),
    );
    c.require(
        options.eccentricity_length_m.is_finite() && 2.0 * options.eccentricity_length_m.abs() < f.length_m,
        "bearing_options.eccentricity_length_m",
        options.eccentricity_length_m,
        format!("must be less than half the length ({} m)", f.length_m / 2.0),
    );
    c.require(
        options.surcharge_kpa >= 0.0 && options.surcharge_kpa.is_finite(),
        "bearing_options.surcharge_kpa",
        options.surcharge_kpa,
        "must be finite and non-negative",
    );
}

fn check_consolidation(c: &mut Checker, request: &AnalysisRequest, limits: &ValidationLimits) {
    let Some(input) = &request.consolidation else {
        return;
    };
    c.require(
        !input.layers.is_empty(),
        "consolidation.layers",
        input.layers.len(),
        "must list at least one layer",
    );
    for (i, layer) in input.layers.iter().enumerate() {
        let field = |name: &str| format!("consolidation.layers[{}].{}", i, name);
        c.require(
            layer.thickness_m > 0.0 && layer.thickness_m.is_finite(),
            &field("thickness_m"),
            layer.thickness_m,
            "must be positive",
        );
        c.require(
            layer.compression_index >= 0.0 && layer.compression_index.is_finite(),
            &field("compression_index"),
            layer.compression_index,
            "must be finite and non-negative",
        );
        c.require(
            layer.recompression_index >= 0.0 && layer.recompression_index.is_finite(),
            &field("recompression_index"),
            layer.recompression_index,
            "must be finite and non-negative",
        );
        c.require(
            layer.initial_void_ratio > 0.0 && layer.initial_void_ratio.is_finite(),
            &field("initial_void_ratio"),
            layer.initial_void_ratio,
            "must be positive",
        );
        c.require(
            layer.overconsolidation_ratio >= 1.0 && layer.overconsolidation_ratio.is_finite(),
            &field("overconsolidation_ratio"),
            layer.overconsolidation_ratio,
            "must be at least 1",
        );
        if let Some(sigma) = layer.initial_effective_stress_kpa {
            c.require(
                sigma > 0.0 && sigma.is_finite(),
                &field("initial_effective_stress_kpa"),
                sigma,
                "must be positive",
            );
        }
        if let Some(gamma) = layer.unit_weight {
            c.require(
                gamma > 0.0 && gamma <= limits.max_unit_weight,
                &field("unit_weight"),
                gamma,
                format!("must be in (0, {}] kN/m³", limits.max_unit_weight),
            );
        }
    }
    if let Some(t) = input.time_years {
        c.require(
            t >= 0.0 && t.is_finite(),
            "consolidation.time_years",
            t,
            "must be finite and non-negative",
        );
    }
    if let Some(cv) = input.coefficient_of_consolidation {
        c.require(
            cv > 0.0 && cv.is_finite(),
            "consolidation.coefficient_of_consolidation",
            cv,
            "must be positive",
        );
    }
}

/// Check every field of `request`; all violations are reported together.
pub fn validate(request: &AnalysisRequest, settings: &Settings) -> GeoResult<ValidatedRequest> {
    let mut checker = Checker::default();
    check_soil(&mut checker, request, settings);
    check_foundation(&mut checker, request, &settings.limits);
    check_load(&mut checker, request, &settings.limits);
    check_grid(&mut checker, request, &settings.limits);
    check_bearing_inputs(&mut checker, request, settings);
    check_consolidation(&mut checker, request, &settings.limits);

    if !checker.violations.is_empty() {
        log::debug!(
            "Request '{}' failed validation with {} violation(s)",
            request.label,
            checker.violations.len()
        );
        return Err(GeoError::validation(checker.violations));
    }

    let g = &request.grid;
    let mut grid = AnalysisGrid::new(g.depth_start, g.depth_end, g.resolution)?;
    if let Some(extent) = g.lateral_extent {
        grid = grid.with_lateral_extent(extent)?;
    }

    Ok(ValidatedRequest {
        label: request.label.clone(),
        soil: SoilProfile::new(request.soil.clone(), settings.default_poisson_ratio)?,
        foundation: FoundationGeometry::new(request.foundation.length_m, request.foundation.width_m)?,
        load: LoadCondition::new(request.load.applied_pressure)?,
        grid,
        embedment_depth_m: request.embedment_depth_m,
        shape: request.shape,
        bearing_method: request.bearing_method,
        safety_factor: request.safety_factor.unwrap_or(settings.safety_factor),
        water_table_depth_m: request.water_table_depth_m,
        rigid: request.rigid,
        bearing_options: request.bearing_options,
        consolidation: request.consolidation.clone(),
        load_combination: request.load_combination,
        structure_type: request.structure_type,
        soil_class: request.soil_class,
    })
}

/// [`validate`] followed by the reference-case self check.
pub fn validate_with_report(
    request: &AnalysisRequest,
    settings: &Settings,
) -> GeoResult<(ValidatedRequest, Vec<ReferenceWarning>)> {
    let validated = validate(request, settings)?;
    Ok((validated, run_reference_cases()))
}

// ============================================================================
// Result checks
// ============================================================================

/// Bearing check against the required global safety factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingCheck {
    /// qu / q; `None` for a zero applied pressure
    pub safety_factor: Option<f64>,
    pub required_safety_factor: f64,
    /// FS required / FS provided
    pub utilization: f64,
    pub passes: bool,
}

/// Settlement check against the admissible settlement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettlementCheck {
    pub settlement_m: f64,
    pub limit_m: f64,
    /// limit - settlement (m)
    pub margin_m: f64,
    pub passes: bool,
}

/// Compare qu with the applied pressure.
pub fn check_bearing(ultimate_kpa: f64, applied_kpa: f64, required_safety_factor: f64) -> BearingCheck {
    if applied_kpa <= 0.0 {
        return BearingCheck {
            safety_factor: None,
            required_safety_factor,
            utilization: 0.0,
            passes: true,
        };
    }
    let fs = ultimate_kpa / applied_kpa;
    BearingCheck {
        safety_factor: Some(fs),
        required_safety_factor,
        utilization: if fs > 0.0 { required_safety_factor / fs } else { f64::INFINITY },
        passes: fs >= required_safety_factor,
    }
}

/// Compare a settlement with its limit.
pub fn check_settlement(settlement_m: f64, limit_m: f64) -> SettlementCheck {
    SettlementCheck {
        settlement_m,
        limit_m,
        margin_m: limit_m - settlement_m,
        passes: settlement_m <= limit_m,
    }
}
