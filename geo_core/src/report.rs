//! # Reporting
//!
//! Presentation-ready views of an analysis:
//!
//! - [`BulbTable`] - the bulb samples as a fixed-column table with CSV rendering
//! - [`ReportMetadata`] - inputs, analysis id and timestamp
//! - [`TechnicalSummary`] - the figures an engineer reads first, printable in
//!   SI, MKS or imperial units
//!
//! ## CSV layout
//!
//! ```text
//! x,y,z,delta_sigma_z,influence_pct,valid
//! -4.000000,-4.000000,0.100000,0.000000,0.000000,true
//! ```
//!
//! Invalid samples leave `delta_sigma_z` and `influence_pct` empty.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{AnalysisOutcome, CentreStress, InfluenceDepth};
use crate::calculations::bearing::BearingCapacityResult;
use crate::calculations::consolidation::ConsolidationResult;
use crate::calculations::settlement::SettlementResult;
use crate::calculations::stress::BulbResult;
use crate::models::{AnalysisGrid, FoundationGeometry, LoadCondition, SoilProfile};
use crate::units::{Quantity, UnitSystem};
use crate::validation::nbr::{NbrCompliance, RiskLevel};
use crate::validation::{BearingCheck, ReferenceWarning, SettlementCheck, ValidatedRequest};

// ============================================================================
// Bulb table
// ============================================================================

/// One table row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulbRow {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub delta_sigma_z: Option<f64>,
    pub influence_pct: Option<f64>,
    pub valid: bool,
}

/// Column-ordered view of a [`BulbResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulbTable {
    rows: Vec<BulbRow>,
}

impl BulbTable {
    /// Column names, in output order
    pub const COLUMNS: [&'static str; 6] = ["x", "y", "z", "delta_sigma_z", "influence_pct", "valid"];

    pub fn from_bulb(bulb: &BulbResult) -> Self {
        let q = bulb.applied_pressure();
        let rows = bulb
            .samples()
            .iter()
            .map(|s| BulbRow {
                x: s.x,
                y: s.y,
                z: s.z,
                delta_sigma_z: s.delta_sigma_z,
                influence_pct: s.influence_pct(q),
                valid: s.is_valid(),
            })
            .collect();
        BulbTable { rows }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &Self::COLUMNS
    }

    pub fn rows(&self) -> &[BulbRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as CSV with a header line.
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(64 * (self.rows.len() + 1));
        out.push_str(&Self::COLUMNS.join(","));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format!(
                "{:.6},{:.6},{:.6},{},{},{}\n",
                row.x,
                row.y,
                row.z,
                optional_cell(row.delta_sigma_z),
                optional_cell(row.influence_pct),
                row.valid
            ));
        }
        out
    }
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.6}", v)).unwrap_or_default()
}

// ============================================================================
// Metadata
// ============================================================================

/// Inputs and identity of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub label: String,
    pub soil: SoilProfile,
    pub foundation: FoundationGeometry,
    pub load: LoadCondition,
    pub grid: AnalysisGrid,
    pub engine_version: String,
}

impl ReportMetadata {
    pub fn new(request: &ValidatedRequest) -> Self {
        ReportMetadata {
            analysis_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            label: request.label().to_string(),
            soil: request.soil().clone(),
            foundation: *request.foundation(),
            load: *request.load(),
            grid: *request.grid(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// ============================================================================
// Technical summary
// ============================================================================

/// Headline results and recommendations of an analysis
#[derive(Debug, Clone, Serialize)]
pub struct TechnicalSummary {
    pub metadata: ReportMetadata,
    pub influence_depths: Vec<InfluenceDepth>,
    pub centre_stresses: Vec<CentreStress>,
    pub bearing: BearingCapacityResult,
    pub bearing_check: BearingCheck,
    pub settlement: SettlementResult,
    pub consolidation: Option<ConsolidationResult>,
    pub total_settlement_m: f64,
    pub settlement_check: SettlementCheck,
    pub nbr: NbrCompliance,
    pub warnings: Vec<ReferenceWarning>,
    pub recommendations: Vec<String>,
}

impl TechnicalSummary {
    pub fn from_outcome(outcome: &AnalysisOutcome) -> Self {
        TechnicalSummary {
            metadata: outcome.metadata.clone(),
            influence_depths: outcome.influence_depths.clone(),
            centre_stresses: outcome.centre_stresses.clone(),
            bearing: outcome.bearing.clone(),
            bearing_check: outcome.bearing_check,
            settlement: outcome.settlement,
            consolidation: outcome.consolidation.clone(),
            total_settlement_m: outcome.total_settlement_m,
            settlement_check: outcome.settlement_check,
            nbr: outcome.nbr.clone(),
            warnings: outcome.warnings.clone(),
            recommendations: recommendations(outcome),
        }
    }

    /// True when both design checks pass
    pub fn passes(&self) -> bool {
        self.bearing_check.passes && self.settlement_check.passes
    }

    /// Plain-text report in the requested unit system.
    pub fn render_text(&self, units: UnitSystem) -> String {
        SummaryText { summary: self, units }.to_string()
    }
}

fn recommendations(outcome: &AnalysisOutcome) -> Vec<String> {
    let mut out = Vec::new();
    let b = outcome.metadata.foundation.least_dimension();

    if !outcome.bearing_check.passes {
        out.push(format!(
            "Bearing: FS below {:.1}. Increase the footing area or the embedment depth.",
            outcome.bearing_check.required_safety_factor
        ));
    }
    if !outcome.nbr.bearing.passes {
        out.push(format!(
            "NBR 6122: FS below the {:.1} minimum of the {} combination.",
            outcome.nbr.bearing.required_safety_factor, outcome.nbr.load_combination
        ));
    }
    if !outcome.settlement_check.passes {
        out.push(format!(
            "Settlement exceeds {:.0} mm. Enlarge the footing or improve the soil below it.",
            outcome.settlement_check.limit_m * 1000.0
        ));
    }
    if let Some(c) = &outcome.consolidation {
        if c.total_m > outcome.settlement.settlement_m {
            out.push(format!(
                "Consolidation governs ({:.0} mm of {:.0} mm total); consider preloading or deeper foundations.",
                c.total_mm(),
                outcome.total_settlement_m * 1000.0
            ));
        }
    }
    let options = outcome.request.bearing_options();
    let f = &outcome.metadata.foundation;
    if options.eccentricity_width_m.abs() > f.width().0 / 6.0 || options.eccentricity_length_m.abs() > f.length().0 / 6.0
    {
        out.push("Load resultant outside the middle third: part of the base loses contact.".to_string());
    }
    if let Some(p) = &outcome.nbr.presumptive {
        if !p.passes {
            out.push(format!(
                "Applied pressure above the {:.0} kPa presumptive value for {}; confirm with site investigation.",
                p.admissible_kpa, p.soil_class
            ));
        }
    }
    if let Some(d10) = outcome.influence_depths.iter().find(|d| d.fraction == 0.10) {
        out.push(format!(
            "Site investigation should reach at least {:.1} m below the base (10 % of q, {:.1}·B).",
            d10.depth_m,
            d10.depth_m / b
        ));
    }
    if let Some(w) = &outcome.nbr.water_table {
        if w.risk == RiskLevel::High {
            out.push(w.recommendation.clone());
        }
    }
    if !outcome.warnings.is_empty() {
        out.push(format!(
            "{} reference case(s) deviated from literature values; review solver output.",
            outcome.warnings.len()
        ));
    }
    if outcome.bearing_check.passes && outcome.settlement_check.passes && outcome.nbr.passes() {
        out.push("Bearing capacity and settlement satisfy NBR 6122:2019.".to_string());
    }
    out
}

struct SummaryText<'a> {
    summary: &'a TechnicalSummary,
    units: UnitSystem,
}

fn status(ok: bool) -> &'static str {
    if ok {
        "OK"
    } else {
        "FAIL"
    }
}

impl fmt::Display for SummaryText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        let u = self.units;
        let m = &s.metadata;
        let pressure = |v: f64| u.format(v, Quantity::Pressure);
        let length = |v: f64| u.format(v, Quantity::Length);

        writeln!(f, "═══════════════════════════════════════")?;
        writeln!(f, "  STRESS BULB - TECHNICAL SUMMARY")?;
        writeln!(f, "═══════════════════════════════════════")?;
        if !m.label.is_empty() {
            writeln!(f, "Label:    {}", m.label)?;
        }
        writeln!(f, "Analysis: {}", m.analysis_id)?;
        writeln!(f, "Date:     {}", m.generated_at.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(f, "Units:    {}", u)?;
        writeln!(f)?;

        writeln!(f, "Input:")?;
        writeln!(f, "  Soil:       {}", m.soil)?;
        writeln!(f, "  Footing:    {} × {}", length(m.foundation.length().0), length(m.foundation.width().0))?;
        writeln!(f, "  Pressure:   {}", pressure(m.load.applied_pressure().0))?;
        writeln!(
            f,
            "  Total load: {}",
            u.format(m.load.total_load(&m.foundation).0, Quantity::Force)
        )?;
        writeln!(f)?;

        writeln!(f, "Stress below centre:")?;
        for c in &s.centre_stresses {
            writeln!(
                f,
                "  z = {:<12} Δσz = {} ({:.1} %)",
                length(c.depth_m),
                pressure(c.delta_sigma_z),
                c.influence_pct
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Influence depths:")?;
        for d in &s.influence_depths {
            writeln!(f, "  {:>4.0} % of q at {}", d.fraction * 100.0, length(d.depth_m))?;
        }
        writeln!(f)?;

        let b = &s.bearing;
        writeln!(f, "Bearing capacity ({}, {}):", b.method, b.shape)?;
        writeln!(
            f,
            "  Nc = {:.2}, Nq = {:.2}, Nγ = {:.2}",
            b.factors.nc, b.factors.nq, b.factors.ngamma
        )?;
        if b.area_ratio != 1.0 {
            writeln!(
                f,
                "  Effective area B' × L' = {} × {}",
                length(b.width_m),
                length(b.effective_length_m)
            )?;
        }
        if b.depth_factors.dc != 1.0 || b.inclination_factors.iq != 1.0 {
            writeln!(
                f,
                "  dc = {:.3}, dq = {:.3}, ic = {:.3}, iq = {:.3}, iγ = {:.3}",
                b.depth_factors.dc,
                b.depth_factors.dq,
                b.inclination_factors.ic,
                b.inclination_factors.iq,
                b.inclination_factors.igamma
            )?;
        }
        writeln!(f, "  qu    = {}", pressure(b.ultimate_kpa))?;
        writeln!(f, "  q_adm = {} (FS = {:.1})", pressure(b.allowable_kpa), b.safety_factor)?;
        match s.bearing_check.safety_factor {
            Some(fs) => writeln!(
                f,
                "  FS provided = {:.2} vs {:.1} required  {}",
                fs,
                s.bearing_check.required_safety_factor,
                status(s.bearing_check.passes)
            )?,
            None => writeln!(f, "  No applied pressure")?,
        }
        writeln!(f)?;

        writeln!(f, "Settlement:")?;
        writeln!(f, "  immediate     = {:.1} mm", s.settlement.settlement_mm())?;
        if let Some(c) = &s.consolidation {
            writeln!(f, "  consolidation = {:.1} mm (U = {:.2}: {:.1} mm)", c.total_mm(), c.degree, c.at_time_m * 1000.0)?;
        }
        writeln!(
            f,
            "  total         = {:.1} mm (limit {:.0} mm)  {}",
            s.total_settlement_m * 1000.0,
            s.settlement_check.limit_m * 1000.0,
            status(s.settlement_check.passes)
        )?;
        writeln!(f)?;

        let n = &s.nbr;
        writeln!(f, "NBR 6122:2019:")?;
        match n.bearing.safety_factor {
            Some(fs) => writeln!(
                f,
                "  FS = {:.2} vs {:.1} ({} combination)  {}",
                fs,
                n.bearing.required_safety_factor,
                n.load_combination,
                status(n.bearing.passes)
            )?,
            None => writeln!(f, "  No applied pressure")?,
        }
        if let Some(st) = n.structure_type {
            writeln!(f, "  Structure: {} ({:.0} mm)", st, n.settlement.limit_m * 1000.0)?;
        }
        if let Some(p) = &n.presumptive {
            writeln!(
                f,
                "  Presumptive pressure ({}): {}  {}",
                p.soil_class,
                pressure(p.admissible_kpa),
                status(p.passes)
            )?;
        }
        if let Some(w) = &n.water_table {
            writeln!(
                f,
                "  Water table at {}: {} risk",
                length(w.water_table_depth_m),
                if w.risk == RiskLevel::High { "high" } else { "low" }
            )?;
        }
        writeln!(f)?;

        if !s.warnings.is_empty() {
            writeln!(f, "Reference checks:")?;
            for w in &s.warnings {
                writeln!(f, "  ! {}", w)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Recommendations:")?;
        for r in &s.recommendations {
            writeln!(f, "  - {}", r)?;
        }
        writeln!(f, "═══════════════════════════════════════")?;
        writeln!(f, "  RESULT: {}", if s.passes() { "PASS" } else { "FAIL" })?;
        write!(f, "═══════════════════════════════════════")
    }
}
