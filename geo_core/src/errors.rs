//! # Error Types
//!
//! Structured error types for geo_core. Every variant carries enough context
//! for a caller (human, UI or script) to point at the offending field, soil
//! entry or grid point without parsing the message.
//!
//! ## Example
//!
//! ```rust
//! use geo_core::errors::{GeoError, GeoResult};
//!
//! fn check_depth(z_m: f64) -> GeoResult<()> {
//!     if z_m < 0.0 {
//!         return Err(GeoError::domain("z", z_m, "Depth cannot be above the ground surface"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_depth(-1.0).is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for geo_core operations
pub type GeoResult<T> = Result<T, GeoError>;

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted field path, e.g. `soil.friction_angle`
    pub field: String,
    /// Offending value as text
    pub value: String,
    /// Human-readable rule that was broken
    pub rule: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, value: impl ToString, rule: impl Into<String>) -> Self {
        Violation {
            field: field.into(),
            value: value.to_string(),
            rule: rule.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}: {}", self.field, self.value, self.rule)
    }
}

/// Structured error type for geotechnical operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum GeoError {
    /// One or more request fields break documented bounds
    #[error("Validation failed with {} violation(s): {}", violations.len(), join_violations(violations))]
    Validation { violations: Vec<Violation> },

    /// A solver received mathematically out-of-range input
    #[error("Domain error for '{quantity}': {value} - {reason}")]
    Domain {
        quantity: String,
        value: String,
        reason: String,
    },

    /// Soil catalog entry does not exist
    #[error("Soil not found in catalog: {name}")]
    NotFound { name: String },

    /// Project has no analysis with this id
    #[error("Analysis not found in project: {id}")]
    AnalysisNotFound { id: String },

    /// NaN or infinity produced while evaluating a grid point
    #[error("Numeric instability at ({x}, {y}, {z}): {reason}")]
    NumericInstability {
        x: f64,
        y: f64,
        z: f64,
        reason: String,
    },

    /// Soil catalog file is malformed
    #[error("Soil catalog entry '{entry}' is invalid: {reason}")]
    CatalogLoad { entry: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl GeoError {
    /// Create a Validation error from collected violations
    pub fn validation(violations: Vec<Violation>) -> Self {
        GeoError::Validation { violations }
    }

    /// Create a Domain error
    pub fn domain(quantity: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        GeoError::Domain {
            quantity: quantity.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(name: impl Into<String>) -> Self {
        GeoError::NotFound { name: name.into() }
    }

    /// Create an AnalysisNotFound error
    pub fn analysis_not_found(id: impl ToString) -> Self {
        GeoError::AnalysisNotFound { id: id.to_string() }
    }

    /// Create a NumericInstability error
    pub fn numeric_instability(x: f64, y: f64, z: f64, reason: impl Into<String>) -> Self {
        GeoError::NumericInstability {
            x,
            y,
            z,
            reason: reason.into(),
        }
    }

    /// Create a CatalogLoad error
    pub fn catalog_load(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        GeoError::CatalogLoad {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        GeoError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        GeoError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl ToString) -> Self {
        GeoError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Violations carried by a Validation error (empty for other variants)
    pub fn violations(&self) -> &[Violation] {
        match self {
            GeoError::Validation { violations } => violations,
            _ => &[],
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GeoError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            GeoError::Validation { .. } => "VALIDATION_ERROR",
            GeoError::Domain { .. } => "DOMAIN_ERROR",
            GeoError::NotFound { .. } => "NOT_FOUND",
            GeoError::AnalysisNotFound { .. } => "ANALYSIS_NOT_FOUND",
            GeoError::NumericInstability { .. } => "NUMERIC_INSTABILITY",
            GeoError::CatalogLoad { .. } => "CATALOG_LOAD",
            GeoError::FileError { .. } => "FILE_ERROR",
            GeoError::FileLocked { .. } => "FILE_LOCKED",
            GeoError::SerializationError { .. } => "SERIALIZATION_ERROR",
            GeoError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = GeoError::domain("friction_angle", 65.0, "Outside tabulated range");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"Domain\""));
        let roundtrip: GeoError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(GeoError::not_found("Turfa").error_code(), "NOT_FOUND");
        assert_eq!(GeoError::analysis_not_found("42").error_code(), "ANALYSIS_NOT_FOUND");
        assert_eq!(GeoError::validation(vec![]).error_code(), "VALIDATION_ERROR");
        assert_eq!(
            GeoError::numeric_instability(0.0, 0.0, 1.0, "NaN").error_code(),
            "NUMERIC_INSTABILITY"
        );
    }

    #[test]
    fn test_validation_message_lists_every_violation() {
        let error = GeoError::validation(vec![
            Violation::new("soil.friction_angle", -5.0, "must be within [0, 50] degrees"),
            Violation::new("load.applied_pressure", 0.0, "must be positive"),
        ]);
        let message = error.to_string();
        assert!(message.contains("2 violation(s)"));
        assert!(message.contains("soil.friction_angle = -5"));
        assert!(message.contains("load.applied_pressure = 0"));
        assert_eq!(error.violations().len(), 2);
    }

    #[test]
    fn test_missing_analysis_message_names_the_project() {
        let message = GeoError::analysis_not_found("9b2f").to_string();
        assert_eq!(message, "Analysis not found in project: 9b2f");
        assert!(!message.contains("Soil"));
    }

    #[test]
    fn test_only_lock_is_recoverable() {
        assert!(GeoError::file_locked("a.geo", "someone", "now").is_recoverable());
        assert!(!GeoError::not_found("x").is_recoverable());
    }
}
