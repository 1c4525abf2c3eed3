//! # Soil Database
//!
//! Read-only registry of named soil parameter sets.
//!
//! The registry is loaded from a TOML file made of `[[soil]]` tables. A
//! catalog ships with the crate (`catalog.toml`, embedded at compile time);
//! projects may point at their own file instead.
//!
//! ```toml
//! [[soil]]
//! name = "Areia Média"
//! description = "Medium sand"
//! unit_weight = 18.0
//! friction_angle = 32.0
//! cohesion = 0.0
//! elastic_modulus = 35000.0
//! poisson_ratio = 0.30
//! soil_class = "medium_sand"
//! ```
//!
//! ## Example
//!
//! ```rust
//! use geo_core::soils::SoilDatabase;
//!
//! let db = SoilDatabase::builtin().unwrap();
//! let sand = db.lookup("areia média").unwrap();
//! assert_eq!(sand.friction_angle, 32.0);
//! assert!(db.lookup("Turfa").is_err());
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{GeoError, GeoResult};
use crate::models::{SoilInput, SoilProfile, DEFAULT_POISSON_RATIO};
use crate::validation::nbr::SoilClass;

const BUILTIN_CATALOG: &str = include_str!("catalog.toml");

static BUILTIN: Lazy<GeoResult<Arc<SoilDatabase>>> =
    Lazy::new(|| SoilDatabase::from_toml_str(BUILTIN_CATALOG).map(Arc::new));

/// One named soil in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilCatalogEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// γ (kN/m³)
    pub unit_weight: f64,
    /// φ (degrees)
    pub friction_angle: f64,
    /// c (kPa)
    pub cohesion: f64,
    /// E (kPa)
    pub elastic_modulus: f64,
    /// ν
    #[serde(default)]
    pub poisson_ratio: Option<f64>,
    /// NBR 6122 class for the presumptive admissible pressure
    #[serde(default)]
    pub soil_class: Option<SoilClass>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    soil: Vec<toml::Table>,
}

/// Immutable soil registry keyed by name.
#[derive(Debug, Clone)]
pub struct SoilDatabase {
    entries: Vec<SoilCatalogEntry>,
    index: HashMap<String, usize>,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl SoilDatabase {
    /// The catalog shipped with the crate, parsed once per process.
    pub fn builtin() -> GeoResult<Arc<SoilDatabase>> {
        BUILTIN.clone()
    }

    /// Load a catalog from a TOML file.
    pub fn load_catalog(path: &Path) -> GeoResult<SoilDatabase> {
        let text = fs::read_to_string(path)
            .map_err(|e| GeoError::file_error("read catalog", path.display().to_string(), e.to_string()))?;
        let db = Self::from_toml_str(&text)?;
        log::debug!("Loaded {} soils from {}", db.len(), path.display());
        Ok(db)
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(text: &str) -> GeoResult<SoilDatabase> {
        let file: CatalogFile = toml::from_str(text).map_err(|e| GeoError::catalog_load("<catalog>", e.to_string()))?;

        let mut entries = Vec::with_capacity(file.soil.len());
        let mut index = HashMap::with_capacity(file.soil.len());

        for (position, table) in file.soil.into_iter().enumerate() {
            let label = match table.get("name").and_then(|v| v.as_str()) {
                Some(name) if !name.trim().is_empty() => name.to_string(),
                _ => {
                    return Err(GeoError::catalog_load(
                        format!("#{}", position + 1),
                        "Missing or empty 'name'",
                    ))
                }
            };

            let entry: SoilCatalogEntry = toml::Value::Table(table)
                .try_into()
                .map_err(|e: toml::de::Error| GeoError::catalog_load(&label, e.message().to_string()))?;

            if let Err(err) = SoilProfile::new(SoilInput::from(&entry), DEFAULT_POISSON_RATIO) {
                let reason = match err {
                    GeoError::Domain { quantity, value, reason } => format!("{} = {}: {}", quantity, value, reason),
                    other => other.to_string(),
                };
                return Err(GeoError::catalog_load(&label, reason));
            }

            let key = normalize(&entry.name);
            if index.contains_key(&key) {
                return Err(GeoError::catalog_load(&label, "Duplicate soil name"));
            }
            index.insert(key, entries.len());
            entries.push(entry);
        }

        Ok(SoilDatabase { entries, index })
    }

    /// Find a soil by name (case-insensitive, surrounding whitespace ignored).
    pub fn lookup(&self, name: &str) -> GeoResult<&SoilCatalogEntry> {
        self.index
            .get(&normalize(name))
            .map(|&i| &self.entries[i])
            .ok_or_else(|| GeoError::not_found(name.trim()))
    }

    /// Soil names in catalog order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Entries in catalog order
    pub fn entries(&self) -> &[SoilCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let db = SoilDatabase::builtin().unwrap();
        assert_eq!(db.len(), 7);
        assert_eq!(db.names()[0], "Argila Mole");

        let clay = db.lookup("Argila Rija").unwrap();
        assert_eq!(clay.cohesion, 50.0);
        assert_eq!(clay.friction_angle, 0.0);
        assert!(db.entries().iter().all(|e| e.soil_class.is_some()));
        assert_eq!(clay.soil_class, Some(SoilClass::StiffClay));
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = SoilDatabase::builtin().unwrap();
        let b = SoilDatabase::builtin().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let db = SoilDatabase::builtin().unwrap();
        assert_eq!(db.lookup("  PEDREGULHO ").unwrap().name, "Pedregulho");
    }

    #[test]
    fn test_lookup_not_found() {
        let db = SoilDatabase::builtin().unwrap();
        let err = db.lookup("Turfa").unwrap_err();
        assert_eq!(err, GeoError::not_found("Turfa"));
    }

    #[test]
    fn test_missing_field_names_entry() {
        let text = r#"
            [[soil]]
            name = "Bad Sand"
            unit_weight = 18.0
            cohesion = 0.0
            elastic_modulus = 20000.0
        "#;
        match SoilDatabase::from_toml_str(text).unwrap_err() {
            GeoError::CatalogLoad { entry, reason } => {
                assert_eq!(entry, "Bad Sand");
                assert!(reason.contains("friction_angle"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_field_rejected() {
        let text = r#"
            [[soil]]
            name = "Odd"
            unit_weight = "heavy"
            friction_angle = 30.0
            cohesion = 0.0
            elastic_modulus = 20000.0
        "#;
        let err = SoilDatabase::from_toml_str(text).unwrap_err();
        assert_eq!(err.error_code(), "CATALOG_LOAD");
    }

    #[test]
    fn test_missing_name_uses_position() {
        let text = r#"
            [[soil]]
            unit_weight = 18.0
            friction_angle = 30.0
            cohesion = 0.0
            elastic_modulus = 20000.0
        "#;
        match SoilDatabase::from_toml_str(text).unwrap_err() {
            GeoError::CatalogLoad { entry, .. } => assert_eq!(entry, "#1"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_invariant_violation_rejected() {
        let text = r#"
            [[soil]]
            name = "Negative"
            unit_weight = -1.0
            friction_angle = 30.0
            cohesion = 0.0
            elastic_modulus = 20000.0
        "#;
        match SoilDatabase::from_toml_str(text).unwrap_err() {
            GeoError::CatalogLoad { entry, reason } => {
                assert_eq!(entry, "Negative");
                assert!(reason.contains("unit_weight"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_rejected() {
        let text = r#"
            [[soil]]
            name = "Silte"
            unit_weight = 18.0
            friction_angle = 28.0
            cohesion = 0.0
            elastic_modulus = 15000.0

            [[soil]]
            name = "silte"
            unit_weight = 18.0
            friction_angle = 28.0
            cohesion = 0.0
            elastic_modulus = 15000.0
        "#;
        let err = SoilDatabase::from_toml_str(text).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_unknown_soil_class_rejected() {
        let text = r#"
            [[soil]]
            name = "Turfa"
            unit_weight = 11.0
            friction_angle = 0.0
            cohesion = 5.0
            elastic_modulus = 800.0
            soil_class = "peat"
        "#;
        match SoilDatabase::from_toml_str(text).unwrap_err() {
            GeoError::CatalogLoad { entry, reason } => {
                assert_eq!(entry, "Turfa");
                assert!(reason.contains("peat"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_empty_catalog() {
        let db = SoilDatabase::from_toml_str("").unwrap();
        assert!(db.is_empty());
    }
}
