//! # geo_core - Shallow Foundation Analysis Engine
//!
//! `geo_core` computes the vertical stress bulb under a uniformly loaded
//! rectangular footing (Newmark integration of Boussinesq), the Terzaghi /
//! Vesic bearing capacity, immediate and consolidation settlement,
//! Mohr-Coulomb strength checks and the NBR 6122 verification. Every input and output is JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Validate once**: raw `*Input` values are checked against physical and
//!   normative bounds before any solver runs, and all violations come back together
//! - **Pure solvers**: stress, bearing and settlement are plain functions
//! - **Rich Errors**: [`GeoError`] is structured and serializes with a type tag
//! - **Self checking**: literature reference cases run with every analysis
//!
//! ## Quick Start
//!
//! ```rust
//! use geo_core::{analyze, AnalysisRequest, Settings, TechnicalSummary, UnitSystem};
//!
//! let outcome = analyze(&AnalysisRequest::example(), &Settings::default()).unwrap();
//! let summary = TechnicalSummary::from_outcome(&outcome);
//! println!("{}", summary.render_text(UnitSystem::Si));
//! ```
//!
//! ## Modules
//!
//! - [`models`] - Soil, foundation, load and grid types
//! - [`equations`] - Closed-form influence and bearing-factor equations
//! - [`calculations`] - Stress bulb, bearing capacity, settlement, consolidation, Mohr-Coulomb
//! - [`validation`] - Input bounds, reference cases, NBR tables and design checks
//! - [`analysis`] - The end-to-end pipeline
//! - [`report`] - Tabular bulb export and the technical summary
//! - [`soils`] - Built-in and user soil catalogs
//! - [`project`] / [`file_io`] - Project files with atomic saves and locking
//! - [`settings`] / [`units`] / [`errors`]

pub mod analysis;
pub mod calculations;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod models;
pub mod project;
pub mod report;
pub mod settings;
pub mod soils;
pub mod units;
pub mod validation;

pub use analysis::{analyze, AnalysisOutcome, AnalysisRequest};
pub use errors::{GeoError, GeoResult, Violation};
pub use file_io::{load_project, save_project, FileLock};
pub use project::{Project, ProjectMetadata};
pub use report::{BulbTable, TechnicalSummary};
pub use settings::Settings;
pub use soils::SoilDatabase;
pub use units::UnitSystem;
