//! # Projects
//!
//! A [`Project`] groups the analyses of one job together with the settings
//! they run under. Projects are stored as pretty JSON `.bulbo` files (see
//! [`crate::file_io`]).
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (schema version, engineer, job, client, timestamps)
//! ├── settings: Settings (safety factor, limits, ...)
//! └── analyses: HashMap<Uuid, AnalysisRequest>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use geo_core::analysis::AnalysisRequest;
//! use geo_core::project::Project;
//!
//! let mut project = Project::new("Ana Souza", "24-117", "Construtora Norte");
//! let id = project.add_analysis(AnalysisRequest::example());
//!
//! let outcome = project.run_analysis(&id).unwrap();
//! assert_eq!(outcome.request.label(), "S-1");
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{analyze, AnalysisOutcome, AnalysisRequest};
use crate::errors::{GeoError, GeoResult};
use crate::settings::Settings;

/// Schema version written into every project file
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub analyses: HashMap<Uuid, AnalysisRequest>,
}

/// File header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version
    pub version: String,
    /// Responsible engineer
    pub engineer: String,
    /// Job number
    pub job_id: String,
    pub client: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Project {
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: Settings::default(),
            analyses: HashMap::new(),
        }
    }

    /// Store a request and return its id.
    pub fn add_analysis(&mut self, request: AnalysisRequest) -> Uuid {
        let id = Uuid::new_v4();
        self.analyses.insert(id, request);
        self.touch();
        id
    }

    pub fn remove_analysis(&mut self, id: &Uuid) -> Option<AnalysisRequest> {
        let removed = self.analyses.remove(id);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    pub fn get_analysis(&self, id: &Uuid) -> Option<&AnalysisRequest> {
        self.analyses.get(id)
    }

    /// Replace a stored request, keeping its id.
    pub fn update_analysis(&mut self, id: &Uuid, request: AnalysisRequest) -> GeoResult<()> {
        match self.analyses.get_mut(id) {
            Some(slot) => {
                *slot = request;
                self.touch();
                Ok(())
            }
            None => Err(GeoError::analysis_not_found(id)),
        }
    }

    pub fn analysis_count(&self) -> usize {
        self.analyses.len()
    }

    /// Ids sorted by request label, then id
    pub fn ids_by_label(&self) -> Vec<Uuid> {
        let mut ids: Vec<(&str, Uuid)> = self.analyses.iter().map(|(id, r)| (r.label.as_str(), *id)).collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Run one stored analysis with the project settings.
    pub fn run_analysis(&self, id: &Uuid) -> GeoResult<AnalysisOutcome> {
        let request = self.get_analysis(id).ok_or_else(|| GeoError::analysis_not_found(id))?;
        analyze(request, &self.settings)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}
