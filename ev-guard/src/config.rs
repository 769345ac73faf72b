//! Run configuration: where tables live and how violations are enforced.

use crate::core::SeverityMode;
use crate::dataset::CandidateFiles;
use crate::error::{GuardError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File names accepted for the primary stations table, canonical name first.
pub const PRIMARY_CANDIDATES: [&str; 3] = [
    "charging_stations_world.csv",
    "charging_station.csv",
    "charging_stations.csv",
];

/// File names accepted for the companion country summary.
pub const COMPANION_CANDIDATES: [&str; 1] = ["country_summary.csv"];

/// Column shared by the primary and companion tables.
pub const DEFAULT_KEY_COLUMN: &str = "country_code";

/// Accepted names for the per-key count column of the companion table.
pub const COUNT_COLUMN_CANDIDATES: [&str; 2] = ["stations", "count"];

/// Describes where the tables of a dataset are found.
///
/// The defaults match the published dataset. A layout can be overridden with
/// a JSON file; omitted fields keep their defaults.
///
/// ```json
/// { "primary": { "table": "main stations", "names": ["stations.csv"] } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetLayout {
    primary: CandidateFiles,
    companion: CandidateFiles,
    key_column: String,
    count_columns: Vec<String>,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            primary: CandidateFiles::new("main stations", PRIMARY_CANDIDATES),
            companion: CandidateFiles::new("country summary", COMPANION_CANDIDATES),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            count_columns: COUNT_COLUMN_CANDIDATES.map(String::from).to_vec(),
        }
    }
}

impl DatasetLayout {
    /// Reads a layout from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            GuardError::configuration(format!("Invalid layout file {}: {e}", path.display()))
        })
    }

    pub fn primary_candidates(&self) -> &CandidateFiles {
        &self.primary
    }

    pub fn companion_candidates(&self) -> &CandidateFiles {
        &self.companion
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn count_columns(&self) -> &[String] {
        &self.count_columns
    }

    pub fn with_primary(mut self, primary: CandidateFiles) -> Self {
        self.primary = primary;
        self
    }

    pub fn with_companion(mut self, companion: CandidateFiles) -> Self {
        self.companion = companion;
        self
    }
}

/// Everything a validation run needs besides the data itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Enforcement mode, fixed for the whole run
    pub mode: SeverityMode,
    /// Table locations
    pub layout: DatasetLayout,
}

impl ValidationConfig {
    pub fn new(mode: SeverityMode) -> Self {
        Self {
            mode,
            layout: DatasetLayout::default(),
        }
    }

    pub fn with_mode(mut self, mode: SeverityMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_layout(mut self, layout: DatasetLayout) -> Self {
        self.layout = layout;
        self
    }
}
