//! Validation report types.

use super::{SeverityMode, Violation};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters collected during a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// Number of per-column rules evaluated
    pub rules_evaluated: usize,
    /// Number of per-column rules that found nothing
    pub rules_passed: usize,
    /// Whether the companion table was reconciled against the primary table
    pub companion_checked: bool,
    /// Number of rows in the primary table
    pub rows: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
}

impl ValidationMetrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The outcome of a validation run that was not aborted.
///
/// In advisory mode `warnings` holds every violation in the order it was
/// reported. A strict run that returns a report has no warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Name of the validated table file
    pub table: String,
    /// Severity mode the run used
    pub mode: SeverityMode,
    /// When the run started, serialized as RFC 3339
    pub timestamp: DateTime<Utc>,
    /// Run counters
    pub metrics: ValidationMetrics,
    /// Violations reported as warnings
    pub warnings: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(table: impl Into<String>, mode: SeverityMode) -> Self {
        Self {
            table: table.into(),
            mode,
            timestamp: Utc::now(),
            metrics: ValidationMetrics::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_warning(&mut self, violation: Violation) {
        self.warnings.push(violation);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// One-line summary for the end of a successful run.
    pub fn summary(&self) -> String {
        let n = self.warnings.len();
        format!(
            "{}: validation passed ({n} warning{})",
            self.table,
            if n == 1 { "" } else { "s" }
        )
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
