//! Error types for the ev-guard validation engine.
//!
//! All failures surface as a [`GuardError`]. Structural failures (a missing
//! dataset, a broken schema, an unreadable file) are always fatal. Data-quality
//! failures carry the [`Violation`] that caused them and only become errors
//! when the run is in strict mode.

use crate::core::{RuleKind, Violation};
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for ev-guard.
#[derive(Error, Debug)]
pub enum GuardError {
    /// None of the candidate files for a logical table exists.
    #[error("Could not find {table} file. Expected one of: {}", .candidates.join(", "))]
    DatasetNotFound {
        /// Logical table name (e.g. "main stations")
        table: String,
        /// Every candidate file name that was tried, in preference order
        candidates: Vec<String>,
    },

    /// The data directory itself does not exist.
    #[error("--data-dir does not exist: {}", .path.display())]
    DataDirNotFound { path: PathBuf },

    /// Required columns are absent from a loaded table.
    #[error("{table}: missing required columns: [{}]", .missing.join(", "))]
    MissingColumns { table: String, missing: Vec<String> },

    /// A per-column rule found offending values.
    #[error("{}", .0.message())]
    RuleViolation(Violation),

    /// Declared per-key counts in a companion table disagree with the primary table.
    #[error("{}", .0.message())]
    ReconciliationMismatch(Violation),

    /// The companion table has no recognizable count column.
    #[error("{}", .0.message())]
    UnidentifiableCountColumn(Violation),

    /// A rule was bound to a column whose loaded type it cannot evaluate.
    #[error("{column}: type mismatch, expected {expected} values, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// A table file exists but could not be parsed.
    #[error("Failed to read {}: {source}", .path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: arrow::error::ArrowError,
    },

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error related to configuration (layout files, glob patterns).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A type alias for `Result<T, GuardError>`.
pub type Result<T> = std::result::Result<T, GuardError>;

impl GuardError {
    /// Maps a violation to the error variant matching its rule kind.
    pub fn from_violation(violation: Violation) -> Self {
        match violation.kind() {
            RuleKind::Reconciliation => Self::ReconciliationMismatch(violation),
            RuleKind::CountColumn => Self::UnidentifiableCountColumn(violation),
            _ => Self::RuleViolation(violation),
        }
    }

    /// Returns true for failures that abort a run regardless of severity mode.
    pub fn is_structural(&self) -> bool {
        self.violation().is_none()
    }

    /// Returns the violation behind a data-quality failure.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::RuleViolation(v)
            | Self::ReconciliationMismatch(v)
            | Self::UnidentifiableCountColumn(v) => Some(v),
            _ => None,
        }
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl From<serde_json::Error> for GuardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
