//! Prelude for commonly used types and traits in ev-guard.

pub use crate::config::{DatasetLayout, ValidationConfig};
pub use crate::core::{
    ConsoleReporter, MemoryReporter, Reporter, Rule, SeverityMode, ValidationReport, Violation,
};
pub use crate::dataset::{Dataset, Table};
pub use crate::error::{GuardError, Result};
pub use crate::stations::validate_dataset;
