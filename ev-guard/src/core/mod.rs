//! Core validation types for ev-guard.
//!
//! This module holds the building blocks of a validation run:
//!
//! - **[`TableSchema`]** / **[`ColumnSpec`]**: required columns and the rules bound to each
//! - **[`Rule`]**: a check over one column (implementations live in [`crate::rules`])
//! - **[`Violation`]**: the summary a rule produces when it finds offending values
//! - **[`SeverityMode`]** and [`route`]: whether a violation aborts the run or is a warning
//! - **[`DatasetValidator`]**: runs everything in declaration order
//!
//! ## Architecture
//!
//! ```text
//! DatasetValidator (mode: strict | advisory)
//!     ├── TableSchema "stations"
//!     │   ├── required-columns check (always fatal)
//!     │   ├── ColumnSpec id          → Uniqueness
//!     │   ├── ColumnSpec latitude    → NumericRange(-90, 90)
//!     │   └── ...
//!     └── CountReconciler (only when the companion table exists)
//! ```

mod mode;
mod policy;
mod result;
mod rule;
mod schema;
mod validator;
mod violation;

pub use mode::SeverityMode;
pub use policy::{route, ConsoleReporter, Marker, MemoryReporter, Reporter};
pub use result::{ValidationMetrics, ValidationReport};
pub use rule::{Rule, RuleMetadata};
pub use schema::{ColumnSpec, TableSchema, TableSchemaBuilder};
pub use validator::DatasetValidator;
pub use violation::{render_sample, RuleKind, Violation, SAMPLE_LIMIT};
