//! # ev-guard - Integrity checks for the global EV charging dataset
//!
//! ev-guard validates a directory of CSV files describing EV charging
//! stations against a fixed data contract, builds derived views from the
//! stations table and writes a SHA-256 manifest of the published files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ev_guard::prelude::*;
//! use std::path::Path;
//!
//! # fn example() -> ev_guard::error::Result<()> {
//! let config = ValidationConfig::new(SeverityMode::Advisory);
//! let mut reporter = ConsoleReporter;
//!
//! let report = validate_dataset(Path::new("data"), &config, &mut reporter)?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Severity modes
//!
//! Every data-quality rule produces at most one [`Violation`](core::Violation)
//! per column. What happens to it depends on the run's
//! [`SeverityMode`](core::SeverityMode):
//!
//! - **Strict**: the first violation aborts the run with an error
//! - **Advisory**: violations are printed as warnings and the run continues
//!
//! Structural problems (no data directory, no stations file, missing
//! required columns, unreadable CSV) abort the run in both modes.
//!
//! ## Architecture
//!
//! - **`dataset`**: locating and loading tables into typed columns
//! - **`core`**: the rule trait, schema contract, severity routing and validator
//! - **`rules`**: built-in column rules and the cross-table count reconciler
//! - **`stations`**: the stations data contract and validation entry point
//! - **`views`**: derived summary and ML views
//! - **`checksums`**: the SHA-256 manifest writer

pub mod checksums;
pub mod config;
pub mod core;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod rules;
pub mod stations;
pub mod views;
