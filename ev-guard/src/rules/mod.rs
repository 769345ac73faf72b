//! Built-in rule implementations.
//!
//! Each per-column rule implements [`Rule`](crate::core::Rule) and is bound to
//! a column through a [`ColumnSpec`](crate::core::ColumnSpec):
//!
//! - [`UniquenessRule`]: non-null values occur once
//! - [`RegexMatchRule`]: whole-value pattern match
//! - [`NumericRangeRule`]: inclusive numeric bounds
//! - [`NonNegativeRule`]: no negative numbers
//! - [`SetMembershipRule`]: trimmed, case-insensitive allowed values
//!
//! [`CountReconciler`] works across two tables instead of on one column.
//!
//! All rules skip nulls and report at most one violation per column, carrying
//! the number of offending values and a sample of up to five of them.
//!
//! ```rust
//! use ev_guard::core::{ColumnSpec, TableSchema};
//! use ev_guard::rules::{RegexMatchRule, SetMembershipRule, UniquenessRule};
//!
//! # fn example() -> ev_guard::error::Result<()> {
//! let schema = TableSchema::builder("stations")
//!     .column(ColumnSpec::required("id").rule(UniquenessRule::new()))
//!     .column(ColumnSpec::required("country_code").rule(RegexMatchRule::new("[A-Z]{2}")?))
//!     .column(ColumnSpec::required("power_class").rule(SetMembershipRule::power_class()))
//!     .build();
//! # Ok(())
//! # }
//! ```

mod membership;
mod pattern;
mod range;
mod reconciliation;
mod uniqueness;

pub use membership::{SetMembershipRule, POWER_CLASSES};
pub use pattern::{RegexMatchRule, COUNTRY_CODE_PATTERN};
pub use range::{NonNegativeRule, NumericRangeRule};
pub use reconciliation::{CountMismatch, CountReconciler, Reconciliation};
pub use uniqueness::UniquenessRule;

use crate::logging::truncate_field;

/// Longest cell text kept verbatim in a violation sample.
const MAX_SAMPLE_FIELD_LENGTH: usize = 64;

fn sample_value(value: &str) -> String {
    truncate_field(value, MAX_SAMPLE_FIELD_LENGTH)
}
