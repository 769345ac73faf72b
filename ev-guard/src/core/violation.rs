//! Violation records produced by rules and the cross-table reconciler.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of offending values carried in a violation sample.
pub const SAMPLE_LIMIT: usize = 5;

/// The kind of check that produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Duplicate non-null values in a column
    Uniqueness,
    /// Values not fully matching a pattern
    RegexMatch,
    /// Numeric values outside an inclusive range
    NumericRange,
    /// Negative numeric values
    NonNegative,
    /// Normalized values outside an allowed set
    SetMembership,
    /// Declared per-key counts disagreeing with recomputed counts
    Reconciliation,
    /// Companion table without a recognizable count column
    CountColumn,
}

impl RuleKind {
    /// Returns the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uniqueness => "uniqueness",
            Self::RegexMatch => "regex_match",
            Self::NumericRange => "numeric_range",
            Self::NonNegative => "non_negative",
            Self::SetMembership => "set_membership",
            Self::Reconciliation => "reconciliation",
            Self::CountColumn => "count_column",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A summary of everything one rule found wrong with one column or table.
///
/// A rule that detects at least one offending value produces exactly one
/// violation for the whole column. Violations are immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    kind: RuleKind,
    subject: String,
    count: usize,
    sample: Vec<String>,
    message: String,
}

impl Violation {
    /// Creates a violation. The sample is capped at [`SAMPLE_LIMIT`] entries.
    pub fn new(
        kind: RuleKind,
        subject: impl Into<String>,
        count: usize,
        mut sample: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        sample.truncate(SAMPLE_LIMIT);
        Self {
            kind,
            subject: subject.into(),
            count,
            sample,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// The qualified column (`file.column`) or table the violation is about.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Number of offending values or keys.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn sample(&self) -> &[String] {
        &self.sample
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Renders sample values as `[a, b, c]` for inclusion in messages.
pub fn render_sample(sample: &[String]) -> String {
    format!("[{}]", sample.join(", "))
}
