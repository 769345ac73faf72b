//! Rule trait and related types for per-column checks.

use super::{RuleKind, Violation};
use crate::dataset::ColumnRef;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Metadata describing a rule, used for logging and reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// A human-readable description of what the rule checks
    pub description: Option<String>,
    /// Rule parameters rendered as text (pattern, bounds, allowed values)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl RuleMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a parameter entry.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// A check over the values of a single column.
///
/// Rules are pure: the same column always yields the same outcome. A rule
/// ignores null values and returns at most one [`Violation`] summarizing every
/// offending value in the column.
///
/// # Examples
///
/// ```rust
/// use ev_guard::core::{Rule, RuleKind, Violation};
/// use ev_guard::dataset::ColumnRef;
/// use ev_guard::error::Result;
///
/// #[derive(Debug)]
/// struct NotEmpty;
///
/// impl Rule for NotEmpty {
///     fn evaluate(&self, column: &ColumnRef<'_>) -> Result<Option<Violation>> {
///         if column.is_empty() {
///             return Ok(Some(Violation::new(
///                 RuleKind::Uniqueness,
///                 column.qualified_name(),
///                 0,
///                 vec![],
///                 format!("{}: column is empty", column.qualified_name()),
///             )));
///         }
///         Ok(None)
///     }
///
///     fn name(&self) -> &str {
///         "not_empty"
///     }
///
///     fn kind(&self) -> RuleKind {
///         RuleKind::Uniqueness
///     }
/// }
/// ```
pub trait Rule: Debug + Send + Sync {
    /// Evaluates the rule against one column.
    ///
    /// Returns `Ok(None)` when the column satisfies the rule. Errors are
    /// reserved for columns the rule cannot evaluate at all.
    fn evaluate(&self, column: &ColumnRef<'_>) -> Result<Option<Violation>>;

    /// Returns the name of the rule.
    fn name(&self) -> &str;

    /// Returns the kind tag carried by this rule's violations.
    fn kind(&self) -> RuleKind;

    /// Returns the metadata associated with this rule.
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata::new()
    }
}
