//! Set membership rule with normalized comparison.

use super::sample_value;
use crate::core::{render_sample, Rule, RuleKind, RuleMetadata, Violation, SAMPLE_LIMIT};
use crate::dataset::ColumnRef;
use crate::error::Result;
use std::collections::BTreeSet;
use tracing::instrument;

/// Power classes a station can be assigned to.
pub const POWER_CLASSES: [&str; 3] = ["slow", "fast", "hpc"];

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Reports non-null values that are not in an allowed set.
///
/// Values and allowed entries are both trimmed and lowercased before
/// comparison, so `" Fast "` is accepted when `fast` is allowed.
///
/// # Examples
///
/// ```rust
/// use ev_guard::rules::SetMembershipRule;
///
/// let rule = SetMembershipRule::new(["slow", "fast", "hpc"]);
/// assert!(rule.allows(" Fast "));
/// assert!(!rule.allows("ultra"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetMembershipRule {
    allowed: BTreeSet<String>,
}

impl SetMembershipRule {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed.into_iter().map(|s| normalize(s.as_ref())).collect(),
        }
    }

    /// The `slow` / `fast` / `hpc` power classes.
    pub fn power_class() -> Self {
        Self::new(POWER_CLASSES)
    }

    /// Returns true if the normalized value is allowed.
    pub fn allows(&self, value: &str) -> bool {
        self.allowed.contains(&normalize(value))
    }

    /// Allowed values in sorted order.
    pub fn allowed(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }
}

impl Rule for SetMembershipRule {
    #[instrument(skip(self, column), fields(column = %column.name()))]
    fn evaluate(&self, column: &ColumnRef<'_>) -> Result<Option<Violation>> {
        let mut count = 0usize;
        let mut sample = Vec::with_capacity(SAMPLE_LIMIT);

        for value in column.text_values()?.into_iter().flatten() {
            if !self.allows(&value) {
                count += 1;
                if sample.len() < SAMPLE_LIMIT {
                    sample.push(sample_value(&value));
                }
            }
        }

        if count == 0 {
            return Ok(None);
        }

        let subject = column.qualified_name();
        let allowed: Vec<String> = self.allowed.iter().cloned().collect();
        let message = format!(
            "{subject}: {count} values not in {}. Sample: {}",
            render_sample(&allowed),
            render_sample(&sample)
        );
        Ok(Some(Violation::new(
            RuleKind::SetMembership,
            subject,
            count,
            sample,
            message,
        )))
    }

    fn name(&self) -> &str {
        "set_membership"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::SetMembership
    }

    fn metadata(&self) -> RuleMetadata {
        let allowed = self.allowed().collect::<Vec<_>>().join(",");
        RuleMetadata::new()
            .with_description(format!("Checks values are one of {allowed}"))
            .with_parameter("allowed", allowed)
    }
}
