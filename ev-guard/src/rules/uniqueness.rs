//! Uniqueness rule: every non-null value occurs once.

use super::sample_value;
use crate::core::{render_sample, Rule, RuleKind, RuleMetadata, Violation, SAMPLE_LIMIT};
use crate::dataset::ColumnRef;
use crate::error::Result;
use std::collections::HashSet;
use tracing::instrument;

/// Reports non-null values that occur more than once.
///
/// The first occurrence of a value is not a duplicate; every later occurrence
/// is. The violation count is the number of such later occurrences and the
/// sample lists the first five of them in row order.
///
/// # Examples
///
/// ```rust
/// use ev_guard::core::Rule;
/// use ev_guard::dataset::Table;
/// use ev_guard::rules::UniquenessRule;
///
/// let table = Table::from_csv_bytes("stations.csv", b"id\n1\n2\n2\n2\n").unwrap();
/// let violation = UniquenessRule::new()
///     .evaluate(&table.column("id").unwrap())
///     .unwrap()
///     .unwrap();
/// assert_eq!(violation.count(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct UniquenessRule;

impl UniquenessRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for UniquenessRule {
    #[instrument(skip(self, column), fields(column = %column.name()))]
    fn evaluate(&self, column: &ColumnRef<'_>) -> Result<Option<Violation>> {
        let mut seen = HashSet::new();
        let mut duplicates = 0usize;
        let mut sample = Vec::with_capacity(SAMPLE_LIMIT);

        for value in column.text_values()?.into_iter().flatten() {
            if seen.contains(&value) {
                duplicates += 1;
                if sample.len() < SAMPLE_LIMIT {
                    sample.push(sample_value(&value));
                }
            } else {
                seen.insert(value);
            }
        }

        if duplicates == 0 {
            return Ok(None);
        }

        let subject = column.qualified_name();
        let message = format!(
            "{subject}: {duplicates} duplicate values detected. Sample: {}",
            render_sample(&sample)
        );
        Ok(Some(Violation::new(
            RuleKind::Uniqueness,
            subject,
            duplicates,
            sample,
            message,
        )))
    }

    fn name(&self) -> &str {
        "uniqueness"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Uniqueness
    }

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata::new().with_description("Checks that non-null values are unique")
    }
}
