//! Cross-table reconciliation of declared per-key counts.
//!
//! A companion summary table declares, for each key (e.g. a country code), how
//! many rows of the primary table carry that key. [`CountReconciler`]
//! recomputes those counts from the primary table and reports every key whose
//! declared count disagrees.
//!
//! # Examples
//!
//! ```rust
//! use ev_guard::dataset::Table;
//! use ev_guard::rules::CountReconciler;
//!
//! let stations = Table::from_csv_bytes("stations.csv", b"country_code\nUS\nUS\nDE\n").unwrap();
//! let summary = Table::from_csv_bytes(
//!     "country_summary.csv",
//!     b"country_code,stations\nUS,3\nDE,1\n",
//! ).unwrap();
//!
//! let reconciler = CountReconciler::new("country_code", ["stations", "count"]);
//! let violation = reconciler.evaluate(&stations, &summary).unwrap().unwrap();
//! assert_eq!(violation.count(), 1);
//! ```

use crate::core::{render_sample, RuleKind, Violation, SAMPLE_LIMIT};
use crate::dataset::Table;
use crate::error::{GuardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, instrument, warn};

/// One key whose declared count differs from the recomputed count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountMismatch {
    pub key: String,
    /// Count declared by the summary table; `None` if missing or not an integer
    pub declared: Option<i64>,
    /// Rows of the primary table carrying the key
    pub computed: u64,
}

impl CountMismatch {
    /// Absolute difference between declared and computed counts.
    pub fn diff(&self) -> Option<u64> {
        let computed = i64::try_from(self.computed).unwrap_or(i64::MAX);
        self.declared.map(|declared| declared.abs_diff(computed))
    }
}

impl fmt::Display for CountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.declared {
            Some(declared) => write!(
                f,
                "{{key: {}, declared: {declared}, computed: {}}}",
                self.key, self.computed
            ),
            None => write!(
                f,
                "{{key: {}, declared: null, computed: {}}}",
                self.key, self.computed
            ),
        }
    }
}

/// What reconciling a summary table against the primary table found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The summary table lacks the key column, so nothing was compared
    Skipped,
    /// None of the accepted count column names is present
    MissingCountColumn,
    /// Counts were compared using `count_column`
    Compared {
        count_column: String,
        mismatches: Vec<CountMismatch>,
    },
}

/// Compares declared per-key counts in a summary table with the primary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountReconciler {
    key_column: String,
    count_columns: Vec<String>,
}

impl CountReconciler {
    /// `count_columns` are the accepted names of the summary's count column;
    /// the first one present is used.
    pub fn new<I, S>(key_column: impl Into<String>, count_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_column: key_column.into(),
            count_columns: count_columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Recomputes per-key counts and compares them with `summary`.
    #[instrument(skip_all, fields(primary = %primary.name(), summary = %summary.name()))]
    pub fn reconcile(&self, primary: &Table, summary: &Table) -> Result<Reconciliation> {
        let Some(summary_keys) = summary.column(&self.key_column) else {
            warn!(
                key = %self.key_column,
                "Summary table has no key column, skipping reconciliation"
            );
            return Ok(Reconciliation::Skipped);
        };

        let Some(count_column) = self
            .count_columns
            .iter()
            .find(|name| summary.has_column(name))
        else {
            return Ok(Reconciliation::MissingCountColumn);
        };

        let primary_keys =
            primary
                .column(&self.key_column)
                .ok_or_else(|| GuardError::MissingColumns {
                    table: primary.name().to_string(),
                    missing: vec![self.key_column.clone()],
                })?;

        let mut computed: HashMap<String, u64> = HashMap::new();
        for key in primary_keys.text_values()?.into_iter().flatten() {
            *computed.entry(key).or_default() += 1;
        }

        let declared_counts = summary
            .column(count_column)
            .map(|c| c.numeric_values())
            .transpose()?
            .unwrap_or_default();

        let mut mismatches = Vec::new();
        for (key, declared) in summary_keys.text_values()?.into_iter().zip(declared_counts) {
            let Some(key) = key else { continue };
            let declared = declared.filter(|d| d.fract() == 0.0).map(|d| d as i64);
            let computed = computed.get(&key).copied().unwrap_or(0);

            let record = CountMismatch {
                key,
                declared,
                computed,
            };
            if record.diff() != Some(0) {
                mismatches.push(record);
            }
        }

        debug!(
            count_column = %count_column,
            keys = computed.len(),
            mismatches = mismatches.len(),
            "Reconciled counts"
        );
        Ok(Reconciliation::Compared {
            count_column: count_column.clone(),
            mismatches,
        })
    }

    /// Reconciles and summarizes the outcome as at most one violation.
    pub fn evaluate(&self, primary: &Table, summary: &Table) -> Result<Option<Violation>> {
        let subject = summary.name().to_string();
        match self.reconcile(primary, summary)? {
            Reconciliation::Skipped => Ok(None),
            Reconciliation::MissingCountColumn => {
                let names = self
                    .count_columns
                    .iter()
                    .map(|name| format!("'{name}'"))
                    .collect::<Vec<_>>()
                    .join(" or ");
                let message = format!("{subject}: expected a count column named {names}");
                Ok(Some(Violation::new(
                    RuleKind::CountColumn,
                    subject,
                    1,
                    Vec::new(),
                    message,
                )))
            }
            Reconciliation::Compared { mismatches, .. } if mismatches.is_empty() => Ok(None),
            Reconciliation::Compared { mismatches, .. } => {
                let sample: Vec<String> = mismatches
                    .iter()
                    .take(SAMPLE_LIMIT)
                    .map(ToString::to_string)
                    .collect();
                let message = format!(
                    "{subject}: {} {} values differ from computed counts. Sample: {}",
                    mismatches.len(),
                    self.key_column,
                    render_sample(&sample)
                );
                Ok(Some(Violation::new(
                    RuleKind::Reconciliation,
                    subject,
                    mismatches.len(),
                    sample,
                    message,
                )))
            }
        }
    }
}
