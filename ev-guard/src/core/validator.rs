//! The validation run: schema precondition, per-column rules, reconciliation.

use super::{policy, Reporter, SeverityMode, TableSchema, ValidationReport};
use crate::dataset::Dataset;
use crate::error::{GuardError, Result};
use crate::rules::CountReconciler;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Runs a [`TableSchema`] and an optional [`CountReconciler`] over a dataset.
///
/// Evaluation is sequential and follows declaration order:
///
/// 1. the required-columns check (fatal in every mode),
/// 2. each column's rules, column by column,
/// 3. reconciliation against the companion table, when the dataset has one.
///    The companion file is only read at this point.
///
/// Each violation goes through [`policy::route`]. In strict mode the first
/// one ends the run with an error and nothing after it is evaluated.
#[derive(Debug, Clone)]
pub struct DatasetValidator {
    schema: TableSchema,
    reconciler: Option<CountReconciler>,
}

impl DatasetValidator {
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            reconciler: None,
        }
    }

    pub fn with_reconciler(mut self, reconciler: CountReconciler) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Validates the dataset's primary table.
    #[instrument(skip_all, fields(schema = %self.schema.table(), mode = %mode))]
    pub fn run(
        &self,
        dataset: &Dataset,
        mode: SeverityMode,
        reporter: &mut dyn Reporter,
    ) -> Result<ValidationReport> {
        let start = Instant::now();
        let primary = dataset.primary().ok_or_else(|| {
            GuardError::configuration(format!(
                "dataset rooted at {} has no primary table",
                dataset.root().display()
            ))
        })?;

        self.schema.check_required(primary)?;

        let mut report = ValidationReport::new(primary.name(), mode);
        report.metrics.rows = primary.num_rows();

        for spec in self.schema.columns() {
            let Some(column) = primary.column(spec.name()) else {
                debug!(column = %spec.name(), "Optional column absent, skipping its rules");
                continue;
            };

            for rule in spec.rules() {
                debug!(
                    column = %spec.name(),
                    rule = %rule.name(),
                    description = ?rule.metadata().description,
                    "Evaluating rule"
                );
                report.metrics.rules_evaluated += 1;
                match rule.evaluate(&column)? {
                    Some(violation) => {
                        report.add_warning(policy::route(violation, mode, reporter)?);
                    }
                    None => report.metrics.rules_passed += 1,
                }
            }
        }

        if let Some(reconciler) = &self.reconciler {
            if let Some(companion) = dataset.load_companion()? {
                report.metrics.companion_checked = true;
                if let Some(violation) = reconciler.evaluate(primary, &companion)? {
                    report.add_warning(policy::route(violation, mode, reporter)?);
                }
            }
        }

        report.metrics.execution_time_ms = start.elapsed().as_millis() as u64;
        info!(
            rules = report.metrics.rules_evaluated,
            warnings = report.warnings.len(),
            duration_ms = report.metrics.execution_time_ms,
            "Validation finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnSpec, Marker, MemoryReporter, Rule, RuleKind, Violation};
    use crate::dataset::{ColumnRef, Table, COMPANION_TABLE, PRIMARY_TABLE};
    use crate::rules::{NumericRangeRule, UniquenessRule};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts how often it runs and never reports anything.
    #[derive(Debug, Default)]
    struct CountingRule {
        calls: Arc<AtomicUsize>,
    }

    impl Rule for CountingRule {
        fn evaluate(&self, _column: &ColumnRef<'_>) -> Result<Option<Violation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        fn name(&self) -> &str {
            "counting"
        }

        fn kind(&self) -> RuleKind {
            RuleKind::Uniqueness
        }
    }

    fn dataset(csv: &str) -> Dataset {
        Dataset::new("data").with_table(
            PRIMARY_TABLE,
            Table::from_csv_bytes("stations.csv", csv.as_bytes()).unwrap(),
        )
    }

    fn validator(calls: Arc<AtomicUsize>) -> DatasetValidator {
        DatasetValidator::new(
            TableSchema::builder("stations")
                .column(ColumnSpec::required("id").rule(UniquenessRule::new()))
                .column(
                    ColumnSpec::required("latitude")
                        .rule(NumericRangeRule::latitude())
                        .rule(CountingRule { calls }),
                )
                .build(),
        )
    }

    #[test]
    fn test_strict_stops_at_first_violation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut reporter = MemoryReporter::new();
        let data = dataset("id,latitude\n1,10\n1,95\n");

        let err = validator(calls.clone())
            .run(&data, SeverityMode::Strict, &mut reporter)
            .unwrap_err();

        assert_eq!(err.violation().unwrap().kind(), RuleKind::Uniqueness);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(reporter.entries().is_empty());
    }

    #[test]
    fn test_advisory_runs_every_rule() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut reporter = MemoryReporter::new();
        let data = dataset("id,latitude\n1,10\n1,95\n");

        let report = validator(calls.clone())
            .run(&data, SeverityMode::Advisory, &mut reporter)
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0].kind(), RuleKind::Uniqueness);
        assert_eq!(report.warnings[1].kind(), RuleKind::NumericRange);
        assert_eq!(reporter.messages(Marker::Warning).len(), 2);
        assert_eq!(report.metrics.rules_evaluated, 3);
        assert_eq!(report.metrics.rules_passed, 1);
    }

    #[test]
    fn test_missing_columns_abort_before_rules() {
        for mode in [SeverityMode::Strict, SeverityMode::Advisory] {
            let calls = Arc::new(AtomicUsize::new(0));
            let mut reporter = MemoryReporter::new();
            let data = dataset("latitude\n95\n");

            let err = validator(calls.clone())
                .run(&data, mode, &mut reporter)
                .unwrap_err();

            assert!(matches!(err, GuardError::MissingColumns { .. }));
            assert_eq!(calls.load(Ordering::SeqCst), 0);
            assert!(reporter.entries().is_empty());
        }
    }

    #[test]
    fn test_reconciliation_runs_only_with_companion() {
        let schema = TableSchema::builder("stations")
            .column(ColumnSpec::required("country_code"))
            .build();
        let validator = DatasetValidator::new(schema)
            .with_reconciler(CountReconciler::new("country_code", ["stations", "count"]));
        let mut reporter = MemoryReporter::new();

        let data = dataset("country_code\nUS\nUS\nDE\n");
        let report = validator
            .run(&data, SeverityMode::Strict, &mut reporter)
            .unwrap();
        assert!(!report.metrics.companion_checked);

        let summary =
            Table::from_csv_bytes("country_summary.csv", b"country_code,stations\nUS,3\nDE,1\n")
                .unwrap();
        let data = data.with_table(COMPANION_TABLE, summary);
        let err = validator
            .run(&data, SeverityMode::Strict, &mut reporter)
            .unwrap_err();
        assert!(matches!(err, GuardError::ReconciliationMismatch(_)));

        let report = validator
            .run(&data, SeverityMode::Advisory, &mut reporter)
            .unwrap();
        assert!(report.metrics.companion_checked);
        assert_eq!(report.warnings.len(), 1);
    }
}
