//! The contract for the EV charging station dataset and the validation entry point.

use crate::config::{DatasetLayout, ValidationConfig};
use crate::core::{ColumnSpec, DatasetValidator, Reporter, TableSchema, ValidationReport};
use crate::dataset::{Dataset, PRIMARY_TABLE};
use crate::error::Result;
use crate::rules::{
    CountReconciler, NonNegativeRule, NumericRangeRule, RegexMatchRule, SetMembershipRule,
    UniquenessRule,
};
use std::path::Path;
use tracing::{info, instrument};

/// Columns every primary stations table must have, in schema order.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "id",
    "name",
    "city",
    "country_code",
    "state_province",
    "latitude",
    "longitude",
    "ports",
    "power_kw",
    "power_class",
    "is_fast_dc",
];

/// The schema of the primary stations table.
///
/// Rules run in this order: `id` uniqueness, `country_code` format,
/// `latitude` and `longitude` bounds, non-negative `ports` and `power_kw`,
/// then `power_class` membership.
pub fn stations_schema() -> TableSchema {
    TableSchema::builder(PRIMARY_TABLE)
        .columns([
            ColumnSpec::required("id").rule(UniquenessRule::new()),
            ColumnSpec::required("name"),
            ColumnSpec::required("city"),
            ColumnSpec::required("country_code").rule(RegexMatchRule::country_code()),
            ColumnSpec::required("state_province"),
            ColumnSpec::required("latitude").rule(NumericRangeRule::latitude()),
            ColumnSpec::required("longitude").rule(NumericRangeRule::longitude()),
            ColumnSpec::required("ports").rule(NonNegativeRule::new()),
            ColumnSpec::required("power_kw").rule(NonNegativeRule::new()),
            ColumnSpec::required("power_class").rule(SetMembershipRule::power_class()),
            ColumnSpec::required("is_fast_dc"),
        ])
        .build()
}

/// The validator for the stations dataset: schema plus country count reconciliation.
pub fn stations_validator(layout: &DatasetLayout) -> DatasetValidator {
    DatasetValidator::new(stations_schema()).with_reconciler(CountReconciler::new(
        layout.key_column(),
        layout.count_columns().iter().cloned(),
    ))
}

/// Loads the dataset in `data_dir` and validates it.
///
/// Structural failures and, in strict mode, the first violation are returned
/// as errors. Advisory warnings are emitted to `reporter` as they are found.
#[instrument(skip(config, reporter), fields(data_dir = %data_dir.display(), mode = %config.mode))]
pub fn validate_dataset(
    data_dir: &Path,
    config: &ValidationConfig,
    reporter: &mut dyn Reporter,
) -> Result<ValidationReport> {
    let dataset = Dataset::load(data_dir, &config.layout)?;
    let report = stations_validator(&config.layout).run(&dataset, config.mode, reporter)?;
    info!(warnings = report.warnings.len(), "Dataset validated");
    Ok(report)
}
