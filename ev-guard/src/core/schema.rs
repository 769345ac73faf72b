//! Schema contracts: required columns and the rules bound to each column.

use super::Rule;
use crate::dataset::Table;
use crate::error::{GuardError, Result};
use std::sync::Arc;
use tracing::debug;

/// One column of a table schema and the rules that run on it, in order.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    name: String,
    required: bool,
    rules: Vec<Arc<dyn Rule>>,
}

impl ColumnSpec {
    /// A column that must be present in the table.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            rules: Vec::new(),
        }
    }

    /// A column whose rules run only when it is present.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    /// Appends a rule. Rules run in the order they are added.
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }
}

/// The contract a table must satisfy.
///
/// # Examples
///
/// ```rust
/// use ev_guard::core::{ColumnSpec, TableSchema};
/// use ev_guard::rules::{UniquenessRule, NumericRangeRule};
///
/// let schema = TableSchema::builder("stations")
///     .column(ColumnSpec::required("id").rule(UniquenessRule::new()))
///     .column(ColumnSpec::required("latitude").rule(NumericRangeRule::latitude()))
///     .column(ColumnSpec::required("name"))
///     .build();
///
/// assert_eq!(schema.required_columns(), vec!["id", "latitude", "name"]);
/// assert_eq!(schema.rule_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TableSchema {
    table: String,
    columns: Vec<ColumnSpec>,
}

impl TableSchema {
    pub fn builder(table: impl Into<String>) -> TableSchemaBuilder {
        TableSchemaBuilder {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// The logical table this schema applies to.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Names of the required columns, in declaration order.
    pub fn required_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.required)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Total number of rules across all columns.
    pub fn rule_count(&self) -> usize {
        self.columns.iter().map(|c| c.rules.len()).sum()
    }

    /// Fails with [`GuardError::MissingColumns`] if any required column is absent.
    ///
    /// This check does not depend on the severity mode.
    pub fn check_required(&self, table: &Table) -> Result<()> {
        let missing = table.missing_columns(&self.required_columns());
        if missing.is_empty() {
            debug!(table = %table.name(), "All required columns present");
            Ok(())
        } else {
            Err(GuardError::MissingColumns {
                table: table.name().to_string(),
                missing,
            })
        }
    }
}

/// Builder for [`TableSchema`].
#[derive(Debug)]
pub struct TableSchemaBuilder {
    table: String,
    columns: Vec<ColumnSpec>,
}

impl TableSchemaBuilder {
    /// Appends a column. Columns are validated in the order they are added.
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends several columns after the ones already added.
    pub fn columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = ColumnSpec>,
    {
        self.columns.extend(columns);
        self
    }

    pub fn build(self) -> TableSchema {
        TableSchema {
            table: self.table,
            columns: self.columns,
        }
    }
}
