//! In-memory tables loaded from CSV with typed columns.

use crate::error::{GuardError, Result};
use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::{cast, concat_batches};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use std::io::{Cursor, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The value type a column was resolved to when its table was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer or floating point values
    Numeric,
    /// Free text (also used for dates and other non-primitive types)
    Text,
    /// `true` / `false` values
    Boolean,
}

impl ColumnKind {
    fn of(data_type: &DataType) -> Self {
        match data_type {
            DataType::Boolean => Self::Boolean,
            DataType::Int64 | DataType::Float64 => Self::Numeric,
            _ => Self::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::Boolean => "boolean",
        }
    }
}

/// A named table materialized from a CSV file.
///
/// Every column is resolved once at load time to one of the [`ColumnKind`]
/// variants. Empty cells load as nulls. Tables are immutable after loading.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    path: Option<PathBuf>,
    batch: RecordBatch,
}

impl Table {
    /// Loads a table from a CSV file on disk, reading the whole file at once.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut table =
            Self::from_csv_bytes(name, &bytes).map_err(|source| GuardError::ReadFailure {
                path: path.to_path_buf(),
                source,
            })?;
        table.path = Some(path.to_path_buf());

        info!(
            table = %table.name,
            rows = table.num_rows(),
            columns = table.batch.num_columns(),
            "Loaded table"
        );
        Ok(table)
    }

    /// Parses CSV text (with a header row) into a table.
    pub fn from_csv_bytes(
        name: impl Into<String>,
        bytes: &[u8],
    ) -> std::result::Result<Self, ArrowError> {
        let name = name.into();
        let format = Format::default().with_header(true);
        let mut cursor = Cursor::new(bytes);

        let (schema, records) = format.infer_schema(&mut cursor, None)?;
        debug!(table = %name, records, "Inferred CSV schema");
        cursor.seek(SeekFrom::Start(0))?;

        let schema = Arc::new(schema);
        let reader = ReaderBuilder::new(schema.clone())
            .with_format(format)
            .build(cursor)?;
        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        let batch = concat_batches(&schema, &batches)?;

        Ok(Self {
            name,
            path: None,
            batch: normalize(batch)?,
        })
    }

    /// The table's display name (the file name for tables loaded from disk).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Column names in file order.
    pub fn column_names(&self) -> Vec<&str> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema_ref().index_of(name).is_ok()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<ColumnRef<'_>> {
        let index = self.batch.schema_ref().index_of(name).ok()?;
        let field = self.batch.schema_ref().field(index);
        Some(ColumnRef {
            table: &self.name,
            name: field.name(),
            array: self.batch.column(index),
            kind: ColumnKind::of(field.data_type()),
        })
    }

    /// Returns the subset of `names` that this table does not have, in the given order.
    pub fn missing_columns<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        names
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| !self.has_column(name))
            .map(str::to_string)
            .collect()
    }

    /// Keeps only the listed columns that exist, in the listed order.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> Result<RecordBatch> {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|name| self.batch.schema_ref().index_of(name.as_ref()).ok())
            .collect();
        Ok(self.batch.project(&indices)?)
    }
}

/// Casts every column to one of the types backing a [`ColumnKind`].
fn normalize(batch: RecordBatch) -> std::result::Result<RecordBatch, ArrowError> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut columns = Vec::with_capacity(schema.fields().len());

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        match field.data_type() {
            DataType::Boolean | DataType::Int64 | DataType::Float64 | DataType::Utf8 => {
                fields.push(field.as_ref().clone());
                columns.push(column.clone());
            }
            other => {
                debug!(column = %field.name(), data_type = %other, "Normalizing column to text");
                fields.push(Field::new(field.name(), DataType::Utf8, true));
                columns.push(cast(column.as_ref(), &DataType::Utf8)?);
            }
        }
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
}

/// A borrowed view of one column of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct ColumnRef<'a> {
    table: &'a str,
    name: &'a str,
    array: &'a ArrayRef,
    kind: ColumnKind,
}

impl<'a> ColumnRef<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The column name qualified by its table, e.g. `stations.csv.latitude`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    pub fn array(&self) -> &'a ArrayRef {
        self.array
    }

    /// Renders every row as text, keeping nulls as `None`.
    pub fn text_values(&self) -> Result<Vec<Option<String>>> {
        if let Some(strings) = self.array.as_any().downcast_ref::<StringArray>() {
            return Ok(strings.iter().map(|v| v.map(str::to_string)).collect());
        }

        (0..self.array.len())
            .map(|i| {
                if self.array.is_null(i) {
                    Ok(None)
                } else {
                    Ok(Some(array_value_to_string(self.array.as_ref(), i)?))
                }
            })
            .collect()
    }

    /// Coerces every row to a number.
    ///
    /// Nulls and text that does not parse as a number become `None`. Boolean
    /// columns are rejected with [`GuardError::TypeMismatch`].
    pub fn numeric_values(&self) -> Result<Vec<Option<f64>>> {
        match self.kind {
            ColumnKind::Numeric => {
                let floats = cast(self.array.as_ref(), &DataType::Float64)?;
                let floats = floats
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(|| GuardError::TypeMismatch {
                        column: self.qualified_name(),
                        expected: "numeric".to_string(),
                        found: self.array.data_type().to_string(),
                    })?;
                Ok(floats.iter().map(|v| v.filter(|f| !f.is_nan())).collect())
            }
            ColumnKind::Text => Ok(self
                .text_values()?
                .into_iter()
                .map(|v| v.and_then(|s| parse_number(&s)))
                .collect()),
            ColumnKind::Boolean => Err(GuardError::TypeMismatch {
                column: self.qualified_name(),
                expected: ColumnKind::Numeric.as_str().to_string(),
                found: ColumnKind::Boolean.as_str().to_string(),
            }),
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|f| !f.is_nan())
}
