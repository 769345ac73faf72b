//! Derived CSV views of the stations table.
//!
//! Three files are written to the output directory:
//!
//! - `country_summary.csv`: stations per country, most stations first
//! - `world_summary.csv`: one row of global totals
//! - `charging_station_ml.csv`: a compact projection for model training

use crate::config::DatasetLayout;
use crate::core::{Marker, Reporter};
use crate::dataset::{ColumnRef, Table};
use crate::error::{GuardError, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const COUNTRY_SUMMARY_FILE: &str = "country_summary.csv";
pub const WORLD_SUMMARY_FILE: &str = "world_summary.csv";
pub const ML_VIEW_FILE: &str = "charging_station_ml.csv";

/// Columns kept in the ML view, when present.
pub const ML_COLUMNS: [&str; 7] = [
    "id",
    "country_code",
    "latitude",
    "longitude",
    "ports",
    "power_kw",
    "is_fast_dc",
];

/// Minimum power in kW counted as fast DC when no `is_fast_dc` column exists.
pub const FAST_DC_MIN_POWER_KW: f64 = 50.0;

const TRUTHY: [&str; 3] = ["true", "1", "yes"];

/// Paths of the views written by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOutputs {
    pub country_summary: PathBuf,
    pub world_summary: PathBuf,
    pub ml: PathBuf,
}

impl ViewOutputs {
    pub fn paths(&self) -> [&Path; 3] {
        [&self.country_summary, &self.world_summary, &self.ml]
    }
}

/// Single-row global totals.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSummary {
    /// Distinct non-null country codes
    pub countries: usize,
    pub stations: usize,
    /// Sum of ports, treating missing values as zero
    pub ports_sum: f64,
    /// `None` when no row has a numeric power
    pub power_kw_max: Option<f64>,
    /// `None` when the table is empty
    pub fast_dc_share: Option<f64>,
}

/// Counts stations per country code, sorted by count descending then code.
///
/// Rows without a country code are not counted.
pub fn country_counts(stations: &Table) -> Result<Vec<(String, u64)>> {
    let codes = required_column(stations, "country_code")?;

    let mut counts: HashMap<String, u64> = HashMap::new();
    for code in codes.text_values()?.into_iter().flatten() {
        *counts.entry(code).or_default() += 1;
    }

    let mut counts: Vec<(String, u64)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(counts)
}

/// Computes the world summary row.
pub fn world_summary(stations: &Table) -> Result<WorldSummary> {
    let rows = stations.num_rows();
    let codes = required_column(stations, "country_code")?;
    let countries = codes
        .text_values()?
        .into_iter()
        .flatten()
        .collect::<HashSet<_>>()
        .len();

    let ports = numeric_or_empty(stations.column("ports"), rows)?;
    let power = numeric_or_empty(stations.column("power_kw"), rows)?;

    let ports_sum: f64 = ports.iter().flatten().sum();
    let power_kw_max = power.iter().flatten().copied().reduce(f64::max);

    let fast: Vec<bool> = match stations.column("is_fast_dc") {
        Some(column) => column
            .text_values()?
            .into_iter()
            .map(|v| v.is_some_and(|s| TRUTHY.contains(&s.to_lowercase().as_str())))
            .collect(),
        None => power
            .iter()
            .map(|p| p.is_some_and(|kw| kw >= FAST_DC_MIN_POWER_KW))
            .collect(),
    };
    let fast_dc_share = (rows > 0)
        .then(|| fast.iter().filter(|&&is_fast| is_fast).count() as f64 / rows as f64);

    Ok(WorldSummary {
        countries,
        stations: rows,
        ports_sum,
        power_kw_max,
        fast_dc_share,
    })
}

fn required_column<'a>(table: &'a Table, name: &str) -> Result<ColumnRef<'a>> {
    table.column(name).ok_or_else(|| GuardError::MissingColumns {
        table: table.name().to_string(),
        missing: vec![name.to_string()],
    })
}

fn numeric_or_empty(column: Option<ColumnRef<'_>>, rows: usize) -> Result<Vec<Option<f64>>> {
    match column {
        Some(column) => column.numeric_values(),
        None => Ok(vec![None; rows]),
    }
}

fn country_batch(counts: &[(String, u64)]) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("country_code", DataType::Utf8, false),
        Field::new("stations", DataType::Int64, false),
    ]);
    let codes: ArrayRef = Arc::new(StringArray::from_iter_values(
        counts.iter().map(|(code, _)| code.as_str()),
    ));
    let stations: ArrayRef = Arc::new(Int64Array::from_iter_values(
        counts.iter().map(|(_, n)| *n as i64),
    ));
    Ok(RecordBatch::try_new(Arc::new(schema), vec![codes, stations])?)
}

fn world_batch(summary: &WorldSummary) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("countries", DataType::Int64, false),
        Field::new("stations", DataType::Int64, false),
        Field::new("ports_sum", DataType::Float64, false),
        Field::new("power_kw_max", DataType::Float64, true),
        Field::new("fast_dc_share", DataType::Float64, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![summary.countries as i64])),
        Arc::new(Int64Array::from(vec![summary.stations as i64])),
        Arc::new(Float64Array::from(vec![summary.ports_sum])),
        Arc::new(Float64Array::from(vec![summary.power_kw_max])),
        Arc::new(Float64Array::from(vec![summary.fast_dc_share])),
    ];
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

fn write_csv(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(batch)?;
    debug!(path = %path.display(), rows = batch.num_rows(), "Wrote view");
    Ok(())
}

/// Builds the derived views from the stations table of a data directory.
#[derive(Debug, Clone, Default)]
pub struct ViewBuilder {
    layout: DatasetLayout,
}

impl ViewBuilder {
    pub fn new(layout: DatasetLayout) -> Self {
        Self { layout }
    }

    /// Writes all three views for an already loaded table.
    pub fn write_views(&self, stations: &Table, out_dir: &Path) -> Result<ViewOutputs> {
        std::fs::create_dir_all(out_dir)?;
        let outputs = ViewOutputs {
            country_summary: out_dir.join(COUNTRY_SUMMARY_FILE),
            world_summary: out_dir.join(WORLD_SUMMARY_FILE),
            ml: out_dir.join(ML_VIEW_FILE),
        };

        write_csv(
            &outputs.country_summary,
            &country_batch(&country_counts(stations)?)?,
        )?;
        write_csv(&outputs.world_summary, &world_batch(&world_summary(stations)?)?)?;
        write_csv(&outputs.ml, &stations.project(&ML_COLUMNS)?)?;

        Ok(outputs)
    }

    /// Locates and loads the stations table in `data_dir`, then writes the views.
    #[instrument(skip(self, reporter), fields(data_dir = %data_dir.display(), out_dir = %out_dir.display()))]
    pub fn build(
        &self,
        data_dir: &Path,
        out_dir: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<ViewOutputs> {
        if !data_dir.is_dir() {
            return Err(GuardError::DataDirNotFound {
                path: data_dir.to_path_buf(),
            });
        }
        let path = self.layout.primary_candidates().resolve(data_dir)?;
        let stations = Table::load(&path)?;
        let outputs = self.write_views(&stations, out_dir)?;

        info!(rows = stations.num_rows(), "Built views");
        let listing: String = outputs
            .paths()
            .iter()
            .map(|p| format!("\n  - {}", p.display()))
            .collect();
        reporter.emit(Marker::Success, &format!("Wrote:{listing}"));
        Ok(outputs)
    }
}

/// Builds the views with the default dataset layout.
pub fn build_views(
    data_dir: &Path,
    out_dir: &Path,
    reporter: &mut dyn Reporter,
) -> Result<ViewOutputs> {
    ViewBuilder::default().build(data_dir, out_dir, reporter)
}
