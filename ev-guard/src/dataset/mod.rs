//! Dataset loading: locating table files and materializing them in memory.
//!
//! A [`Dataset`] is the snapshot a validation run works on: the primary
//! stations table plus, when present, the companion summary table. Both are
//! read whole and stay immutable for the rest of the run.

mod locator;
mod table;

pub use locator::CandidateFiles;
pub use table::{ColumnKind, ColumnRef, Table};

use crate::config::DatasetLayout;
use crate::error::{GuardError, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Logical name of the primary table.
pub const PRIMARY_TABLE: &str = "stations";
/// Logical name of the companion summary table.
pub const COMPANION_TABLE: &str = "country_summary";

/// The tables of one dataset snapshot, in load order.
///
/// The companion table is only located when the dataset is loaded from disk.
/// It is read later, by [`load_companion`](Self::load_companion), once the
/// primary table's checks have run.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
    tables: Vec<(String, Table)>,
    companion_path: Option<PathBuf>,
}

impl Dataset {
    /// Locates the tables described by `layout` in `dir` and loads the primary one.
    ///
    /// The primary table is required. The companion table is optional; only
    /// its path is resolved here.
    #[instrument(skip(dir, layout), fields(dir = %dir.display()))]
    pub fn load(dir: &Path, layout: &DatasetLayout) -> Result<Self> {
        if !dir.is_dir() {
            return Err(GuardError::DataDirNotFound {
                path: dir.to_path_buf(),
            });
        }

        let primary_path = layout.primary_candidates().resolve(dir)?;
        let mut dataset = Self::new(dir);
        dataset.insert(PRIMARY_TABLE, Table::load(&primary_path)?);
        dataset.companion_path = layout.companion_candidates().find(dir);

        info!(
            companion = ?dataset.companion_path,
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Creates an empty dataset rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tables: Vec::new(),
            companion_path: None,
        }
    }

    /// Adds or replaces a table under a logical name.
    pub fn insert(&mut self, logical_name: impl Into<String>, table: Table) {
        let logical_name = logical_name.into();
        match self.tables.iter_mut().find(|(name, _)| *name == logical_name) {
            Some(slot) => slot.1 = table,
            None => self.tables.push((logical_name, table)),
        }
    }

    pub fn with_table(mut self, logical_name: impl Into<String>, table: Table) -> Self {
        self.insert(logical_name, table);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table(&self, logical_name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|(name, _)| name == logical_name)
            .map(|(_, table)| table)
    }

    /// The primary stations table.
    pub fn primary(&self) -> Option<&Table> {
        self.table(PRIMARY_TABLE)
    }

    /// The companion summary table, if it is already in memory.
    pub fn companion(&self) -> Option<&Table> {
        self.table(COMPANION_TABLE)
    }

    /// Path of the companion file found on disk, not yet read.
    pub fn companion_path(&self) -> Option<&Path> {
        self.companion_path.as_deref()
    }

    /// Returns the companion table, reading it from disk if it is not in memory.
    ///
    /// `Ok(None)` means the dataset has no companion table at all.
    pub fn load_companion(&self) -> Result<Option<Cow<'_, Table>>> {
        if let Some(table) = self.companion() {
            return Ok(Some(Cow::Borrowed(table)));
        }
        match &self.companion_path {
            Some(path) => Ok(Some(Cow::Owned(Table::load(path)?))),
            None => Ok(None),
        }
    }
}
