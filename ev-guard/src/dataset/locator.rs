//! Resolution of logical table names to files on disk.

use crate::error::{GuardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An ordered list of file names that may hold a logical table.
///
/// Order encodes preference: the canonical name comes first and legacy
/// aliases after it. The first candidate that exists as a regular file wins.
///
/// # Examples
///
/// ```rust,no_run
/// use ev_guard::dataset::CandidateFiles;
/// use std::path::Path;
///
/// let stations = CandidateFiles::new(
///     "main stations",
///     ["charging_stations_world.csv", "charging_station.csv"],
/// );
/// let path = stations.resolve(Path::new("data"))?;
/// # Ok::<(), ev_guard::error::GuardError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFiles {
    table: String,
    names: Vec<String>,
}

impl CandidateFiles {
    pub fn new<I, S>(table: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The logical table these candidates stand for.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the first candidate that exists as a file in `dir`.
    pub fn find(&self, dir: &Path) -> Option<PathBuf> {
        let found = self
            .names
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file());
        debug!(table = %self.table, found = ?found, "Resolved candidate files");
        found
    }

    /// Like [`find`](Self::find), but a miss is a [`GuardError::DatasetNotFound`].
    pub fn resolve(&self, dir: &Path) -> Result<PathBuf> {
        self.find(dir).ok_or_else(|| GuardError::DatasetNotFound {
            table: self.table.clone(),
            candidates: self.names.clone(),
        })
    }
}
