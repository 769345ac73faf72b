//! SHA-256 manifest of the published dataset files.
//!
//! The manifest has one line per file, `<hex digest>  <relative path>`, with
//! forward slashes in paths and files sorted by canonical path. Running the
//! writer twice over unchanged files yields byte-identical output regardless
//! of the order the include patterns were given in.

use crate::core::{Marker, Reporter};
use crate::error::{GuardError, Result};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument};

/// Bytes read per chunk while hashing.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Output file name used when none is given.
pub const DEFAULT_OUTPUT: &str = "checksums.sha256";

/// Patterns hashed when none are given, relative to the root.
pub const DEFAULT_INCLUDE: [&str; 5] = [
    "data/*.csv",
    "README.md",
    "CHANGELOG.md",
    "data_dictionary.csv",
    "OCM_CC_BY_4.0.txt",
];

/// One line of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumEntry {
    pub digest: String,
    /// Path relative to the root, `/`-separated
    pub path: String,
}

impl ChecksumEntry {
    pub fn to_line(&self) -> String {
        format!("{}  {}", self.digest, self.path)
    }
}

/// Hashes a file with SHA-256, streaming it in [`CHUNK_SIZE`] chunks.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Expands `patterns` under `root` into the sorted set of canonical paths of
/// matching regular files.
pub fn collect_files(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let root_str = root.to_str().ok_or_else(|| {
        GuardError::configuration(format!("Root is not valid UTF-8: {}", root.display()))
    })?;
    let escaped_root = glob::Pattern::escape(root_str);

    let mut files = BTreeSet::new();
    for pattern in patterns {
        let full = format!("{escaped_root}/{pattern}");
        let matches = glob::glob(&full).map_err(|e| {
            GuardError::configuration(format!("Invalid glob pattern '{pattern}': {e}"))
        })?;

        for entry in matches {
            let path = entry.map_err(|e| GuardError::Io(e.into_error()))?;
            if path.is_file() {
                files.insert(path.canonicalize()?);
            }
        }
        debug!(pattern = %pattern, total = files.len(), "Expanded include pattern");
    }

    Ok(files.into_iter().collect())
}

/// Renders `path` relative to `root` with `/` separators.
fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        GuardError::configuration(format!(
            "{} is outside of {}",
            path.display(),
            root.display()
        ))
    })?;
    Ok(relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/"))
}

/// Hashes every file matched by `patterns` under `root`.
pub fn compute_checksums(root: &Path, patterns: &[String]) -> Result<Vec<ChecksumEntry>> {
    let root = root.canonicalize()?;
    collect_files(&root, patterns)?
        .into_iter()
        .map(|path| {
            Ok(ChecksumEntry {
                digest: sha256_file(&path)?,
                path: relative_path(&root, &path)?,
            })
        })
        .collect()
}

/// Joins manifest lines with `\n` and a trailing newline.
pub fn render_manifest(entries: &[ChecksumEntry]) -> String {
    let lines: Vec<String> = entries.iter().map(ChecksumEntry::to_line).collect();
    format!("{}\n", lines.join("\n"))
}

/// Writes the manifest for `patterns` under `root` to `out_file` and returns
/// the number of entries written.
#[instrument(skip(patterns, reporter), fields(root = %root.display(), out = %out_file.display()))]
pub fn write_checksums(
    root: &Path,
    out_file: &Path,
    patterns: &[String],
    reporter: &mut dyn Reporter,
) -> Result<usize> {
    let entries = compute_checksums(root, patterns)?;
    std::fs::write(out_file, render_manifest(&entries))?;

    info!(entries = entries.len(), "Wrote checksum manifest");
    reporter.emit(
        Marker::Success,
        &format!("Wrote {} ({} entries)", out_file.display(), entries.len()),
    );
    Ok(entries.len())
}
