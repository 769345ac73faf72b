//! Checksum manifests over a small repository layout.

use ev_guard::checksums::{compute_checksums, sha256_file, write_checksums, DEFAULT_INCLUDE};
use ev_guard::core::MemoryReporter;
use std::path::Path;
use tempfile::TempDir;

fn repository() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("data")).unwrap();
    std::fs::write(root.join("data/charging_stations_world.csv"), "id\n1\n").unwrap();
    std::fs::write(root.join("data/country_summary.csv"), "country_code,stations\n").unwrap();
    std::fs::write(root.join("data/notes.txt"), "not included").unwrap();
    std::fs::write(root.join("README.md"), "# EV dataset\n").unwrap();
    std::fs::write(root.join("data_dictionary.csv"), "column,meaning\n").unwrap();
    dir
}

fn patterns(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn write(root: &Path, out: &Path, include: &[String]) -> String {
    write_checksums(root, out, include, &mut MemoryReporter::new()).unwrap();
    std::fs::read_to_string(out).unwrap()
}

#[test]
fn test_default_patterns() {
    let repo = repository();
    let entries = compute_checksums(repo.path(), &patterns(&DEFAULT_INCLUDE)).unwrap();
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "README.md",
            "data/charging_stations_world.csv",
            "data/country_summary.csv",
            "data_dictionary.csv",
        ]
    );

    let readme = repo.path().join("README.md");
    assert_eq!(entries[0].digest, sha256_file(&readme).unwrap());
    assert_eq!(entries[0].digest.len(), 64);
}

#[test]
fn test_output_is_deterministic() {
    let repo = repository();
    let out_a = repo.path().join("a.sha256");
    let out_b = repo.path().join("b.sha256");

    let first = write(repo.path(), &out_a, &patterns(&DEFAULT_INCLUDE));
    let again = write(repo.path(), &out_a, &patterns(&DEFAULT_INCLUDE));
    assert_eq!(first, again);

    let reordered = write(
        repo.path(),
        &out_b,
        &patterns(&["README.md", "data_dictionary.csv", "data/*.csv", "README.md"]),
    );
    assert_eq!(first, reordered);
}

#[test]
fn test_lines_use_two_space_separator() {
    let repo = repository();
    let out = repo.path().join("checksums.sha256");
    let content = write(repo.path(), &out, &patterns(&["data/*.csv"]));

    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        let (digest, path) = line.split_once("  ").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(path.starts_with("data/"));
    }
    assert!(content.ends_with('\n'));
}

#[test]
fn test_no_matches_writes_empty_manifest() {
    let repo = repository();
    let out = repo.path().join("checksums.sha256");
    let mut reporter = MemoryReporter::new();
    let written = write_checksums(
        repo.path(),
        &out,
        &patterns(&["missing/*.csv"]),
        &mut reporter,
    )
    .unwrap();
    assert_eq!(written, 0);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "\n");
}
