//! End-to-end validation runs over datasets written to temporary directories.

use ev_guard::config::{DatasetLayout, ValidationConfig};
use ev_guard::core::{Marker, MemoryReporter, RuleKind, SeverityMode};
use ev_guard::error::GuardError;
use ev_guard::stations::validate_dataset;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str =
    "id,name,city,country_code,state_province,latitude,longitude,ports,power_kw,power_class,is_fast_dc";

const CLEAN_ROWS: [&str; 3] = [
    "1,Alpha,Berlin,DE,BE,52.52,13.40,4,150,fast,true",
    "2,Beta,Austin,US,TX,30.27,-97.74,2,22,slow,false",
    "3,Gamma,Boston,US,MA,42.36,-71.06,8,350,hpc,true",
];

fn write_csv(dir: &Path, name: &str, header: &str, rows: &[&str]) {
    let mut content = format!("{header}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(dir.join(name), content).unwrap();
}

fn dataset(rows: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_csv(dir.path(), "charging_stations_world.csv", HEADER, rows);
    dir
}

fn run(
    dir: &Path,
    mode: SeverityMode,
) -> (ev_guard::error::Result<ev_guard::core::ValidationReport>, MemoryReporter) {
    let mut reporter = MemoryReporter::new();
    let result = validate_dataset(dir, &ValidationConfig::new(mode), &mut reporter);
    (result, reporter)
}

#[test]
fn test_clean_dataset_passes_in_both_modes() {
    let dir = dataset(&CLEAN_ROWS);
    for mode in [SeverityMode::Strict, SeverityMode::Advisory] {
        let (result, reporter) = run(dir.path(), mode);
        let report = result.unwrap();
        assert!(!report.has_warnings());
        assert_eq!(report.metrics.rules_evaluated, 7);
        assert_eq!(report.metrics.rules_passed, 7);
        assert_eq!(report.metrics.rows, 3);
        assert!(!report.metrics.companion_checked);
        assert_eq!(
            report.summary(),
            "charging_stations_world.csv: validation passed (0 warnings)"
        );
        assert!(reporter.entries().is_empty());
    }
}

#[test]
fn test_strict_mode_stops_at_first_violation() {
    // bad latitude on row 2, bad power class on row 3
    let dir = dataset(&[
        CLEAN_ROWS[0],
        "2,Beta,Austin,US,TX,95.0,-97.74,2,22,slow,false",
        "3,Gamma,Boston,US,MA,42.36,-71.06,8,350,ultra,true",
    ]);

    let (result, reporter) = run(dir.path(), SeverityMode::Strict);
    let err = result.unwrap_err();
    assert!(!err.is_structural());
    let violation = match err {
        GuardError::RuleViolation(violation) => violation,
        other => panic!("expected a rule violation, got {other:?}"),
    };
    assert_eq!(violation.kind(), RuleKind::NumericRange);
    assert_eq!(violation.subject(), "charging_stations_world.csv.latitude");
    assert!(reporter.messages(Marker::Warning).is_empty());
}

#[test]
fn test_advisory_mode_reports_every_violation_in_order() {
    let dir = dataset(&[
        CLEAN_ROWS[0],
        "2,Beta,Austin,US,TX,95.0,-97.74,2,22,slow,false",
        "3,Gamma,Boston,US,MA,42.36,-71.06,8,350,ultra,true",
    ]);

    let (result, reporter) = run(dir.path(), SeverityMode::Advisory);
    let report = result.unwrap();
    assert_eq!(report.metrics.rules_evaluated, 7);
    assert_eq!(report.metrics.rules_passed, 5);

    let kinds: Vec<RuleKind> = report.warnings.iter().map(|v| v.kind()).collect();
    assert_eq!(kinds, vec![RuleKind::NumericRange, RuleKind::SetMembership]);

    let warnings = reporter.messages(Marker::Warning);
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].starts_with("charging_stations_world.csv.latitude: 1 values out of range"));
    assert_eq!(
        warnings[1],
        "charging_stations_world.csv.power_class: 1 values not in [fast, hpc, slow]. Sample: [ultra]"
    );
    assert_eq!(
        report.summary(),
        "charging_stations_world.csv: validation passed (2 warnings)"
    );
}

#[test]
fn test_duplicate_ids_count_later_occurrences() {
    let dir = dataset(&[
        CLEAN_ROWS[0],
        "1,Beta,Austin,US,TX,30.27,-97.74,2,22,slow,false",
        "1,Gamma,Boston,US,MA,42.36,-71.06,8,350,hpc,true",
    ]);

    let (result, _) = run(dir.path(), SeverityMode::Advisory);
    let report = result.unwrap();
    assert_eq!(report.warnings.len(), 1);
    let violation = &report.warnings[0];
    assert_eq!(violation.kind(), RuleKind::Uniqueness);
    assert_eq!(violation.count(), 2);
    assert_eq!(
        violation.message(),
        "charging_stations_world.csv.id: 2 duplicate values detected. Sample: [1, 1]"
    );
}

#[test]
fn test_missing_columns_abort_before_rules() {
    let header = "id,name,country_code,state_province,latitude,longitude,ports,power_kw,is_fast_dc";
    let dir = tempfile::tempdir().unwrap();
    write_csv(
        dir.path(),
        "charging_stations_world.csv",
        header,
        &["1,A,DE,BE,95,13.4,4,150,true", "1,B,us,TX,30,-97,2,22,false"],
    );

    for mode in [SeverityMode::Strict, SeverityMode::Advisory] {
        let (result, reporter) = run(dir.path(), mode);
        let err = result.unwrap_err();
        assert!(err.is_structural());
        assert_eq!(
            err.to_string(),
            "charging_stations_world.csv: missing required columns: [city, power_class]"
        );
        assert!(reporter.entries().is_empty());
    }
}

#[test]
fn test_no_stations_file() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(dir.path(), "stations.csv", HEADER, &CLEAN_ROWS);

    let (result, _) = run(dir.path(), SeverityMode::Advisory);
    let err = result.unwrap_err();
    assert!(matches!(err, GuardError::DatasetNotFound { .. }));
    assert_eq!(
        err.to_string(),
        "Could not find main stations file. Expected one of: charging_stations_world.csv, \
         charging_station.csv, charging_stations.csv"
    );
}

#[test]
fn test_missing_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (result, _) = run(&dir.path().join("absent"), SeverityMode::Advisory);
    assert!(matches!(result.unwrap_err(), GuardError::DataDirNotFound { .. }));
}

#[test]
fn test_canonical_name_preferred_over_legacy() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(dir.path(), "charging_stations.csv", HEADER, &CLEAN_ROWS);
    let (result, _) = run(dir.path(), SeverityMode::Strict);
    assert_eq!(result.unwrap().table, "charging_stations.csv");

    write_csv(dir.path(), "charging_stations_world.csv", HEADER, &CLEAN_ROWS);
    let (result, _) = run(dir.path(), SeverityMode::Strict);
    assert_eq!(result.unwrap().table, "charging_stations_world.csv");
}

#[test]
fn test_matching_country_summary() {
    let dir = dataset(&CLEAN_ROWS);
    write_csv(dir.path(), "country_summary.csv", "country_code,stations", &["US,2", "DE,1"]);

    let (result, reporter) = run(dir.path(), SeverityMode::Strict);
    let report = result.unwrap();
    assert!(report.metrics.companion_checked);
    assert!(!report.has_warnings());
    assert!(reporter.entries().is_empty());
}

#[test]
fn test_country_summary_mismatch() {
    let dir = dataset(&CLEAN_ROWS);
    write_csv(dir.path(), "country_summary.csv", "country_code,count", &["US,3", "DE,1"]);

    let (result, reporter) = run(dir.path(), SeverityMode::Advisory);
    assert_eq!(result.unwrap().warnings.len(), 1);
    assert_eq!(
        reporter.messages(Marker::Warning),
        vec![
            "country_summary.csv: 1 country_code values differ from computed counts. \
             Sample: [{key: US, declared: 3, computed: 2}]"
        ]
    );

    let (result, _) = run(dir.path(), SeverityMode::Strict);
    assert!(matches!(
        result.unwrap_err(),
        GuardError::ReconciliationMismatch(_)
    ));
}

#[test]
fn test_companion_is_read_after_column_rules() {
    let dir = dataset(&[
        CLEAN_ROWS[0],
        "2,Beta,Austin,US,TX,95.0,-97.74,2,22,slow,false",
    ]);
    write_csv(
        dir.path(),
        "country_summary.csv",
        "country_code,stations",
        &["US,1", "DE,1,9"],
    );

    let (result, reporter) = run(dir.path(), SeverityMode::Strict);
    match result.unwrap_err() {
        GuardError::RuleViolation(violation) => {
            assert_eq!(violation.subject(), "charging_stations_world.csv.latitude");
        }
        other => panic!("expected the latitude violation, got {other:?}"),
    }
    assert!(reporter.entries().is_empty());

    let (result, reporter) = run(dir.path(), SeverityMode::Advisory);
    assert!(matches!(result.unwrap_err(), GuardError::ReadFailure { .. }));
    let warnings = reporter.messages(Marker::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("charging_stations_world.csv.latitude"));
}

#[test]
fn test_missing_columns_reported_before_unreadable_companion() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(
        dir.path(),
        "charging_stations_world.csv",
        "id,country_code",
        &["1,US"],
    );
    write_csv(
        dir.path(),
        "country_summary.csv",
        "country_code,stations",
        &["US,1", "DE,1,9"],
    );

    for mode in [SeverityMode::Strict, SeverityMode::Advisory] {
        let (result, _) = run(dir.path(), mode);
        assert!(matches!(
            result.unwrap_err(),
            GuardError::MissingColumns { .. }
        ));
    }
}

#[test]
fn test_unidentifiable_count_column() {
    let dir = dataset(&CLEAN_ROWS);
    write_csv(dir.path(), "country_summary.csv", "country_code,total", &["US,2", "DE,1"]);

    let (result, reporter) = run(dir.path(), SeverityMode::Advisory);
    assert_eq!(result.unwrap().warnings[0].kind(), RuleKind::CountColumn);
    assert_eq!(
        reporter.messages(Marker::Warning),
        vec!["country_summary.csv: expected a count column named 'stations' or 'count'"]
    );

    let (result, _) = run(dir.path(), SeverityMode::Strict);
    assert!(matches!(
        result.unwrap_err(),
        GuardError::UnidentifiableCountColumn(_)
    ));
}

#[test]
fn test_rule_violations_skip_nulls_and_unparseable_numbers() {
    let dir = dataset(&[
        "1,Alpha,Berlin,,BE,n/a,13.40,,150,fast,true",
        "2,Beta,Austin,US,TX,90.0,-180.0,2,,,false",
        "3,Gamma,Boston,US,MA,-90,180,8,350,HPC,",
    ]);
    let (result, _) = run(dir.path(), SeverityMode::Strict);
    assert!(!result.unwrap().has_warnings());
}

#[test]
fn test_layout_file_overrides_primary_candidates() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(dir.path(), "stations_2024.csv", HEADER, &CLEAN_ROWS);
    let layout_path = dir.path().join("layout.json");
    std::fs::write(
        &layout_path,
        r#"{"primary": {"table": "main stations", "names": ["stations_2024.csv"]}}"#,
    )
    .unwrap();

    let config = ValidationConfig::new(SeverityMode::Strict)
        .with_layout(DatasetLayout::from_json_file(&layout_path).unwrap());
    let mut reporter = MemoryReporter::new();
    let report = validate_dataset(dir.path(), &config, &mut reporter).unwrap();
    assert_eq!(report.table, "stations_2024.csv");
}

#[test]
fn test_report_serializes_warnings() {
    let dir = dataset(&[
        CLEAN_ROWS[0],
        "2,Beta,Austin,usa,TX,30.27,-97.74,-1,22,slow,false",
    ]);
    let (result, _) = run(dir.path(), SeverityMode::Advisory);
    let json: serde_json::Value =
        serde_json::from_str(&result.unwrap().to_json_pretty().unwrap()).unwrap();

    assert_eq!(json["table"], "charging_stations_world.csv");
    assert_eq!(json["mode"], "advisory");
    assert_eq!(json["warnings"][0]["kind"], "regex_match");
    assert_eq!(json["warnings"][0]["sample"][0], "usa");
    assert_eq!(json["warnings"][1]["kind"], "non_negative");
}
