//! Fixture-based integration tests: load declaration snapshots from
//! `tests/fixtures/` and check them end to end, including through the
//! built `finch` binary.

use std::path::PathBuf;
use std::process::Command;

use finch::diagnostics::DiagnosticKind;
use finch::python::check::check_modules;
use finch::python::options::FinalityOptions;
use finch::snapshot;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

// ============================================================================
// Library-Level Fixture Checks
// ============================================================================

#[test]
fn final_hierarchy_fixture_reports_subclass_and_override() {
    let snapshot = snapshot::load(&fixture("final_hierarchy.json")).unwrap();
    assert_eq!(snapshot.modules.len(), 2);
    let outcome = check_modules(&snapshot.modules, &FinalityOptions::default());
    let kinds: Vec<DiagnosticKind> = outcome.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::IllegalSubclass,
            DiagnosticKind::IllegalOverride,
        ]
    );
    assert!(outcome.diagnostics[0].location.file.ends_with("custom.py"));
}

#[test]
fn reassignment_fixture_reports_one_violation_and_no_hint() {
    let snapshot = snapshot::load(&fixture("reassignment.json")).unwrap();
    let outcome = check_modules(&snapshot.modules, &FinalityOptions::default());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(
        outcome.diagnostics[0].kind,
        DiagnosticKind::IllegalReassignment
    );
    assert_eq!(outcome.diagnostics[0].location.line, 7);
    assert!(outcome.literal_hints.is_empty());
}

#[test]
fn stub_fixture_is_clean() {
    let snapshot = snapshot::load(&fixture("stub_interface.json")).unwrap();
    let outcome = check_modules(&snapshot.modules, &FinalityOptions::default());
    assert!(outcome.is_clean());
    assert_eq!(outcome.summary.final_symbols, 2);
}

#[test]
fn directory_snapshot_loads_all_fixture_files() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["reassignment.json", "stub_interface.json"] {
        std::fs::copy(fixture(name), dir.path().join(name)).unwrap();
    }
    let snapshot = snapshot::load(dir.path()).unwrap();
    assert_eq!(snapshot.modules.len(), 2);
    let outcome = check_modules(&snapshot.modules, &FinalityOptions::default());
    assert_eq!(outcome.diagnostics.len(), 1);
}

// ============================================================================
// Binary-Level Checks
// ============================================================================

#[test]
fn binary_reports_violations_as_json_with_exit_code_1() {
    let output = Command::new(env!("CARGO_BIN_EXE_finch"))
        .args(["check", fixture("reassignment.json").to_str().unwrap()])
        .args(["--format", "json"])
        .output()
        .expect("failed to run finch");
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let response: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(response["status"], "violations");
    assert_eq!(response["schema_version"], "1");
    assert_eq!(response["summary"]["violations"], 1);
    assert_eq!(
        response["diagnostics"][0]["code"],
        "illegal-reassignment"
    );
    assert!(response["snapshot_id"]
        .as_str()
        .unwrap()
        .starts_with("snap_"));
}

#[test]
fn binary_exits_zero_on_clean_stub_snapshot() {
    let output = Command::new(env!("CARGO_BIN_EXE_finch"))
        .args(["check", fixture("stub_interface.json").to_str().unwrap()])
        .args(["--format", "json"])
        .output()
        .expect("failed to run finch");
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let response: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(response["status"], "ok");
    // Stub declarations have no initializers, so no hints either.
    assert!(response.get("literal_hints").is_none());
}

#[test]
fn binary_reports_missing_snapshot_with_exit_code_3() {
    let output = Command::new(env!("CARGO_BIN_EXE_finch"))
        .args(["check", "does-not-exist.json"])
        .output()
        .expect("failed to run finch");
    assert_eq!(output.status.code(), Some(3));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let response: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(response["status"], "error");
    assert_eq!(response["error"]["code"], 3);
    assert_eq!(response["error"]["kind"], "snapshot-not-found");
}

#[test]
fn binary_text_format_prints_sorted_diagnostic_lines() {
    let output = Command::new(env!("CARGO_BIN_EXE_finch"))
        .args(["check", fixture("final_hierarchy.json").to_str().unwrap()])
        .output()
        .expect("failed to run finch");
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("illegal-subclass"));
    assert!(lines[0].contains("cannot inherit from final class `Registry`"));
    assert!(lines[1].contains("illegal-override"));
}
