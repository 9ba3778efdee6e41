// structured_log_test.rs
// Logged fixture runs must produce JSONL that passes schema validation.

use emitfmt_harness::structured_log::{
    LogEmitter, LogLevel, validate_log_file, validate_log_line,
};
use emitfmt_harness::{FixtureSet, TestRunner};

const SMOKE: &str = r#"{
  "version": "v1",
  "family": "smoke",
  "captured_at": "2026-01-01T00:00:00Z",
  "cases": [
    {"name": "ok", "format": "%5d", "args": [{"int": 42}], "expected_output": "   42"},
    {"name": "bad", "format": "%x", "args": [{"int": 255}], "expected_output": "FF"},
    {"name": "err", "format": "%k", "expected_error": "syntax"}
  ]
}"#;

fn temp_log(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("emitfmt-{}-{}.jsonl", name, std::process::id()))
}

#[test]
fn logged_run_produces_valid_jsonl() {
    let path = temp_log("logged-run");
    let set = FixtureSet::from_json(SMOKE).unwrap();

    let mut emitter = LogEmitter::to_file(&path, "smoke", "run-7").unwrap();
    let summary = TestRunner::new("smoke")
        .run_logged(&set, &mut emitter)
        .unwrap();
    drop(emitter);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.failed, 1);

    let report = validate_log_file(&path).unwrap();
    // run_start + one per case + run_summary
    assert_eq!(report.lines, 5);
    assert!(report.is_clean(), "{:?}", report.errors);

    let content = std::fs::read_to_string(&path).unwrap();
    let entries: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(entries[0]["event"], "run_start");
    assert_eq!(entries[4]["event"], "run_summary");
    assert_eq!(entries[4]["level"], "error");
    for (i, entry) in entries.iter().enumerate() {
        let trace = entry["trace_id"].as_str().unwrap();
        assert_eq!(trace, format!("smoke::run-7::{:03}", i + 1));
    }
    assert_eq!(entries[2]["outcome"], "fail");
    assert_eq!(entries[2]["details"]["mismatches"], serde_json::json!(["output"]));
    assert_eq!(entries[3]["error_class"], "syntax");
    assert_eq!(entries[4]["details"]["engine_errors"], 1);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn emitted_lines_validate_individually() {
    let path = temp_log("emit");
    let mut emitter = LogEmitter::to_file(&path, "unit", "r1").unwrap();
    let entry = emitter.emit(LogLevel::Info, "hello").unwrap();
    emitter.flush().unwrap();
    assert_eq!(entry.trace_id, "unit::r1::001");

    let content = std::fs::read_to_string(&path).unwrap();
    let line = content.lines().next().unwrap();
    let parsed = validate_log_line(line, 1).unwrap();
    assert_eq!(parsed.event, "hello");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn malformed_lines_are_rejected() {
    assert!(validate_log_line("not json", 1).is_err());
    let errors = validate_log_line(
        r#"{"timestamp":"2026-01-01T00:00:00Z","trace_id":"a::b","level":"loud","event":"x"}"#,
        3,
    )
    .unwrap_err();
    let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
    assert!(fields.contains(&"level"));
    assert!(fields.contains(&"trace_id"));
    assert!(errors.iter().all(|e| e.line_number == 3));
}
