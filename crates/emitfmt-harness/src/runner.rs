//! Test execution engine.

use emitfmt_core::{
    ArgCursor, BufferSink, ErrorClass, FormatError, StringSink, TypeTag, extract_signature,
    render,
};

use crate::diff::render_diff;
use crate::error::HarnessError;
use crate::fixtures::{FixtureCase, FixtureSet, parse_tags};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel};
use crate::verify::{Mismatch, VerificationResult, VerificationSummary};

/// Upper bound on tags extracted when a case declares a signature.
const SIGNATURE_LIMIT: usize = 64;

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set.cases.iter().map(verify_case).collect()
    }

    /// Run a fixture set, logging one line per case plus a summary line.
    pub fn run_logged(
        &self,
        fixture_set: &FixtureSet,
        emitter: &mut LogEmitter,
    ) -> Result<VerificationSummary, HarnessError> {
        emitter.emit_entry(
            LogEntry::new(String::new(), LogLevel::Info, "run_start").with_details(
                serde_json::json!({
                    "family": fixture_set.family,
                    "version": fixture_set.version,
                    "cases": fixture_set.cases.len(),
                }),
            ),
        )?;

        let results = self.run(fixture_set);
        for result in &results {
            emitter.emit_entry(LogEntry::for_result(result).with_campaign(&self.campaign))?;
        }

        let summary = VerificationSummary::from_results(results);
        let level = if summary.all_passed() {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        emitter.emit_entry(LogEntry::new(String::new(), level, "run_summary").with_details(
            serde_json::json!({
                "total": summary.total,
                "passed": summary.passed,
                "failed": summary.failed,
                "engine_errors": summary.engine_errors,
            }),
        ))?;
        emitter.flush()?;
        Ok(summary)
    }
}

struct CaseRun {
    output: Vec<u8>,
    outcome: Result<usize, FormatError>,
}

fn execute_case(case: &FixtureCase) -> CaseRun {
    let args = case.engine_args();
    let mut cursor = ArgCursor::new(&args);
    match case.capacity {
        Some(capacity) => {
            let mut storage = vec![0u8; capacity];
            let mut sink = BufferSink::new(&mut storage);
            let outcome = render(&mut sink, &case.format, &mut cursor);
            CaseRun {
                output: sink.written().to_vec(),
                outcome,
            }
        }
        None => {
            let mut sink = StringSink::new();
            let outcome = render(&mut sink, &case.format, &mut cursor);
            CaseRun {
                output: sink.into_bytes(),
                outcome,
            }
        }
    }
}

fn describe_error(class: ErrorClass) -> String {
    format!("error:{class}")
}

fn check_signature_tags(case: &FixtureCase, names: &[String]) -> Option<String> {
    let expected = match parse_tags(names) {
        Ok(tags) => tags,
        Err(err) => return Some(format!("signature: {err}")),
    };
    match extract_signature(&case.format, SIGNATURE_LIMIT) {
        Ok(actual) if actual == expected => None,
        Ok(actual) => Some(format!(
            "signature: expected [{}], extracted [{}]",
            join_tags(&expected),
            join_tags(&actual)
        )),
        Err(err) => Some(format!("signature: extraction failed: {err}")),
    }
}

fn join_tags(tags: &[TypeTag]) -> String {
    tags.iter()
        .map(|tag| tag.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Execute one case and compare it against its expectations.
pub fn verify_case(case: &FixtureCase) -> VerificationResult {
    let run = execute_case(case);
    let actual_output = String::from_utf8_lossy(&run.output).into_owned();
    let mut notes = Vec::new();
    let mut mismatches = Vec::new();

    let (actual, length, error_class) = match &run.outcome {
        Ok(len) => (actual_output, Some(*len), None),
        Err(err) => (describe_error(err.class()), None, Some(err.class())),
    };

    let expected = match (case.expected_error, &case.expected_output) {
        (Some(class), _) => describe_error(class),
        (None, Some(out)) => out.clone(),
        // Nothing to compare text against; only the other checks apply.
        (None, None) if error_class.is_none() => actual.clone(),
        (None, None) => String::from("success"),
    };
    if expected != actual {
        mismatches.push(Mismatch::Output);
        notes.push(render_diff(&expected, &actual));
    }

    if let (Some(want), Some(got)) = (case.expected_length, length)
        && want != got
    {
        mismatches.push(Mismatch::Length);
        notes.push(format!("length: expected {want}, reported {got}"));
    }

    if let Some(names) = &case.signature
        && let Some(note) = check_signature_tags(case, names)
    {
        mismatches.push(Mismatch::Signature);
        notes.push(note);
    }

    VerificationResult {
        case_name: case.name.clone(),
        format: case.format.clone(),
        passed: mismatches.is_empty(),
        expected,
        actual,
        length,
        error_class,
        mismatches,
        diff: (!notes.is_empty()).then(|| notes.join("\n")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(cases: &str) -> FixtureSet {
        FixtureSet::from_json(&format!(
            r#"{{"version":"v1","family":"smoke","captured_at":"2026-01-01T00:00:00Z","cases":[{cases}]}}"#
        ))
        .expect("valid fixture json")
    }

    #[test]
    fn passing_render_case() {
        let set = fixture(
            r#"{"name":"width","format":"%5d","args":[{"int":42}],"expected_output":"   42","expected_length":5}"#,
        );
        let results = TestRunner::new("smoke").run(&set);
        assert_eq!(results.len(), 1);
        assert!(results[0].passed, "{:?}", results[0].diff);
        assert_eq!(results[0].length, Some(5));
    }

    #[test]
    fn wrong_output_produces_diff() {
        let set = fixture(
            r#"{"name":"bad","format":"%d","args":[{"int":42}],"expected_output":"43"}"#,
        );
        let results = TestRunner::new("smoke").run(&set);
        assert!(!results[0].passed);
        assert_eq!(results[0].mismatches, [Mismatch::Output]);
        assert!(results[0].diff.as_deref().unwrap().contains("-\"43\""));
    }

    #[test]
    fn expected_error_class_matches() {
        let set = fixture(r#"{"name":"unknown","format":"%k","expected_error":"syntax"}"#);
        let results = TestRunner::new("smoke").run(&set);
        assert!(results[0].passed);
        assert_eq!(results[0].error_class, Some(ErrorClass::Syntax));
        assert_eq!(results[0].actual, "error:syntax");
    }

    #[test]
    fn unexpected_error_fails() {
        let set = fixture(r#"{"name":"missing","format":"%d","expected_output":"1"}"#);
        let results = TestRunner::new("smoke").run(&set);
        assert!(!results[0].passed);
        assert_eq!(results[0].error_class, Some(ErrorClass::Argument));
    }

    #[test]
    fn capacity_case_checks_truncated_output_and_full_length() {
        let set = fixture(
            r#"{"name":"trunc","format":"%s!","args":[{"str":"hello"}],"capacity":3,"expected_output":"hel","expected_length":6}"#,
        );
        let results = TestRunner::new("smoke").run(&set);
        assert!(results[0].passed, "{:?}", results[0].diff);
    }

    #[test]
    fn signature_expectation() {
        let set = fixture(
            r#"{"name":"sig","format":"%*d %s","args":[{"int":3},{"int":1},{"str":"x"}],"signature":["int","int","string"]},
               {"name":"sig_bad","format":"%d","args":[{"int":1}],"signature":["string"]}"#,
        );
        let results = TestRunner::new("smoke").run(&set);
        assert!(results[0].passed, "{:?}", results[0].diff);
        assert!(!results[1].passed);
        assert_eq!(results[1].mismatches, [Mismatch::Signature]);
        assert!(results[1].diff.as_deref().unwrap().contains("signature"));
    }

    #[test]
    fn logged_run_summarizes() {
        let set = fixture(
            r#"{"name":"ok","format":"x","expected_output":"x"},{"name":"ko","format":"y","expected_output":"z"}"#,
        );
        let mut emitter = LogEmitter::to_buffer("smoke", "run-1");
        let summary = TestRunner::new("smoke")
            .run_logged(&set, &mut emitter)
            .unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert!(!summary.all_passed());
        assert_eq!(summary.failures().count(), 1);
    }
}
