//! Per-case verdicts and their roll-up.

use emitfmt_core::ErrorClass;
use serde::{Deserialize, Serialize};

/// Which expectation of a case the engine did not meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mismatch {
    /// Rendered bytes, or the error class, differ.
    Output,
    /// The returned total length differs.
    Length,
    /// The extracted type tags differ.
    Signature,
}

/// Verdict for one fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub case_name: String,
    pub format: String,
    pub passed: bool,
    /// Expected bytes, or `error:<class>`.
    pub expected: String,
    /// What the engine produced, in the same form as `expected`.
    pub actual: String,
    /// Length returned on success.
    pub length: Option<usize>,
    /// Class of the error returned on failure.
    pub error_class: Option<ErrorClass>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<Mismatch>,
    /// Human-readable account of every mismatch.
    pub diff: Option<String>,
}

/// Counts over a run, with the verdicts kept for reporting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Cases where the engine returned an error, expected or not.
    pub engine_errors: usize,
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let mut summary = Self::default();
        for result in &results {
            summary.total += 1;
            if result.passed {
                summary.passed += 1;
            } else {
                summary.failed += 1;
            }
            if result.error_class.is_some() {
                summary.engine_errors += 1;
            }
        }
        summary.results = results;
        summary
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// Number of failed cases that missed the given expectation.
    #[must_use]
    pub fn count_mismatch(&self, kind: Mismatch) -> usize {
        self.failures()
            .filter(|r| r.mismatches.contains(&kind))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(name: &str, mismatches: &[Mismatch], error_class: Option<ErrorClass>) -> VerificationResult {
        VerificationResult {
            case_name: name.to_string(),
            format: "%d".to_string(),
            passed: mismatches.is_empty(),
            expected: String::new(),
            actual: String::new(),
            length: None,
            error_class,
            mismatches: mismatches.to_vec(),
            diff: None,
        }
    }

    #[test]
    fn summary_counts() {
        let summary = VerificationSummary::from_results(vec![
            verdict("a", &[], None),
            verdict("b", &[], Some(ErrorClass::Syntax)),
            verdict("c", &[Mismatch::Output, Mismatch::Length], None),
            verdict("d", &[Mismatch::Length], Some(ErrorClass::Argument)),
        ]);
        assert_eq!((summary.total, summary.passed, summary.failed), (4, 2, 2));
        assert_eq!(summary.engine_errors, 2);
        assert_eq!(summary.count_mismatch(Mismatch::Length), 2);
        assert_eq!(summary.count_mismatch(Mismatch::Signature), 0);
        let names: Vec<&str> = summary.failures().map(|r| r.case_name.as_str()).collect();
        assert_eq!(names, ["c", "d"]);
    }

    #[test]
    fn empty_run_passes() {
        let summary = VerificationSummary::from_results(Vec::new());
        assert!(summary.all_passed());
        assert_eq!(summary.total, 0);
    }

    #[test]
    fn passing_verdict_omits_mismatches() {
        let json = serde_json::to_value(verdict("a", &[], None)).unwrap();
        assert!(json.get("mismatches").is_none());
        let json = serde_json::to_value(verdict("b", &[Mismatch::Signature], None)).unwrap();
        assert_eq!(json["mismatches"], serde_json::json!(["signature"]));
    }
}
