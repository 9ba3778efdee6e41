//! JSONL records for fixture runs.
//!
//! One [`LogEntry`] per line. Every line carries a timestamp, a trace id of
//! the form `<campaign>::<run>::<seq>`, a level and an event name; case lines
//! add the case name, the format string, the outcome and what the engine
//! reported. [`validate_log_line`] and [`validate_log_file`] check files
//! written by other tools against the same schema.

use std::io::Write;
use std::path::Path;

use emitfmt_core::ErrorClass;
use serde::{Deserialize, Serialize};

use crate::verify::VerificationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Verdict recorded on a case line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
    Error,
}

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const OUTCOMES: [&str; 4] = ["pass", "fail", "skip", "error"];
const ERROR_CLASSES: [&str; 6] = ["syntax", "type", "signature", "capacity", "argument", "sink"];
const REQUIRED: [&str; 4] = ["timestamp", "trace_id", "level", "event"];

/// A single log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    /// Fixture case name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<String>,
    /// Format string under test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// Class of the error the engine returned, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_class: Option<ErrorClass>,
    /// Total length the engine reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_length: Option<usize>,
    /// Expected/actual/diff for failed cases; counters for summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Entry stamped with the current time and no optional fields. An empty
    /// `trace_id` is filled in by [`LogEmitter::emit_entry`].
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: utc_timestamp(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            campaign: None,
            case: None,
            format: None,
            outcome: None,
            error_class: None,
            field_length: None,
            details: None,
        }
    }

    /// The `case_verified` line for one verdict.
    #[must_use]
    pub fn for_result(result: &VerificationResult) -> Self {
        let (level, outcome) = match result.passed {
            true => (LogLevel::Info, Outcome::Pass),
            false => (LogLevel::Error, Outcome::Fail),
        };
        let mut entry = Self::new(String::new(), level, "case_verified")
            .with_case(&result.case_name, &result.format)
            .with_outcome(outcome);
        entry.error_class = result.error_class;
        entry.field_length = result.length;
        if !result.passed {
            entry.details = Some(serde_json::json!({
                "expected": result.expected,
                "actual": result.actual,
                "mismatches": result.mismatches,
                "diff": result.diff,
            }));
        }
        entry
    }

    #[must_use]
    pub fn with_campaign(mut self, campaign: impl Into<String>) -> Self {
        self.campaign = Some(campaign.into());
        self
    }

    #[must_use]
    pub fn with_case(mut self, case: impl Into<String>, format: impl Into<String>) -> Self {
        self.case = Some(case.into());
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_error_class(mut self, class: ErrorClass) -> Self {
        self.error_class = Some(class);
        self
    }

    #[must_use]
    pub fn with_field_length(mut self, length: usize) -> Self {
        self.field_length = Some(length);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The entry as one JSON line, without the newline.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Appends [`LogEntry`] lines to a writer, numbering them per run.
pub struct LogEmitter {
    out: Box<dyn Write>,
    campaign: String,
    trace_prefix: String,
    seq: u64,
}

impl LogEmitter {
    /// Buffered emitter over a newly created (or truncated) file.
    pub fn to_file(path: &Path, campaign: &str, run_id: &str) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::to_writer(std::io::BufWriter::new(file), campaign, run_id))
    }

    #[must_use]
    pub fn to_stdout(campaign: &str, run_id: &str) -> Self {
        Self::to_writer(std::io::stdout(), campaign, run_id)
    }

    #[must_use]
    pub fn to_writer(writer: impl Write + 'static, campaign: &str, run_id: &str) -> Self {
        Self {
            out: Box::new(writer),
            campaign: campaign.to_string(),
            trace_prefix: format!("{campaign}::{run_id}"),
            seq: 0,
        }
    }

    /// Emitter whose output is kept in memory and never read back.
    #[must_use]
    pub fn to_buffer(campaign: &str, run_id: &str) -> Self {
        Self::to_writer(Vec::new(), campaign, run_id)
    }

    /// Number of lines written so far.
    pub fn lines_written(&self) -> u64 {
        self.seq
    }

    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("{}::{:03}", self.trace_prefix, self.seq)
    }

    /// Write a bare `event` line and return it.
    pub fn emit(&mut self, level: LogLevel, event: &str) -> std::io::Result<LogEntry> {
        let entry = LogEntry::new(self.next_trace_id(), level, event).with_campaign(&self.campaign);
        self.write_line(&entry)?;
        Ok(entry)
    }

    /// Write `entry`, assigning the next trace id when it has none and the
    /// emitter's campaign when it names none.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        if entry.campaign.is_none() {
            entry.campaign = Some(self.campaign.clone());
        }
        self.write_line(&entry)
    }

    fn write_line(&mut self, entry: &LogEntry) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.out, entry).map_err(std::io::Error::other)?;
        self.out.write_all(b"\n")
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }
}

/// What is wrong with a field of a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The line is not JSON at all.
    NotJson(String),
    /// The line is JSON but not an object.
    NotObject,
    Missing,
    /// Value outside the allowed set.
    Unknown(String),
    /// `trace_id` is not `<campaign>::<run>::<seq>`.
    TraceShape(String),
    /// A failed case carries no `details` object.
    NoDetails,
    /// Fields are present but have the wrong JSON types.
    Shape(String),
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::NotJson(e) => write!(f, "invalid JSON: {e}"),
            Violation::NotObject => f.write_str("expected a JSON object"),
            Violation::Missing => f.write_str("required field missing"),
            Violation::Unknown(value) => write!(f, "unknown value '{value}'"),
            Violation::TraceShape(id) => {
                write!(f, "expected <campaign>::<run>::<seq>, got '{id}'")
            }
            Violation::NoDetails => f.write_str("failed cases must include a details object"),
            Violation::Shape(e) => write!(f, "wrong field types: {e}"),
        }
    }
}

/// One schema problem on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogValidationError {
    pub line_number: usize,
    /// Offending field, or `<line>` when the line as a whole is bad.
    pub field: &'static str,
    pub violation: Violation,
}

impl std::fmt::Display for LogValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {} ({}): {}", self.line_number, self.field, self.violation)
    }
}

type JsonObject = serde_json::Map<String, serde_json::Value>;

struct LineCheck {
    line_number: usize,
    errors: Vec<LogValidationError>,
}

impl LineCheck {
    fn flag(&mut self, field: &'static str, violation: Violation) {
        self.errors.push(LogValidationError {
            line_number: self.line_number,
            field,
            violation,
        });
    }

    fn one_of(&mut self, obj: &JsonObject, field: &'static str, allowed: &[&str]) {
        if let Some(value) = obj.get(field).and_then(serde_json::Value::as_str)
            && !allowed.contains(&value)
        {
            self.flag(field, Violation::Unknown(value.to_string()));
        }
    }
}

/// Check one line against the schema and parse it.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let mut check = LineCheck {
        line_number,
        errors: Vec::new(),
    };

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            check.flag("<line>", Violation::NotJson(e.to_string()));
            return Err(check.errors);
        }
    };
    let Some(obj) = value.as_object() else {
        check.flag("<line>", Violation::NotObject);
        return Err(check.errors);
    };

    for field in REQUIRED {
        if !obj.contains_key(field) {
            check.flag(field, Violation::Missing);
        }
    }
    check.one_of(obj, "level", &LEVELS);
    check.one_of(obj, "outcome", &OUTCOMES);
    check.one_of(obj, "error_class", &ERROR_CLASSES);

    if obj.get("outcome").and_then(serde_json::Value::as_str) == Some("fail")
        && !obj.get("details").is_some_and(serde_json::Value::is_object)
    {
        check.flag("details", Violation::NoDetails);
    }
    if let Some(id) = obj.get("trace_id").and_then(serde_json::Value::as_str)
        && id.split("::").count() != 3
    {
        check.flag("trace_id", Violation::TraceShape(id.to_string()));
    }

    if !check.errors.is_empty() {
        return Err(check.errors);
    }
    serde_json::from_value(value).map_err(|e| {
        check.flag("<line>", Violation::Shape(e.to_string()));
        check.errors
    })
}

/// Result of validating a whole JSONL file.
#[derive(Debug, Default)]
pub struct LogFileReport {
    /// Non-blank lines seen.
    pub lines: usize,
    pub errors: Vec<LogValidationError>,
}

impl LogFileReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate every non-blank line of a JSONL file.
pub fn validate_log_file(path: &Path) -> std::io::Result<LogFileReport> {
    let content = std::fs::read_to_string(path)?;
    let mut report = LogFileReport::default();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        report.lines += 1;
        if let Err(errors) = validate_log_line(line, index + 1) {
            report.errors.extend(errors);
        }
    }
    Ok(report)
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
fn utc_timestamp() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let (days, secs_of_day) = (now.as_secs() / 86_400, now.as_secs() % 86_400);
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
        secs_of_day / 3600,
        secs_of_day / 60 % 60,
        secs_of_day % 60,
        now.subsec_millis(),
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(entry: &LogEntry) -> serde_json::Value {
        serde_json::from_str(&entry.to_jsonl().unwrap()).unwrap()
    }

    #[test]
    fn bare_entry_omits_optional_fields() {
        let entry = LogEntry::new("fmt::r1::001", LogLevel::Info, "run_start");
        let v = parse(&entry);
        assert_eq!(v["trace_id"], "fmt::r1::001");
        assert_eq!(v["level"], "info");
        assert!(v["timestamp"].as_str().unwrap().ends_with('Z'));
        for absent in ["case", "format", "outcome", "error_class", "field_length"] {
            assert!(v.get(absent).is_none(), "{absent} should be omitted");
        }
    }

    #[test]
    fn case_entry_carries_engine_report() {
        let entry = LogEntry::new("fmt::r1::002", LogLevel::Error, "case_verified")
            .with_case("bad_hex", "%#x")
            .with_outcome(Outcome::Fail)
            .with_error_class(ErrorClass::Type)
            .with_field_length(4)
            .with_details(serde_json::json!({"expected": "0xff"}));
        let v = parse(&entry);
        assert_eq!(v["case"], "bad_hex");
        assert_eq!(v["format"], "%#x");
        assert_eq!(v["outcome"], "fail");
        assert_eq!(v["error_class"], "type");
        assert_eq!(v["field_length"], 4);
        assert!(validate_log_line(&entry.to_jsonl().unwrap(), 1).is_ok());
    }

    #[test]
    fn unknown_enum_values_are_flagged() {
        let json = r#"{"timestamp":"t","trace_id":"a::b::c","level":"loud","event":"x","error_class":"bogus"}"#;
        let errors = validate_log_line(json, 3).unwrap_err();
        assert!(errors.contains(&LogValidationError {
            line_number: 3,
            field: "level",
            violation: Violation::Unknown("loud".into()),
        }));
        assert!(errors.iter().any(|e| e.field == "error_class"));
    }

    #[test]
    fn failed_case_needs_details() {
        let json = r#"{"timestamp":"t","trace_id":"a::b::c","level":"error","event":"x","outcome":"fail"}"#;
        let errors = validate_log_line(json, 1).unwrap_err();
        assert_eq!(errors[0].violation, Violation::NoDetails);
    }

    #[test]
    fn structural_problems() {
        let missing = validate_log_line(r#"{"level":"info","event":"x"}"#, 1).unwrap_err();
        let fields: Vec<&str> = missing.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["timestamp", "trace_id"]);

        let err = validate_log_line("[1,2]", 2).unwrap_err();
        assert_eq!(err[0].violation, Violation::NotObject);
        let err = validate_log_line("{", 2).unwrap_err();
        assert!(matches!(err[0].violation, Violation::NotJson(_)));

        let err =
            validate_log_line(r#"{"timestamp":"t","trace_id":"x","level":"info","event":"e"}"#, 4)
                .unwrap_err();
        assert_eq!(err[0].violation, Violation::TraceShape("x".into()));
        assert_eq!(
            err[0].to_string(),
            "line 4 (trace_id): expected <campaign>::<run>::<seq>, got 'x'"
        );
    }

    #[test]
    fn emitter_numbers_lines_per_run() {
        let mut emitter = LogEmitter::to_buffer("fmt", "run-42");
        let first = emitter.emit(LogLevel::Info, "start").unwrap();
        emitter
            .emit_entry(LogEntry::new(String::new(), LogLevel::Debug, "case_verified"))
            .unwrap();
        let third = emitter.emit(LogLevel::Info, "end").unwrap();
        assert_eq!(first.trace_id, "fmt::run-42::001");
        assert_eq!(third.trace_id, "fmt::run-42::003");
        assert_eq!(first.campaign.as_deref(), Some("fmt"));
        assert_eq!(emitter.lines_written(), 3);
    }

    #[test]
    fn civil_dates() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(59), (1970, 3, 1));
        assert_eq!(civil_from_days(19_723), (2024, 1, 1));
        assert_eq!(civil_from_days(19_782), (2024, 2, 29));
    }
}
