//! Fixture loading and management.

use std::str::FromStr;

use emitfmt_core::{Arg, ErrorClass, TypeTag};
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// Non-finite floating values, which JSON cannot carry as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialFloat {
    Nan,
    Inf,
    NegInf,
}

impl SpecialFloat {
    pub fn value(self) -> f64 {
        match self {
            SpecialFloat::Nan => f64::NAN,
            SpecialFloat::Inf => f64::INFINITY,
            SpecialFloat::NegInf => f64::NEG_INFINITY,
        }
    }
}

/// Serialized form of one engine argument, e.g. `{"int": 42}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureArg {
    Int(i32),
    Half(i16),
    Long(i64),
    LongLong(i64),
    Double(f64),
    LongDouble(f64),
    Special(SpecialFloat),
    Str(String),
    Ptr(usize),
}

impl FixtureArg {
    /// Borrow as an engine argument.
    pub fn to_arg(&self) -> Arg<'_> {
        match self {
            FixtureArg::Int(v) => Arg::Int(*v),
            FixtureArg::Half(v) => Arg::Half(*v),
            FixtureArg::Long(v) => Arg::Long(*v),
            FixtureArg::LongLong(v) => Arg::LongLong(*v),
            FixtureArg::Double(v) => Arg::Double(*v),
            FixtureArg::LongDouble(v) => Arg::LongDouble(*v),
            FixtureArg::Special(s) => Arg::Double(s.value()),
            FixtureArg::Str(s) => Arg::Str(s.as_bytes()),
            FixtureArg::Ptr(p) => Arg::Ptr(*p),
        }
    }
}

fn parse_value<T: FromStr>(input: &str, value: &str) -> Result<T, HarnessError> {
    value
        .parse()
        .map_err(|_| HarnessError::InvalidArg(input.to_string()))
}

/// Parses the CLI spelling `<kind>:<value>`, e.g. `int:-3`, `str:hello`,
/// `double:nan`, `ptr:0x1000`.
impl FromStr for FixtureArg {
    type Err = HarnessError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (kind, value) = input
            .split_once(':')
            .ok_or_else(|| HarnessError::InvalidArg(input.to_string()))?;
        let arg = match kind {
            "int" | "i" => FixtureArg::Int(parse_value(input, value)?),
            "half" | "h" => FixtureArg::Half(parse_value(input, value)?),
            "long" | "l" => FixtureArg::Long(parse_value(input, value)?),
            "long_long" | "ll" => FixtureArg::LongLong(parse_value(input, value)?),
            "double" | "f" | "long_double" | "L" => {
                let special = match value {
                    "nan" | "NaN" => Some(SpecialFloat::Nan),
                    "inf" => Some(SpecialFloat::Inf),
                    "-inf" => Some(SpecialFloat::NegInf),
                    _ => None,
                };
                match (special, kind) {
                    (Some(s), _) => FixtureArg::Special(s),
                    (None, "long_double" | "L") => FixtureArg::LongDouble(parse_value(input, value)?),
                    (None, _) => FixtureArg::Double(parse_value(input, value)?),
                }
            }
            "str" | "s" => FixtureArg::Str(value.to_string()),
            "ptr" | "p" => {
                let addr = match value.strip_prefix("0x") {
                    Some(hex) => usize::from_str_radix(hex, 16)
                        .map_err(|_| HarnessError::InvalidArg(input.to_string()))?,
                    None => parse_value(input, value)?,
                };
                FixtureArg::Ptr(addr)
            }
            _ => return Err(HarnessError::InvalidArg(input.to_string())),
        };
        Ok(arg)
    }
}

/// Parse a list of tag names (`int`, `string`, `long double`, ...).
pub fn parse_tags<S: AsRef<str>>(names: &[S]) -> Result<Vec<TypeTag>, HarnessError> {
    names
        .iter()
        .map(|name| {
            TypeTag::from_name(name.as_ref())
                .ok_or_else(|| HarnessError::UnknownTag(name.as_ref().to_string()))
        })
        .collect()
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Format string under test.
    pub format: String,
    #[serde(default)]
    pub args: Vec<FixtureArg>,
    /// Bytes the sink should hold afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    /// Length the call should report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_length: Option<usize>,
    /// Error class the call should fail with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_error: Option<ErrorClass>,
    /// Render into a fixed buffer of this many bytes instead of a growable one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    /// Expected type tags, by name, in consumption order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Vec<String>>,
}

impl FixtureCase {
    pub fn engine_args(&self) -> Vec<Arg<'_>> {
        self.args.iter().map(FixtureArg::to_arg).collect()
    }
}

/// A collection of fixture cases for one conversion family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Conversion family name.
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &std::path::Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}
