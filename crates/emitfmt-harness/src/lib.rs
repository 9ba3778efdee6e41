//! Conformance harness for the emitfmt engine.
//!
//! This crate provides:
//! - Fixtures: JSON golden cases (format, arguments, expected bytes, length,
//!   error class, signature)
//! - Runner: executes a fixture set against the engine and compares results
//! - Structured logging: JSONL records for every verified case

#![forbid(unsafe_code)]

pub mod diff;
pub mod error;
pub mod fixtures;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureArg, FixtureCase, FixtureSet};
pub use runner::TestRunner;
pub use verify::{Mismatch, VerificationResult, VerificationSummary};
