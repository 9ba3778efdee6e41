//! Harness error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid argument '{0}': expected <kind>:<value>")]
    InvalidArg(String),
    #[error("unknown type tag '{0}'")]
    UnknownTag(String),
}
