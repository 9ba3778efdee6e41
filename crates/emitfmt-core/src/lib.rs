//! # emitfmt-core
//!
//! A printf-style formatting engine that writes through a pluggable
//! [`Sink`]. Arguments are an explicit slice of [`Arg`] values rather than
//! a native variadic list, and the same directive parser drives both
//! rendering and signature extraction.
//!
//! ```
//! use emitfmt_core::{Arg, TypeTag, extract_signature, render_to_vec};
//!
//! let out = render_to_vec("%-6s|%5.1f", &[Arg::Str(b"temp"), Arg::Double(21.5)]).unwrap();
//! assert_eq!(out, b"temp  | 21.5");
//!
//! let sig = extract_signature("%-6s|%5.1f", 4).unwrap();
//! assert_eq!(sig, [TypeTag::STRING, TypeTag::DOUBLE]);
//! ```

#![deny(unsafe_code)]

pub mod args;
pub mod error;
pub mod format;
pub mod sink;

pub use args::{Arg, ArgCursor, ArgKind, ArgSize, TypeTag};
pub use error::{ErrorClass, FormatError, SinkError};
pub use format::float::{DEFAULT_PRECISION, MAX_DECIMAL_EXPONENT};
pub use format::{
    FormatParams, MAX_LENGTH, check_signature, extract_signature, extract_signature_into, measure,
    render, render_to_vec,
};
pub use sink::{BufferSink, NullSink, Sink, SinkState, StringSink, WriteSink};
