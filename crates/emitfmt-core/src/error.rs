//! Error taxonomy for the formatting engine.
//!
//! Every failure aborts the whole call with a single `FormatError`. Output
//! already handed to the sink before the failing directive stays delivered.

use thiserror::Error;

use crate::args::{ArgSize, TypeTag};

fn as_char(byte: &u8) -> char {
    char::from(*byte)
}

/// Failure reported by a [`Sink`](crate::sink::Sink) implementation.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink rejected output")]
    Rejected,
    #[error("sink i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`FormatError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ErrorClass {
    /// Malformed directive.
    Syntax,
    /// Length modifier incompatible with the conversion.
    Type,
    /// Signature check disagreed with the expected tags.
    Signature,
    /// Length or tag-count limit exceeded.
    Capacity,
    /// Argument cursor could not supply the requested value.
    Argument,
    /// The sink failed while open.
    Sink,
}

impl ErrorClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::Syntax => "syntax",
            ErrorClass::Type => "type",
            ErrorClass::Signature => "signature",
            ErrorClass::Capacity => "capacity",
            ErrorClass::Argument => "argument",
            ErrorClass::Sink => "sink",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unknown format modifier {:?}", as_char(.0))]
    UnknownModifier(u8),
    #[error("unknown conversion character {:?}", as_char(.0))]
    UnknownConversion(u8),
    #[error("field width specified more than once")]
    DuplicateWidth,
    #[error("precision specified more than once")]
    DuplicatePrecision,
    #[error("more than one '.' in directive")]
    DuplicatePeriod,
    #[error("length modifier specified more than once")]
    DuplicateSize,
    #[error("negative '*' argument {0}")]
    NegativeStar(i64),
    #[error("width or precision exceeds {max}")]
    ValueTooLarge { max: usize },
    #[error("format string ends inside a directive")]
    Unterminated,
    #[error("length modifier {size} is not valid for %{}", as_char(.conversion))]
    IncompatibleSize { conversion: u8, size: ArgSize },
    #[error("floating-point conversions are not compiled in")]
    FloatUnsupported,
    #[error("argument {index}: expected {expected}, format implies {found}")]
    SignatureMismatch {
        index: usize,
        expected: TypeTag,
        found: TypeTag,
    },
    #[error("format implies {found} arguments, expected {expected}")]
    SignatureLength { expected: usize, found: usize },
    #[error("format implies more than {max} arguments")]
    TooManyArguments { max: usize },
    #[error("formatted length exceeds {max}")]
    LengthOverflow { max: usize },
    #[error("argument {index}: missing, wanted {wanted}")]
    MissingArgument { index: usize, wanted: TypeTag },
    #[error("argument {index}: wanted {wanted}, got {found}")]
    ArgumentMismatch {
        index: usize,
        wanted: TypeTag,
        found: TypeTag,
    },
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl FormatError {
    pub fn class(&self) -> ErrorClass {
        match self {
            FormatError::UnknownModifier(_)
            | FormatError::UnknownConversion(_)
            | FormatError::DuplicateWidth
            | FormatError::DuplicatePrecision
            | FormatError::DuplicatePeriod
            | FormatError::DuplicateSize
            | FormatError::NegativeStar(_)
            | FormatError::ValueTooLarge { .. }
            | FormatError::Unterminated => ErrorClass::Syntax,
            FormatError::IncompatibleSize { .. } | FormatError::FloatUnsupported => {
                ErrorClass::Type
            }
            FormatError::SignatureMismatch { .. } | FormatError::SignatureLength { .. } => {
                ErrorClass::Signature
            }
            FormatError::TooManyArguments { .. } | FormatError::LengthOverflow { .. } => {
                ErrorClass::Capacity
            }
            FormatError::MissingArgument { .. } | FormatError::ArgumentMismatch { .. } => {
                ErrorClass::Argument
            }
            FormatError::Sink(_) => ErrorClass::Sink,
        }
    }
}
