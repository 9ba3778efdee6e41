//! Format-string engine: directive parsing, the conversion registry, the
//! converters and the two drivers (rendering and signature extraction).

pub mod directive;
pub mod float;
pub mod integer;
pub mod registry;
pub mod render;
pub mod signature;
pub(crate) mod text;

pub use directive::{FormatFlags, FormatParams, StarSource, parse_directive};
pub use float::{DecimalExponent, find_decimal_exponent};
pub use integer::radix_digits;
pub use registry::{Conversion, SizeRule, conversions, lookup};
pub use render::{MAX_LENGTH, measure, render, render_to_vec};
pub use signature::{check_signature, extract_signature, extract_signature_into};
