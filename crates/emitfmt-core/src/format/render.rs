//! Render loop: walks the format string, copies literal runs, dispatches
//! directives to their converters and accumulates the total length.

use crate::args::{Arg, ArgCursor};
use crate::error::FormatError;
use crate::format::directive::parse_directive;
use crate::format::registry;
use crate::sink::{NullSink, Output, Sink, StringSink};

/// Largest total length a single call may report.
pub const MAX_LENGTH: usize = i32::MAX as usize;

fn add_length(total: usize, n: usize) -> Result<usize, FormatError> {
    total
        .checked_add(n)
        .filter(|t| *t <= MAX_LENGTH)
        .ok_or(FormatError::LengthOverflow { max: MAX_LENGTH })
}

/// Render `fmt` into `sink`, consuming arguments from `args`.
///
/// Returns the length the output would have on an unbounded sink, even if
/// `sink` closes part-way. On error, whatever was emitted before the
/// failing directive stays in the sink.
pub fn render(
    sink: &mut dyn Sink,
    fmt: impl AsRef<[u8]>,
    args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    let fmt = fmt.as_ref();
    let mut out = Output::new(sink);
    let mut total = 0;
    let mut pos = 0;

    while pos < fmt.len() {
        let rest = &fmt[pos..];
        let literal = rest.iter().position(|&b| b == b'%').unwrap_or(rest.len());
        if literal > 0 {
            out.raw(&rest[..literal])?;
            total = add_length(total, literal)?;
            pos += literal;
            continue;
        }

        // rest[0] == '%'
        if rest.get(1) == Some(&b'%') {
            out.char(b'%')?;
            total = add_length(total, 1)?;
            pos += 2;
            continue;
        }

        let (params, consumed) = parse_directive(&rest[1..], args)?;
        let conversion = registry::lookup(params.conversion)
            .ok_or(FormatError::UnknownConversion(params.conversion))?;
        conversion.type_tag(params.size)?;
        let field = conversion.convert(&mut out, &params, args)?;
        total = add_length(total, field)?;
        pos += 1 + consumed;
    }
    Ok(total)
}

/// Render into a fresh byte vector.
pub fn render_to_vec(fmt: impl AsRef<[u8]>, args: &[Arg<'_>]) -> Result<Vec<u8>, FormatError> {
    let mut sink = StringSink::new();
    render(&mut sink, fmt, &mut ArgCursor::new(args))?;
    Ok(sink.into_bytes())
}

/// Compute the formatted length without emitting anything.
pub fn measure(fmt: impl AsRef<[u8]>, args: &[Arg<'_>]) -> Result<usize, FormatError> {
    render(&mut NullSink, fmt, &mut ArgCursor::new(args))
}

/// Render a format string with inline arguments.
///
/// Each argument goes through [`Arg::from`](crate::Arg), so plain Rust
/// integers, floats, strings and raw pointers can be passed directly.
///
/// ```
/// use emitfmt_core::{emit_format, StringSink};
///
/// let mut sink = StringSink::new();
/// let len = emit_format!(&mut sink, "%-5s|%04d", "ab", 42).unwrap();
/// assert_eq!(sink.as_bytes(), b"ab   |0042");
/// assert_eq!(len, 10);
/// ```
#[macro_export]
macro_rules! emit_format {
    ($sink:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::render(
            $sink,
            $fmt,
            &mut $crate::ArgCursor::new(&[$($crate::Arg::from($arg)),*]),
        )
    };
}
