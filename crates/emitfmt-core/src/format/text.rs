//! Text conversions: `c s %`, plus the padded-token helper shared with the
//! pointer and floating-point converters.

use crate::args::{ArgCursor, ArgSize};
use crate::error::FormatError;
use crate::format::directive::FormatParams;
use crate::sink::Output;

/// Emit `text` space-padded to the field width.
///
/// Precision, zero-fill and sign flags are ignored.
pub(crate) fn pad_text(
    out: &mut Output<'_>,
    params: &FormatParams,
    text: &[u8],
) -> Result<usize, FormatError> {
    let fill = params.min_width().saturating_sub(text.len());
    if !params.flags.left_justify {
        out.repeat(b' ', fill)?;
    }
    out.string(text)?;
    if params.flags.left_justify {
        out.repeat(b' ', fill)?;
    }
    Ok(text.len() + fill)
}

/// `%c`: the low byte of an `int` argument.
pub(crate) fn format_char(
    out: &mut Output<'_>,
    params: &FormatParams,
    args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    let value = args.next_signed(ArgSize::Default)?;
    pad_text(out, params, &[value as u8])
}

/// `%s`: at most `precision` bytes of the string.
pub(crate) fn format_string(
    out: &mut Output<'_>,
    params: &FormatParams,
    args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    let s = args.next_str()?;
    let s = match params.precision {
        Some(max) if max < s.len() => &s[..max],
        _ => s,
    };
    pad_text(out, params, s)
}

/// `%%` and friends: a single literal percent sign; width is ignored.
pub(crate) fn format_percent(
    out: &mut Output<'_>,
    _params: &FormatParams,
    _args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    out.char(b'%')?;
    Ok(1)
}
