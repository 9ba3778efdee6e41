//! Integer and pointer conversions: `d i o x X u b p`.

use crate::args::{ArgCursor, ArgSize};
use crate::error::FormatError;
use crate::format::directive::FormatParams;
use crate::format::text;
use crate::sink::Output;

const LOWER_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const UPPER_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Render the digits of `value` in `radix` into `buf`, returning the used
/// tail of the buffer. Zero renders as a single `0`.
///
/// # Panics
///
/// Panics if `radix` is outside `2..=36`.
pub fn radix_digits(value: u64, radix: u32, uppercase: bool, buf: &mut [u8; 64]) -> &[u8] {
    assert!((2..=36).contains(&radix), "radix {radix} out of range");
    let table = if uppercase { UPPER_DIGITS } else { LOWER_DIGITS };
    let radix = u64::from(radix);
    let mut v = value;
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = table[(v % radix) as usize];
        v /= radix;
        if v == 0 {
            break;
        }
    }
    &buf[pos..]
}

/// Render the decimal digits of `value` without its sign.
///
/// The lowest digit is peeled before taking the absolute value so that
/// `i64::MIN` never has to be negated.
fn signed_digits(value: i64, buf: &mut [u8; 64]) -> &[u8] {
    let mut pos = buf.len() - 1;
    buf[pos] = b'0' + (value % 10).unsigned_abs() as u8;
    let mut rest = (value / 10).unsigned_abs();
    while rest > 0 {
        pos -= 1;
        buf[pos] = b'0' + (rest % 10) as u8;
        rest /= 10;
    }
    &buf[pos..]
}

/// Lay out `prefix`, precision zeros and `digits` inside the field width.
///
/// The digit count is raised to the precision; with zero-fill (and no left
/// justification) it is raised further so the field is exactly `width`.
fn emit_number(
    out: &mut Output<'_>,
    params: &FormatParams,
    prefix: &[u8],
    digits: &[u8],
) -> Result<usize, FormatError> {
    let width = params.min_width();
    let mut ndigits = digits.len().max(params.precision.unwrap_or(0));
    if params.flags.zero_pad && !params.flags.left_justify && width > ndigits + prefix.len() {
        ndigits = width - prefix.len();
    }
    let body = prefix.len() + ndigits;
    let fill = width.saturating_sub(body);

    if !params.flags.left_justify {
        out.repeat(b' ', fill)?;
    }
    out.string(prefix)?;
    out.repeat(b'0', ndigits - digits.len())?;
    out.string(digits)?;
    if params.flags.left_justify {
        out.repeat(b' ', fill)?;
    }
    Ok(body + fill)
}

/// Format a signed value with sign, precision and padding.
pub(crate) fn format_signed(
    out: &mut Output<'_>,
    params: &FormatParams,
    value: i64,
) -> Result<usize, FormatError> {
    let mut buf = [0u8; 64];
    let digits = signed_digits(value, &mut buf);
    let sign = params.sign_char(value < 0);
    let sign_buf;
    let prefix: &[u8] = match sign {
        Some(s) => {
            sign_buf = [s];
            &sign_buf
        }
        None => &[],
    };
    emit_number(out, params, prefix, digits)
}

/// Format an unsigned value in `radix`.
///
/// The alternate prefix is shown only with `#`, and for `%p` only when the
/// value is non-zero. Upper-case variants upper-case the prefix too.
pub(crate) fn format_unsigned(
    out: &mut Output<'_>,
    params: &FormatParams,
    value: u64,
    radix: u32,
    alt_prefix: &[u8],
) -> Result<usize, FormatError> {
    let mut buf = [0u8; 64];
    let digits = radix_digits(value, radix, params.uppercase, &mut buf);

    let show_prefix = params.flags.alt_form && (params.conversion != b'p' || value != 0);
    let mut prefix_buf = [0u8; 2];
    let mut prefix_len = 0;
    if show_prefix {
        for (slot, &b) in prefix_buf.iter_mut().zip(alt_prefix) {
            *slot = if params.uppercase {
                b.to_ascii_uppercase()
            } else {
                b
            };
            prefix_len += 1;
        }
    }
    emit_number(out, params, &prefix_buf[..prefix_len], digits)
}

fn narrow_signed(raw: i64, size: ArgSize) -> i64 {
    match size {
        ArgSize::Half => i64::from(raw as i16),
        _ => raw,
    }
}

fn narrow_unsigned(raw: u64, size: ArgSize) -> u64 {
    match size {
        ArgSize::Half => u64::from(raw as u16),
        _ => raw,
    }
}

pub(crate) fn format_decimal(
    out: &mut Output<'_>,
    params: &FormatParams,
    args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    let value = narrow_signed(args.next_signed(params.size)?, params.size);
    format_signed(out, params, value)
}

fn format_radix(
    out: &mut Output<'_>,
    params: &FormatParams,
    args: &mut ArgCursor<'_>,
    radix: u32,
    alt_prefix: &[u8],
) -> Result<usize, FormatError> {
    let value = narrow_unsigned(args.next_unsigned(params.size)?, params.size);
    format_unsigned(out, params, value, radix, alt_prefix)
}

pub(crate) fn format_unsigned_decimal(
    out: &mut Output<'_>,
    params: &FormatParams,
    args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    format_radix(out, params, args, 10, b"")
}

pub(crate) fn format_octal(
    out: &mut Output<'_>,
    params: &FormatParams,
    args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    format_radix(out, params, args, 8, b"0")
}

pub(crate) fn format_hex(
    out: &mut Output<'_>,
    params: &FormatParams,
    args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    format_radix(out, params, args, 16, b"0x")
}

pub(crate) fn format_binary(
    out: &mut Output<'_>,
    params: &FormatParams,
    args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    format_radix(out, params, args, 2, b"0b")
}

/// `%p`: `(nil)` for a null pointer, otherwise hex with a forced `0x`.
pub(crate) fn format_pointer(
    out: &mut Output<'_>,
    params: &FormatParams,
    args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    let addr = args.next_pointer()?;
    if addr == 0 {
        return text::pad_text(out, params, b"(nil)");
    }
    let mut forced = *params;
    forced.flags.alt_form = true;
    format_unsigned(out, &forced, addr as u64, 16, b"0x")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::StringSink;

    fn signed(params: &FormatParams, value: i64) -> (String, usize) {
        let mut sink = StringSink::new();
        let len = format_signed(&mut Output::new(&mut sink), params, value).unwrap();
        (sink.to_string_lossy(), len)
    }

    fn unsigned(params: &FormatParams, value: u64, radix: u32, prefix: &[u8]) -> String {
        let mut sink = StringSink::new();
        let len =
            format_unsigned(&mut Output::new(&mut sink), params, value, radix, prefix).unwrap();
        assert_eq!(len, sink.as_bytes().len());
        sink.to_string_lossy()
    }

    #[test]
    fn test_radix_digits() {
        let mut buf = [0u8; 64];
        assert_eq!(radix_digits(0, 10, false, &mut buf), b"0");
        assert_eq!(radix_digits(255, 16, false, &mut buf), b"ff");
        assert_eq!(radix_digits(255, 16, true, &mut buf), b"FF");
        assert_eq!(radix_digits(35, 36, false, &mut buf), b"z");
        assert_eq!(radix_digits(5, 2, false, &mut buf), b"101");
        assert_eq!(radix_digits(u64::MAX, 2, false, &mut buf).len(), 64);
    }

    #[test]
    #[should_panic]
    fn test_radix_out_of_range_panics() {
        let mut buf = [0u8; 64];
        radix_digits(1, 37, false, &mut buf);
    }

    #[test]
    fn test_signed_basic() {
        let params = FormatParams::plain(b'd');
        assert_eq!(signed(&params, 42), ("42".into(), 2));
        assert_eq!(signed(&params, -42), ("-42".into(), 3));
        assert_eq!(signed(&params, 0), ("0".into(), 1));
    }

    #[test]
    fn test_signed_extremes() {
        let params = FormatParams::plain(b'd');
        assert_eq!(signed(&params, i64::MIN).0, "-9223372036854775808");
        assert_eq!(signed(&params, i64::MAX).0, "9223372036854775807");
        assert_eq!(signed(&params, i64::from(i32::MIN)).0, "-2147483648");
    }

    #[test]
    fn test_signed_width_and_flags() {
        let mut params = FormatParams::plain(b'd');
        params.width = Some(5);
        assert_eq!(signed(&params, 42), ("   42".into(), 5));

        params.flags.left_justify = true;
        assert_eq!(signed(&params, 7).0, "7    ");

        params.flags.left_justify = false;
        params.flags.zero_pad = true;
        assert_eq!(signed(&params, -42).0, "-0042");

        params.flags.force_sign = true;
        assert_eq!(signed(&params, 42).0, "+0042");
    }

    #[test]
    fn test_signed_precision() {
        let mut params = FormatParams::plain(b'd');
        params.precision = Some(5);
        assert_eq!(signed(&params, -42).0, "-00042");
        params.width = Some(8);
        assert_eq!(signed(&params, 42).0, "   00042");
    }

    #[test]
    fn test_space_sign() {
        let mut params = FormatParams::plain(b'd');
        params.flags.space_sign = true;
        assert_eq!(signed(&params, 5).0, " 5");
        assert_eq!(signed(&params, -5).0, "-5");
    }

    #[test]
    fn test_unsigned_alternate_prefixes() {
        let mut params = FormatParams::plain(b'x');
        params.flags.alt_form = true;
        assert_eq!(unsigned(&params, 255, 16, b"0x"), "0xff");
        assert_eq!(unsigned(&params, 0, 16, b"0x"), "0x0");

        let mut upper = FormatParams::plain(b'X');
        upper.flags.alt_form = true;
        assert_eq!(unsigned(&upper, 255, 16, b"0x"), "0XFF");

        let mut octal = FormatParams::plain(b'o');
        octal.flags.alt_form = true;
        assert_eq!(unsigned(&octal, 8, 8, b"0"), "010");
    }

    #[test]
    fn test_unsigned_zero_fill_counts_prefix() {
        let mut params = FormatParams::plain(b'x');
        params.flags.alt_form = true;
        params.flags.zero_pad = true;
        params.width = Some(8);
        assert_eq!(unsigned(&params, 0xab, 16, b"0x"), "0x0000ab");
    }

    #[test]
    fn test_left_justify_pads_with_spaces() {
        let mut params = FormatParams::plain(b'x');
        params.flags.left_justify = true;
        params.width = Some(6);
        assert_eq!(unsigned(&params, 0xab, 16, b"0x"), "ab    ");
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(narrow_signed(70_000, ArgSize::Half), 4464);
        assert_eq!(narrow_signed(-1, ArgSize::Half), -1);
        assert_eq!(narrow_unsigned(u64::from(u32::MAX), ArgSize::Half), 65535);
        assert_eq!(narrow_unsigned(u64::MAX, ArgSize::Long), u64::MAX);
    }
}
