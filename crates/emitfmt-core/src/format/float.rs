//! Floating-point conversions: `f e E g G`.
//!
//! Digits come from repeated scaling of the magnitude by ten, so the output
//! is a truncation of the value (no rounding) and does not depend on the
//! binary layout of the float. Very large magnitudes are reported as
//! infinite once the decimal exponent passes [`MAX_DECIMAL_EXPONENT`].

use crate::args::ArgCursor;
use crate::error::FormatError;
use crate::format::directive::FormatParams;
use crate::format::text;
use crate::sink::Output;

/// Decimal exponent at which a magnitude is treated as infinite.
pub const MAX_DECIMAL_EXPONENT: i32 = 8192;

/// Precision used when a directive gives none.
pub const DEFAULT_PRECISION: usize = 6;

/// Result of [`find_decimal_exponent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalExponent {
    /// `e` such that `10^e <= |v| < 10^(e+1)`; zero for `v == 0`.
    Finite(i32),
    PosInfinity,
    NegInfinity,
}

#[allow(clippy::eq_op)]
fn is_nan(v: f64) -> bool {
    v != v
}

fn is_infinite(v: f64) -> bool {
    v != 0.0 && 1.0 / v == 0.0
}

/// A finite magnitude written as `unit * 10^power`, `unit` in `[1, 10)`.
/// Zero is `unit == 0.0`, `power == 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Decimal {
    power: i32,
    unit: f64,
}

/// Split a finite, non-negative magnitude; `None` once the exponent passes
/// [`MAX_DECIMAL_EXPONENT`].
fn decompose(mag: f64) -> Option<Decimal> {
    if mag == 0.0 {
        return Some(Decimal {
            power: 0,
            unit: 0.0,
        });
    }
    let mut d = mag;
    let mut e = 0;
    if d >= 10.0 {
        while d >= 10.0 {
            d /= 10.0;
            e += 1;
            if e > MAX_DECIMAL_EXPONENT {
                return None;
            }
        }
    } else {
        while d < 1.0 && e > -MAX_DECIMAL_EXPONENT {
            d *= 10.0;
            e -= 1;
        }
    }

    // The stepwise search and the single scaling below round differently
    // and may disagree by one; the scaled unit decides.
    let mut unit = scale_to_unit(mag, e);
    loop {
        if unit >= 10.0 {
            unit /= 10.0;
            e += 1;
        } else if unit > 0.0 && unit < 1.0 {
            unit *= 10.0;
            e -= 1;
        } else {
            break;
        }
    }
    if e > MAX_DECIMAL_EXPONENT {
        return None;
    }
    Some(Decimal { power: e, unit })
}

/// Locate the decimal exponent of `v`.
pub fn find_decimal_exponent(v: f64) -> DecimalExponent {
    if v == 0.0 || is_nan(v) {
        return DecimalExponent::Finite(0);
    }
    let infinite = if v < 0.0 {
        DecimalExponent::NegInfinity
    } else {
        DecimalExponent::PosInfinity
    };
    if is_infinite(v) {
        return infinite;
    }
    match decompose(magnitude(v)) {
        Some(dec) => DecimalExponent::Finite(dec.power),
        None => infinite,
    }
}

/// `10^n` by repeated squaring.
pub fn p10(n: u32) -> f64 {
    let mut result = 1.0;
    let mut base = 10.0;
    let mut n = n;
    while n > 0 {
        if n & 1 == 1 {
            result *= base;
        }
        base *= base;
        n >>= 1;
    }
    result
}

/// Scale a non-negative magnitude with decimal exponent `e` into `[1, 10)`.
fn scale_to_unit(mag: f64, e: i32) -> f64 {
    if e > 0 {
        mag / p10(e.unsigned_abs())
    } else if e < 0 {
        // 10^k overflows for k > 308; subnormal inputs need two steps.
        let mut k = e.unsigned_abs();
        let mut m = mag;
        while k > 300 {
            m *= p10(300);
            k -= 300;
        }
        m * p10(k)
    } else {
        mag
    }
}

/// Produces decimal digits of a value in `[0, 10)`, most significant first.
#[derive(Debug, Clone, Copy)]
struct DigitPeeler {
    rest: f64,
}

impl DigitPeeler {
    fn new(rest: f64) -> Self {
        Self { rest }
    }

    fn next_digit(&mut self) -> u8 {
        let digit = (self.rest as u64 % 10) as u8;
        self.rest = self.rest * 10.0 - f64::from(digit) * 10.0;
        digit
    }

    /// True once every remaining digit is zero.
    fn is_spent(&self) -> bool {
        self.rest <= 0.0
    }
}

/// Peeler for fixed notation, plus how many integer digits it yields.
///
/// For `|v| < 1` the leading `0` is a literal and the peeler starts at the
/// first fractional digit.
fn fixed_peeler(mag: f64, dec: Decimal) -> (DigitPeeler, usize) {
    if dec.power >= 0 {
        (
            DigitPeeler::new(dec.unit),
            dec.power.unsigned_abs() as usize + 1,
        )
    } else {
        (DigitPeeler::new(mag * 10.0), 0)
    }
}

/// Digits a double can carry past its first nonzero one; beyond this the
/// peeler only replays rounding noise.
const MAX_SIGNIFICANT_SCAN: usize = 800;

/// Number of fractional digits left once trailing zeros are dropped.
fn significant_fraction(mut peeler: DigitPeeler, skip: usize, frac: usize) -> usize {
    for _ in 0..skip {
        peeler.next_digit();
    }
    let mut keep = 0;
    for i in 0..frac.min(MAX_SIGNIFICANT_SCAN) {
        if peeler.is_spent() {
            break;
        }
        if peeler.next_digit() != 0 {
            keep = i + 1;
        }
    }
    keep
}

fn magnitude(value: f64) -> f64 {
    if value < 0.0 { -value } else { value }
}

fn decimal_len(mut n: u32) -> usize {
    let mut len = 1;
    while n >= 10 {
        n /= 10;
        len += 1;
    }
    len
}

/// Emit the leading padding and sign for a numeric field.
fn lead(
    out: &mut Output<'_>,
    params: &FormatParams,
    sign: Option<u8>,
    fill: usize,
) -> Result<(), FormatError> {
    let zero = params.flags.zero_pad && !params.flags.left_justify;
    if !params.flags.left_justify && !zero {
        out.repeat(b' ', fill)?;
    }
    if let Some(s) = sign {
        out.char(s)?;
    }
    if zero {
        out.repeat(b'0', fill)?;
    }
    Ok(())
}

fn trail(out: &mut Output<'_>, params: &FormatParams, fill: usize) -> Result<(), FormatError> {
    if params.flags.left_justify {
        out.repeat(b' ', fill)?;
    }
    Ok(())
}

fn emit_digits(
    out: &mut Output<'_>,
    peeler: &mut DigitPeeler,
    count: usize,
) -> Result<(), FormatError> {
    for _ in 0..count {
        if !out.is_open() {
            break;
        }
        out.char(b'0' + peeler.next_digit())?;
    }
    Ok(())
}

/// Fixed notation: `[-]ddd.ddd` with `precision` fractional digits.
fn render_fixed(
    out: &mut Output<'_>,
    params: &FormatParams,
    value: f64,
    dec: Decimal,
    precision: usize,
) -> Result<usize, FormatError> {
    let sign = params.sign_char(value < 0.0);
    let period = precision > 0 || params.flags.alt_form;
    let (mut peeler, int_digits) = fixed_peeler(magnitude(value), dec);

    let body = usize::from(sign.is_some())
        + int_digits.max(1)
        + usize::from(period)
        + precision;
    let fill = params.min_width().saturating_sub(body);

    lead(out, params, sign, fill)?;
    if int_digits == 0 {
        out.char(b'0')?;
    } else {
        emit_digits(out, &mut peeler, int_digits)?;
    }
    if period {
        out.char(b'.')?;
    }
    emit_digits(out, &mut peeler, precision)?;
    trail(out, params, fill)?;
    Ok(body + fill)
}

/// Exponential notation: `[-]d.ddde±XX`, at least two exponent digits.
fn render_exponential(
    out: &mut Output<'_>,
    params: &FormatParams,
    value: f64,
    dec: Decimal,
    precision: usize,
) -> Result<usize, FormatError> {
    let sign = params.sign_char(value < 0.0);
    let period = precision > 0 || params.flags.alt_form;
    let mut peeler = DigitPeeler::new(dec.unit);

    let exp = dec.power.unsigned_abs();
    let exp_digits = decimal_len(exp).max(2);
    let body = usize::from(sign.is_some()) + 1 + usize::from(period) + precision + 2 + exp_digits;
    let fill = params.min_width().saturating_sub(body);

    lead(out, params, sign, fill)?;
    emit_digits(out, &mut peeler, 1)?;
    if period {
        out.char(b'.')?;
    }
    emit_digits(out, &mut peeler, precision)?;
    out.char(if params.uppercase { b'E' } else { b'e' })?;
    out.char(if dec.power < 0 { b'-' } else { b'+' })?;
    let mut buf = [0u8; 10];
    let mut pos = buf.len();
    let mut rest = exp;
    for _ in 0..exp_digits {
        pos -= 1;
        buf[pos] = b'0' + (rest % 10) as u8;
        rest /= 10;
    }
    out.string(&buf[pos..])?;
    trail(out, params, fill)?;
    Ok(body + fill)
}

/// Classify `value`: either its decimal split or the token that replaces
/// the whole conversion.
fn classify(value: f64) -> Result<Decimal, &'static [u8]> {
    let infinite: &'static [u8] = if value < 0.0 { b"-inf" } else { b"inf" };
    if is_nan(value) {
        return Err(b"NaN");
    }
    if is_infinite(value) {
        return Err(infinite);
    }
    decompose(magnitude(value)).ok_or(infinite)
}

fn float_arg(params: &FormatParams, args: &mut ArgCursor<'_>) -> Result<f64, FormatError> {
    if !cfg!(feature = "float") {
        return Err(FormatError::FloatUnsupported);
    }
    args.next_float(params.size)
}

pub(crate) fn format_fixed(
    out: &mut Output<'_>,
    params: &FormatParams,
    args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    let value = float_arg(params, args)?;
    match classify(value) {
        Ok(dec) => render_fixed(
            out,
            params,
            value,
            dec,
            params.precision.unwrap_or(DEFAULT_PRECISION),
        ),
        Err(token) => text::pad_text(out, params, token),
    }
}

pub(crate) fn format_exponential(
    out: &mut Output<'_>,
    params: &FormatParams,
    args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    let value = float_arg(params, args)?;
    match classify(value) {
        Ok(dec) => render_exponential(
            out,
            params,
            value,
            dec,
            params.precision.unwrap_or(DEFAULT_PRECISION),
        ),
        Err(token) => text::pad_text(out, params, token),
    }
}

/// `%g`: `precision` counts significant digits.
///
/// Exponential notation is used when the exponent is below -4 or at least
/// the precision, so `%.0g` is always exponential. Trailing fractional
/// zeros (and a bare period) are dropped unless `#` is given.
pub(crate) fn format_adaptive(
    out: &mut Output<'_>,
    params: &FormatParams,
    args: &mut ArgCursor<'_>,
) -> Result<usize, FormatError> {
    let value = float_arg(params, args)?;
    let dec = match classify(value) {
        Ok(dec) => dec,
        Err(token) => return text::pad_text(out, params, token),
    };
    let significant = params.precision.unwrap_or(DEFAULT_PRECISION);
    let strip = !params.flags.alt_form;

    if dec.power < -4 || i64::from(dec.power) >= significant as i64 {
        let mut frac = significant.saturating_sub(1);
        if strip {
            frac = significant_fraction(DigitPeeler::new(dec.unit), 1, frac);
        }
        render_exponential(out, params, value, dec, frac)
    } else {
        // -4 <= power < significant, so this is never negative.
        let mut frac = (significant as i64 - 1 - i64::from(dec.power)) as usize;
        if strip {
            let (peeler, int_digits) = fixed_peeler(magnitude(value), dec);
            frac = significant_fraction(peeler, int_digits, frac);
        }
        render_fixed(out, params, value, dec, frac)
    }
}
