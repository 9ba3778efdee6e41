//! Directive parser.
//!
//! Scans one `%` directive (flags, width, precision, length modifier,
//! conversion character) into a [`FormatParams`]. The same scanner serves
//! rendering and signature extraction; the two differ only in how a `*`
//! width or precision is supplied (see [`StarSource`]).

use crate::args::{ArgCursor, ArgSize};
use crate::error::FormatError;
use crate::format::registry;

/// Largest literal or `*` width/precision accepted.
pub const MAX_FIELD_VALUE: usize = i32::MAX as usize;

/// Flags parsed from a directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub left_justify: bool, // '-'
    pub force_sign: bool,   // '+'
    pub space_sign: bool,   // ' '
    pub alt_form: bool,     // '#'
    pub zero_pad: bool,     // '0'
}

/// Parameters of one directive. Built fresh for every directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatParams {
    pub flags: FormatFlags,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub size: ArgSize,
    pub conversion: u8,
    /// Set for the `X`, `E` and `G` variants.
    pub uppercase: bool,
}

impl FormatParams {
    /// Parameters for `conversion` with no flags, width, precision or size.
    pub fn plain(conversion: u8) -> Self {
        Self {
            flags: FormatFlags::default(),
            width: None,
            precision: None,
            size: ArgSize::Default,
            conversion,
            uppercase: conversion.is_ascii_uppercase(),
        }
    }

    /// Minimum field width, zero when unspecified.
    pub fn min_width(&self) -> usize {
        self.width.unwrap_or(0)
    }

    /// Sign character to print ahead of a number.
    pub fn sign_char(&self, negative: bool) -> Option<u8> {
        if negative {
            Some(b'-')
        } else if self.flags.force_sign {
            Some(b'+')
        } else if self.flags.space_sign {
            Some(b' ')
        } else {
            None
        }
    }
}

/// Supplies values for `*` widths and precisions.
pub trait StarSource {
    fn star(&mut self) -> Result<i64, FormatError>;
}

impl StarSource for ArgCursor<'_> {
    fn star(&mut self) -> Result<i64, FormatError> {
        self.next_signed(ArgSize::Default)
    }
}

fn is_conversion_char(ch: u8) -> bool {
    (ch.is_ascii_alphabetic() && !matches!(ch, b'h' | b'l' | b'L')) || ch == b'%'
}

/// Parse a single directive starting after the `%` character.
///
/// Returns the parameters and the number of bytes consumed, counted from
/// `fmt[0]` and including the conversion character.
pub fn parse_directive<S: StarSource + ?Sized>(
    fmt: &[u8],
    stars: &mut S,
) -> Result<(FormatParams, usize), FormatError> {
    let mut pos = 0;
    let mut flags = FormatFlags::default();
    let mut width = None;
    let mut precision = None;
    let mut past_period = false;
    let mut size = None;

    let conversion = loop {
        let Some(&ch) = fmt.get(pos) else {
            return Err(FormatError::Unterminated);
        };
        if is_conversion_char(ch) {
            break ch;
        }

        // A '0' before any width digit is the zero-pad flag; every other
        // digit run is the width or precision itself.
        if ch.is_ascii_digit() && (ch != b'0' || past_period) {
            let (value, len) = parse_decimal(&fmt[pos..])?;
            pos += len;
            assign_field(&mut width, &mut precision, past_period, value)?;
            continue;
        }

        match ch {
            b'-' => flags.left_justify = true,
            b'+' => flags.force_sign = true,
            b' ' => flags.space_sign = true,
            b'#' => flags.alt_form = true,
            b'0' => flags.zero_pad = true,
            b'*' => {
                let value = stars.star()?;
                if value < 0 {
                    return Err(FormatError::NegativeStar(value));
                }
                let value = usize::try_from(value)
                    .ok()
                    .filter(|v| *v <= MAX_FIELD_VALUE)
                    .ok_or(FormatError::ValueTooLarge {
                        max: MAX_FIELD_VALUE,
                    })?;
                assign_field(&mut width, &mut precision, past_period, value)?;
            }
            b'.' => {
                if past_period {
                    return Err(FormatError::DuplicatePeriod);
                }
                past_period = true;
            }
            b'h' => set_size(&mut size, ArgSize::Half)?,
            b'l' => {
                if cfg!(feature = "long-long") && size.is_none() && fmt.get(pos + 1) == Some(&b'l')
                {
                    pos += 1;
                    set_size(&mut size, ArgSize::LongLong)?;
                } else {
                    set_size(&mut size, ArgSize::Long)?;
                }
            }
            b'L' => set_size(&mut size, ArgSize::LongDouble)?,
            other => return Err(FormatError::UnknownModifier(other)),
        }
        pos += 1;
    };
    pos += 1;

    if registry::lookup(conversion).is_none() {
        return Err(FormatError::UnknownConversion(conversion));
    }

    // '.' alone means precision zero.
    if past_period && precision.is_none() {
        precision = Some(0);
    }
    // POSIX: '+' overrides ' '; '-' overrides '0'.
    if flags.force_sign {
        flags.space_sign = false;
    }
    if flags.left_justify {
        flags.zero_pad = false;
    }

    Ok((
        FormatParams {
            flags,
            width,
            precision,
            size: size.unwrap_or_default(),
            conversion,
            uppercase: conversion.is_ascii_uppercase(),
        },
        pos,
    ))
}

fn assign_field(
    width: &mut Option<usize>,
    precision: &mut Option<usize>,
    past_period: bool,
    value: usize,
) -> Result<(), FormatError> {
    let (slot, err) = if past_period {
        (precision, FormatError::DuplicatePrecision)
    } else {
        (width, FormatError::DuplicateWidth)
    };
    if slot.is_some() {
        return Err(err);
    }
    *slot = Some(value);
    Ok(())
}

fn set_size(slot: &mut Option<ArgSize>, size: ArgSize) -> Result<(), FormatError> {
    if slot.is_some() {
        return Err(FormatError::DuplicateSize);
    }
    *slot = Some(size);
    Ok(())
}

/// Parse a run of ASCII digits. Returns `(value, digits consumed)`.
fn parse_decimal(digits: &[u8]) -> Result<(usize, usize), FormatError> {
    let mut value = 0_usize;
    let mut len = 0;
    for &d in digits.iter().take_while(|d| d.is_ascii_digit()) {
        value = value * 10 + usize::from(d - b'0');
        if value > MAX_FIELD_VALUE {
            return Err(FormatError::ValueTooLarge {
                max: MAX_FIELD_VALUE,
            });
        }
        len += 1;
    }
    Ok((value, len))
}
