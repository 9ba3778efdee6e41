//! Signature extraction and checking.
//!
//! Walks a format string with the same directive parser the renderer uses
//! and records the [`TypeTag`] of every argument the string would consume,
//! `*` widths and precisions included, in consumption order.

use crate::args::TypeTag;
use crate::error::FormatError;
use crate::format::directive::{StarSource, parse_directive};
use crate::format::registry;

enum Mode<'e> {
    Extract { tags: Vec<TypeTag>, max: usize },
    Check { expected: &'e [TypeTag] },
}

struct TagCollector<'e> {
    mode: Mode<'e>,
    count: usize,
}

impl<'e> TagCollector<'e> {
    fn push(&mut self, tag: TypeTag) -> Result<(), FormatError> {
        let index = self.count;
        match &mut self.mode {
            Mode::Extract { tags, max } => {
                if index >= *max {
                    return Err(FormatError::TooManyArguments { max: *max });
                }
                tags.push(tag);
            }
            Mode::Check { expected } => match expected.get(index) {
                None => {
                    return Err(FormatError::SignatureLength {
                        expected: expected.len(),
                        found: index + 1,
                    });
                }
                Some(&want) if want != tag => {
                    return Err(FormatError::SignatureMismatch {
                        index,
                        expected: want,
                        found: tag,
                    });
                }
                Some(_) => {}
            },
        }
        self.count += 1;
        Ok(())
    }
}

impl StarSource for TagCollector<'_> {
    fn star(&mut self) -> Result<i64, FormatError> {
        self.push(TypeTag::INT)?;
        Ok(0)
    }
}

fn scan(fmt: &[u8], collector: &mut TagCollector<'_>) -> Result<(), FormatError> {
    let mut pos = 0;
    while let Some(offset) = fmt[pos..].iter().position(|&b| b == b'%') {
        pos += offset + 1;
        if fmt.get(pos) == Some(&b'%') {
            pos += 1;
            continue;
        }
        let (params, consumed) = parse_directive(&fmt[pos..], collector)?;
        let conversion = registry::lookup(params.conversion)
            .ok_or(FormatError::UnknownConversion(params.conversion))?;
        if let Some(tag) = conversion.type_tag(params.size)? {
            collector.push(tag)?;
        }
        pos += consumed;
    }
    Ok(())
}

/// Tags of every argument `fmt` consumes, at most `max` of them.
pub fn extract_signature(fmt: impl AsRef<[u8]>, max: usize) -> Result<Vec<TypeTag>, FormatError> {
    let mut collector = TagCollector {
        mode: Mode::Extract {
            tags: Vec::new(),
            max,
        },
        count: 0,
    };
    scan(fmt.as_ref(), &mut collector)?;
    match collector.mode {
        Mode::Extract { tags, .. } => Ok(tags),
        Mode::Check { .. } => Ok(Vec::new()),
    }
}

/// Like [`extract_signature`], writing into `out`; returns the tag count.
///
/// Fails with `TooManyArguments` when `out` is too short.
pub fn extract_signature_into(
    fmt: impl AsRef<[u8]>,
    out: &mut [TypeTag],
) -> Result<usize, FormatError> {
    let tags = extract_signature(fmt, out.len())?;
    out[..tags.len()].copy_from_slice(&tags);
    Ok(tags.len())
}

/// Verify that `fmt` consumes exactly the arguments described by `expected`.
pub fn check_signature(fmt: impl AsRef<[u8]>, expected: &[TypeTag]) -> Result<(), FormatError> {
    let mut collector = TagCollector {
        mode: Mode::Check { expected },
        count: 0,
    };
    scan(fmt.as_ref(), &mut collector)?;
    if collector.count != expected.len() {
        return Err(FormatError::SignatureLength {
            expected: expected.len(),
            found: collector.count,
        });
    }
    Ok(())
}
