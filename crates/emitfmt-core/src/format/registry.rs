//! Conversion registry.
//!
//! Static table mapping each conversion character to its converter, its
//! base argument kind and the length modifiers it accepts.

use crate::args::{ArgCursor, ArgKind, ArgSize, TypeTag};
use crate::error::FormatError;
use crate::format::directive::FormatParams;
use crate::format::{float, integer, text};
use crate::sink::Output;

/// Converter signature: emit one directive, return its field length.
pub(crate) type Converter =
    fn(&mut Output<'_>, &FormatParams, &mut ArgCursor<'_>) -> Result<usize, FormatError>;

/// Which length modifiers a conversion accepts besides none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRule {
    /// `h`, `l`, `ll`.
    Integer,
    /// `L`.
    Float,
    /// No modifier allowed.
    Unsized,
}

pub struct Conversion {
    pub ch: u8,
    /// `None` for `%`, which consumes nothing.
    pub kind: Option<ArgKind>,
    pub sizes: SizeRule,
    convert: Converter,
}

impl Conversion {
    /// Tag of the argument this conversion consumes under `size`.
    ///
    /// Returns `Ok(None)` for conversions that take no argument and
    /// `IncompatibleSize` when the modifier is not valid here.
    pub fn type_tag(&self, size: ArgSize) -> Result<Option<TypeTag>, FormatError> {
        let Some(kind) = self.kind else {
            return Ok(None);
        };
        let tag_size = match (self.sizes, size) {
            (_, ArgSize::Default) => ArgSize::Default,
            (SizeRule::Integer, ArgSize::Half | ArgSize::Long | ArgSize::LongLong) => size,
            (SizeRule::Float, ArgSize::LongDouble) => ArgSize::Long,
            _ => {
                return Err(FormatError::IncompatibleSize {
                    conversion: self.ch,
                    size,
                });
            }
        };
        Ok(Some(TypeTag::new(kind, tag_size)))
    }

    pub(crate) fn convert(
        &self,
        out: &mut Output<'_>,
        params: &FormatParams,
        args: &mut ArgCursor<'_>,
    ) -> Result<usize, FormatError> {
        (self.convert)(out, params, args)
    }
}

impl std::fmt::Debug for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversion")
            .field("ch", &char::from(self.ch))
            .field("kind", &self.kind)
            .field("sizes", &self.sizes)
            .finish()
    }
}

static CONVERSIONS: [Conversion; 16] = [
    Conversion {
        ch: b'd',
        kind: Some(ArgKind::Integer),
        sizes: SizeRule::Integer,
        convert: integer::format_decimal,
    },
    Conversion {
        ch: b'i',
        kind: Some(ArgKind::Integer),
        sizes: SizeRule::Integer,
        convert: integer::format_decimal,
    },
    Conversion {
        ch: b'o',
        kind: Some(ArgKind::Integer),
        sizes: SizeRule::Integer,
        convert: integer::format_octal,
    },
    Conversion {
        ch: b'x',
        kind: Some(ArgKind::Integer),
        sizes: SizeRule::Integer,
        convert: integer::format_hex,
    },
    Conversion {
        ch: b'X',
        kind: Some(ArgKind::Integer),
        sizes: SizeRule::Integer,
        convert: integer::format_hex,
    },
    Conversion {
        ch: b'u',
        kind: Some(ArgKind::Integer),
        sizes: SizeRule::Integer,
        convert: integer::format_unsigned_decimal,
    },
    Conversion {
        ch: b'b',
        kind: Some(ArgKind::Integer),
        sizes: SizeRule::Integer,
        convert: integer::format_binary,
    },
    Conversion {
        ch: b'c',
        kind: Some(ArgKind::Integer),
        sizes: SizeRule::Unsized,
        convert: text::format_char,
    },
    Conversion {
        ch: b's',
        kind: Some(ArgKind::String),
        sizes: SizeRule::Unsized,
        convert: text::format_string,
    },
    Conversion {
        ch: b'f',
        kind: Some(ArgKind::Float),
        sizes: SizeRule::Float,
        convert: float::format_fixed,
    },
    Conversion {
        ch: b'e',
        kind: Some(ArgKind::Float),
        sizes: SizeRule::Float,
        convert: float::format_exponential,
    },
    Conversion {
        ch: b'E',
        kind: Some(ArgKind::Float),
        sizes: SizeRule::Float,
        convert: float::format_exponential,
    },
    Conversion {
        ch: b'g',
        kind: Some(ArgKind::Float),
        sizes: SizeRule::Float,
        convert: float::format_adaptive,
    },
    Conversion {
        ch: b'G',
        kind: Some(ArgKind::Float),
        sizes: SizeRule::Float,
        convert: float::format_adaptive,
    },
    Conversion {
        ch: b'p',
        kind: Some(ArgKind::Pointer),
        sizes: SizeRule::Unsized,
        convert: integer::format_pointer,
    },
    Conversion {
        ch: b'%',
        kind: None,
        sizes: SizeRule::Unsized,
        convert: text::format_percent,
    },
];

/// Look up the conversion for `ch`.
pub fn lookup(ch: u8) -> Option<&'static Conversion> {
    CONVERSIONS.iter().find(|c| c.ch == ch)
}

/// Every registered conversion, in table order.
pub fn conversions() -> &'static [Conversion] {
    &CONVERSIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_documented_conversion_is_registered() {
        for &ch in b"diouxXbcsfeEgGp%" {
            assert!(lookup(ch).is_some(), "missing %{}", char::from(ch));
        }
        assert_eq!(conversions().len(), 16);
        assert!(lookup(b'n').is_none());
        assert!(lookup(b'a').is_none());
    }

    #[test]
    fn integer_sizes() {
        let d = lookup(b'd').unwrap();
        assert_eq!(d.type_tag(ArgSize::Default).unwrap(), Some(TypeTag::INT));
        assert_eq!(d.type_tag(ArgSize::Half).unwrap(), Some(TypeTag::HALF));
        assert_eq!(d.type_tag(ArgSize::Long).unwrap(), Some(TypeTag::LONG));
        assert_eq!(
            d.type_tag(ArgSize::LongLong).unwrap(),
            Some(TypeTag::LONG_LONG)
        );
        assert!(matches!(
            d.type_tag(ArgSize::LongDouble),
            Err(FormatError::IncompatibleSize {
                conversion: b'd',
                size: ArgSize::LongDouble
            })
        ));
    }

    #[test]
    fn float_sizes() {
        let g = lookup(b'g').unwrap();
        assert_eq!(g.type_tag(ArgSize::Default).unwrap(), Some(TypeTag::DOUBLE));
        assert_eq!(
            g.type_tag(ArgSize::LongDouble).unwrap(),
            Some(TypeTag::LONG_DOUBLE)
        );
        assert!(g.type_tag(ArgSize::Long).is_err());
        assert!(g.type_tag(ArgSize::Half).is_err());
    }

    #[test]
    fn unsized_conversions_reject_modifiers() {
        for &ch in b"csp" {
            let conv = lookup(ch).unwrap();
            assert!(conv.type_tag(ArgSize::Default).unwrap().is_some());
            assert!(conv.type_tag(ArgSize::Long).is_err());
        }
        assert_eq!(
            lookup(b'c').unwrap().type_tag(ArgSize::Default).unwrap(),
            Some(TypeTag::INT)
        );
    }

    #[test]
    fn percent_takes_no_argument() {
        let pct = lookup(b'%').unwrap();
        assert_eq!(pct.type_tag(ArgSize::Default).unwrap(), None);
        assert_eq!(pct.type_tag(ArgSize::Long).unwrap(), None);
    }
}
