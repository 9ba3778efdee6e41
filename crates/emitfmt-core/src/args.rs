//! Typed argument vocabulary and the sequential argument cursor.
//!
//! A native variadic list is replaced by an explicit slice of [`Arg`]
//! values. Each value carries a [`TypeTag`], which is the same vocabulary the
//! signature extractor produces, so a format string can be checked against an
//! argument slice without rendering anything.

use std::fmt;

use crate::error::FormatError;

/// Base kind of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ArgKind {
    Integer,
    String,
    Float,
    Pointer,
}

/// Size qualifier selected by a length modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ArgSize {
    #[default]
    Default,
    Half,       // 'h'
    Long,       // 'l'
    LongLong,   // 'll'
    LongDouble, // 'L'
}

impl ArgSize {
    /// The length modifier as written in a format string.
    pub fn modifier(self) -> &'static str {
        match self {
            ArgSize::Default => "",
            ArgSize::Half => "h",
            ArgSize::Long => "l",
            ArgSize::LongLong => "ll",
            ArgSize::LongDouble => "L",
        }
    }
}

impl fmt::Display for ArgSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgSize::Default => f.write_str("(none)"),
            other => f.write_str(other.modifier()),
        }
    }
}

/// Kind plus size of one argument.
///
/// Floating-point values only use `Default` and `Long` (long double); the
/// half/long-long sizes only occur with `Integer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeTag {
    pub kind: ArgKind,
    pub size: ArgSize,
}

impl TypeTag {
    pub const INT: TypeTag = TypeTag::new(ArgKind::Integer, ArgSize::Default);
    pub const HALF: TypeTag = TypeTag::new(ArgKind::Integer, ArgSize::Half);
    pub const LONG: TypeTag = TypeTag::new(ArgKind::Integer, ArgSize::Long);
    pub const LONG_LONG: TypeTag = TypeTag::new(ArgKind::Integer, ArgSize::LongLong);
    pub const DOUBLE: TypeTag = TypeTag::new(ArgKind::Float, ArgSize::Default);
    pub const LONG_DOUBLE: TypeTag = TypeTag::new(ArgKind::Float, ArgSize::Long);
    pub const STRING: TypeTag = TypeTag::new(ArgKind::String, ArgSize::Default);
    pub const POINTER: TypeTag = TypeTag::new(ArgKind::Pointer, ArgSize::Default);

    pub const fn new(kind: ArgKind, size: ArgSize) -> Self {
        Self { kind, size }
    }

    /// Short C-like spelling, e.g. `int`, `long long`, `long double`.
    pub fn name(self) -> &'static str {
        match (self.kind, self.size) {
            (ArgKind::Integer, ArgSize::Half) => "short",
            (ArgKind::Integer, ArgSize::Long) => "long",
            (ArgKind::Integer, ArgSize::LongLong) => "long long",
            (ArgKind::Integer, _) => "int",
            (ArgKind::Float, ArgSize::Long) => "long double",
            (ArgKind::Float, _) => "double",
            (ArgKind::String, _) => "string",
            (ArgKind::Pointer, _) => "pointer",
        }
    }

    /// Parse the spelling produced by [`TypeTag::name`] (plus a few aliases).
    pub fn from_name(name: &str) -> Option<Self> {
        let tag = match name.trim() {
            "int" | "i" | "char" => TypeTag::INT,
            "short" | "h" => TypeTag::HALF,
            "long" | "l" => TypeTag::LONG,
            "long long" | "longlong" | "ll" => TypeTag::LONG_LONG,
            "double" | "f" => TypeTag::DOUBLE,
            "long double" | "longdouble" | "L" => TypeTag::LONG_DOUBLE,
            "string" | "str" | "s" => TypeTag::STRING,
            "pointer" | "ptr" | "p" => TypeTag::POINTER,
            _ => return None,
        };
        Some(tag)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One formatting argument.
///
/// `Int` is C's promoted `int`; a `short` passed through a variadic list
/// arrives as `Int` too, `Half` exists for callers that want the narrower
/// tag recorded explicitly. `LongDouble` holds an `f64`: the engine never
/// inspects the representation, only the tag differs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'a> {
    Int(i32),
    Half(i16),
    Long(i64),
    LongLong(i64),
    Double(f64),
    LongDouble(f64),
    Str(&'a [u8]),
    Ptr(usize),
}

impl<'a> Arg<'a> {
    pub fn tag(&self) -> TypeTag {
        match self {
            Arg::Int(_) => TypeTag::INT,
            Arg::Half(_) => TypeTag::HALF,
            Arg::Long(_) => TypeTag::LONG,
            Arg::LongLong(_) => TypeTag::LONG_LONG,
            Arg::Double(_) => TypeTag::DOUBLE,
            Arg::LongDouble(_) => TypeTag::LONG_DOUBLE,
            Arg::Str(_) => TypeTag::STRING,
            Arg::Ptr(_) => TypeTag::POINTER,
        }
    }

    /// Whether this value may be read for `wanted`, following C's default
    /// argument promotions for `short`.
    pub fn satisfies(&self, wanted: TypeTag) -> bool {
        let have = self.tag();
        have == wanted
            || matches!(
                (have, wanted),
                (TypeTag::HALF, TypeTag::INT) | (TypeTag::INT, TypeTag::HALF)
            )
    }
}

macro_rules! arg_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl<'a> From<$ty> for Arg<'a> {
                fn from($v: $ty) -> Self {
                    $body
                }
            }
        )*
    };
}

arg_from! {
    i32 => |v| Arg::Int(v),
    u32 => |v| Arg::Int(v as i32),
    u8 => |v| Arg::Int(i32::from(v)),
    i8 => |v| Arg::Int(i32::from(v)),
    char => |v| Arg::Int(u32::from(v) as i32),
    i16 => |v| Arg::Half(v),
    u16 => |v| Arg::Half(v as i16),
    i64 => |v| Arg::Long(v),
    u64 => |v| Arg::Long(v as i64),
    isize => |v| Arg::Long(v as i64),
    f64 => |v| Arg::Double(v),
    f32 => |v| Arg::Double(f64::from(v)),
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(s: &'a str) -> Self {
        Arg::Str(s.as_bytes())
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(s: &'a String) -> Self {
        Arg::Str(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(s: &'a [u8]) -> Self {
        Arg::Str(s)
    }
}

impl<'a, T> From<*const T> for Arg<'a> {
    fn from(p: *const T) -> Self {
        Arg::Ptr(p as usize)
    }
}

impl<'a, T> From<*mut T> for Arg<'a> {
    fn from(p: *mut T) -> Self {
        Arg::Ptr(p as usize)
    }
}

/// Sequential reader over a caller-owned argument slice.
///
/// Every `next*` call consumes exactly one argument, whether or not the
/// value ends up reaching the sink. The cursor may be reused across calls.
#[derive(Debug, Clone)]
pub struct ArgCursor<'a> {
    args: &'a [Arg<'a>],
    pos: usize,
}

impl<'a> ArgCursor<'a> {
    pub fn new(args: &'a [Arg<'a>]) -> Self {
        Self { args, pos: 0 }
    }

    /// Index of the next argument to be consumed.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.args.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.args.len()
    }

    /// Consume the next argument, which must satisfy `wanted`.
    pub fn next(&mut self, wanted: TypeTag) -> Result<Arg<'a>, FormatError> {
        let index = self.pos;
        let arg = *self
            .args
            .get(index)
            .ok_or(FormatError::MissingArgument { index, wanted })?;
        self.pos += 1;
        if !arg.satisfies(wanted) {
            return Err(FormatError::ArgumentMismatch {
                index,
                wanted,
                found: arg.tag(),
            });
        }
        Ok(arg)
    }

    fn mismatch(&self, wanted: TypeTag, found: Arg<'_>) -> FormatError {
        FormatError::ArgumentMismatch {
            index: self.pos.saturating_sub(1),
            wanted,
            found: found.tag(),
        }
    }

    /// Read an integer at the width `size` selects, sign-extended to 64 bits.
    ///
    /// Half-sized reads return the promoted `int` value; narrowing is up to
    /// the converter.
    pub fn next_signed(&mut self, size: ArgSize) -> Result<i64, FormatError> {
        let wanted = TypeTag::new(ArgKind::Integer, size);
        match self.next(wanted)? {
            Arg::Int(v) => Ok(i64::from(v)),
            Arg::Half(v) => Ok(i64::from(v)),
            Arg::Long(v) | Arg::LongLong(v) => Ok(v),
            other => Err(self.mismatch(wanted, other)),
        }
    }

    /// Read an integer at the width `size` selects, reinterpreting its bits
    /// as unsigned at that width.
    pub fn next_unsigned(&mut self, size: ArgSize) -> Result<u64, FormatError> {
        let wanted = TypeTag::new(ArgKind::Integer, size);
        match self.next(wanted)? {
            Arg::Int(v) => Ok(u64::from(v as u32)),
            Arg::Half(v) => Ok(u64::from(i32::from(v) as u32)),
            Arg::Long(v) | Arg::LongLong(v) => Ok(v as u64),
            other => Err(self.mismatch(wanted, other)),
        }
    }

    /// Read a floating value; `ArgSize::LongDouble` selects a long double.
    pub fn next_float(&mut self, size: ArgSize) -> Result<f64, FormatError> {
        let wanted = if size == ArgSize::LongDouble {
            TypeTag::LONG_DOUBLE
        } else {
            TypeTag::DOUBLE
        };
        match self.next(wanted)? {
            Arg::Double(v) | Arg::LongDouble(v) => Ok(v),
            other => Err(self.mismatch(wanted, other)),
        }
    }

    pub fn next_str(&mut self) -> Result<&'a [u8], FormatError> {
        match self.next(TypeTag::STRING)? {
            Arg::Str(s) => Ok(s),
            other => Err(self.mismatch(TypeTag::STRING, other)),
        }
    }

    pub fn next_pointer(&mut self) -> Result<usize, FormatError> {
        match self.next(TypeTag::POINTER)? {
            Arg::Ptr(p) => Ok(p),
            other => Err(self.mismatch(TypeTag::POINTER, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_consumes_in_order() {
        let args = [Arg::Int(1), Arg::Str(b"two"), Arg::Double(3.0)];
        let mut cur = ArgCursor::new(&args);
        assert_eq!(cur.next_signed(ArgSize::Default).unwrap(), 1);
        assert_eq!(cur.next_str().unwrap(), b"two");
        assert_eq!(cur.next_float(ArgSize::Default).unwrap(), 3.0);
        assert!(cur.is_exhausted());
        assert_eq!(cur.position(), 3);
    }

    #[test]
    fn missing_argument_is_reported_with_index() {
        let args = [Arg::Int(1)];
        let mut cur = ArgCursor::new(&args);
        cur.next_signed(ArgSize::Default).unwrap();
        let err = cur.next_str().unwrap_err();
        assert!(matches!(
            err,
            FormatError::MissingArgument {
                index: 1,
                wanted: TypeTag::STRING
            }
        ));
    }

    #[test]
    fn mismatch_still_advances() {
        let args = [Arg::Double(1.0), Arg::Int(7)];
        let mut cur = ArgCursor::new(&args);
        let err = cur.next_signed(ArgSize::Default).unwrap_err();
        assert!(matches!(
            err,
            FormatError::ArgumentMismatch {
                index: 0,
                wanted: TypeTag::INT,
                found: TypeTag::DOUBLE
            }
        ));
        assert_eq!(cur.position(), 1);
    }

    #[test]
    fn short_promotes_to_int_and_back() {
        let args = [Arg::Half(-2), Arg::Int(70_000)];
        let mut cur = ArgCursor::new(&args);
        assert_eq!(cur.next_signed(ArgSize::Default).unwrap(), -2);
        assert_eq!(cur.next_signed(ArgSize::Half).unwrap(), 70_000);
    }

    #[test]
    fn unsigned_reads_reinterpret_at_width() {
        let args = [Arg::Int(-1), Arg::Long(-1), Arg::Half(-1)];
        let mut cur = ArgCursor::new(&args);
        assert_eq!(cur.next_unsigned(ArgSize::Default).unwrap(), u64::from(u32::MAX));
        assert_eq!(cur.next_unsigned(ArgSize::Long).unwrap(), u64::MAX);
        assert_eq!(cur.next_unsigned(ArgSize::Half).unwrap(), u64::from(u32::MAX));
    }

    #[test]
    fn long_double_requires_explicit_size() {
        let args = [Arg::Double(1.0), Arg::LongDouble(2.0)];
        let mut cur = ArgCursor::new(&args);
        assert!(cur.next_float(ArgSize::LongDouble).is_err());
        let mut cur = ArgCursor::new(&args[1..]);
        assert_eq!(cur.next_float(ArgSize::LongDouble).unwrap(), 2.0);
    }

    #[test]
    fn conversions_pick_expected_variants() {
        assert_eq!(Arg::from(5u8), Arg::Int(5));
        assert_eq!(Arg::from('A'), Arg::Int(65));
        assert_eq!(Arg::from(u32::MAX), Arg::Int(-1));
        assert_eq!(Arg::from(3i16), Arg::Half(3));
        assert_eq!(Arg::from(9i64), Arg::Long(9));
        assert_eq!(Arg::from("hi"), Arg::Str(b"hi"));
        assert_eq!(Arg::from(std::ptr::null::<u8>()), Arg::Ptr(0));
    }

    #[test]
    fn tag_names_round_trip() {
        for tag in [
            TypeTag::INT,
            TypeTag::HALF,
            TypeTag::LONG,
            TypeTag::LONG_LONG,
            TypeTag::DOUBLE,
            TypeTag::LONG_DOUBLE,
            TypeTag::STRING,
            TypeTag::POINTER,
        ] {
            assert_eq!(TypeTag::from_name(tag.name()), Some(tag));
        }
        assert_eq!(TypeTag::from_name("quad"), None);
    }
}
