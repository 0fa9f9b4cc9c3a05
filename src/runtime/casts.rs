//! Conversions between the primitive kinds.
//!
//! [`cast`] is total over every ordered pair of [`CastKind`]s, allocates
//! exactly one new value and never releases its input. Fixed-width targets
//! keep the low-order bits of the source's two's-complement pattern; text
//! sources are read with C `strtoll`/`strtod` prefix rules and fall back to
//! zero. [`try_cast`] is the strict counterpart for callers that need to
//! reject malformed text.
//!
//! The 72 `cast_<src>_to_<dst>` functions are the named entry points
//! generated code calls; each expects a value of its source kind.

use std::fmt;

use serde::Serialize;

use crate::runtime::{
    config,
    error::RuntimeError,
    integer::{BigIntBackend, Integer},
    kind::ValueKind,
    make::{
        make_bits8, make_bits16, make_bits32, make_bits64, make_char, make_double, make_int,
        make_integer_from, make_string,
    },
    parse::{parse_f64_prefix, parse_i64_prefix, strip_ascii_space},
    value::{Payload, Value},
};

/// Kinds that take part in the cast matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CastKind {
    Int,
    Double,
    Char,
    String,
    Bits8,
    Bits16,
    Bits32,
    Bits64,
    Integer,
}

impl CastKind {
    pub const ALL: [CastKind; 9] = [
        CastKind::Int,
        CastKind::Double,
        CastKind::Char,
        CastKind::String,
        CastKind::Bits8,
        CastKind::Bits16,
        CastKind::Bits32,
        CastKind::Bits64,
        CastKind::Integer,
    ];

    pub fn value_kind(self) -> ValueKind {
        match self {
            CastKind::Int => ValueKind::Int,
            CastKind::Double => ValueKind::Double,
            CastKind::Char => ValueKind::Char,
            CastKind::String => ValueKind::String,
            CastKind::Bits8 => ValueKind::Bits8,
            CastKind::Bits16 => ValueKind::Bits16,
            CastKind::Bits32 => ValueKind::Bits32,
            CastKind::Bits64 => ValueKind::Bits64,
            CastKind::Integer => ValueKind::Integer,
        }
    }

    /// `None` for kinds outside the matrix.
    pub fn of(kind: ValueKind) -> Option<CastKind> {
        CastKind::ALL.into_iter().find(|cast| cast.value_kind() == kind)
    }
}

impl fmt::Display for CastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value_kind().label())
    }
}

/// Borrowed view of a castable payload.
#[derive(Clone, Copy)]
enum Source<'a> {
    Int(i64),
    Double(f64),
    Char(u8),
    Text(&'a [u8]),
    /// Any unsigned bit pattern, zero-extended.
    Bits(u64),
    Integer(&'a Integer),
}

impl<'a> Source<'a> {
    fn of(value: &'a Value) -> Option<Source<'a>> {
        Some(match value.payload() {
            Payload::Int(v) => Source::Int(*v),
            Payload::Double(v) => Source::Double(*v),
            Payload::Char(v) => Source::Char(*v),
            Payload::String(_) => Source::Text(value.as_bytes()?),
            Payload::Bits8(v) => Source::Bits(u64::from(*v)),
            Payload::Bits16(v) => Source::Bits(u64::from(*v)),
            Payload::Bits32(v) => Source::Bits(u64::from(*v)),
            Payload::Bits64(v) => Source::Bits(*v),
            Payload::Integer(v) => Source::Integer(v),
            Payload::Constructor(_)
            | Payload::Closure(_)
            | Payload::Arglist(_)
            | Payload::Pointer(_)
            | Payload::GcPointer(_)
            | Payload::Buffer(_)
            | Payload::Array(_)
            | Payload::World => return None,
        })
    }

    /// The low 64 bits of the source as a two's-complement word.
    fn word(self, target: CastKind) -> u64 {
        match self {
            Source::Int(v) => v as u64,
            // `as i128` saturates and maps NaN to zero.
            Source::Double(v) => v.trunc() as i128 as u64,
            Source::Char(v) => u64::from(v),
            Source::Text(text) => {
                let parsed = parse_i64_prefix(text);
                if !parsed.exact {
                    lossy(text, target);
                }
                parsed.value as u64
            }
            Source::Bits(v) => v,
            Source::Integer(v) => v.low_bits(64),
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Source::Int(v) => v as f64,
            Source::Double(v) => v,
            Source::Char(v) => f64::from(v),
            Source::Text(text) => {
                let parsed = parse_f64_prefix(text);
                if !parsed.exact {
                    lossy(text, CastKind::Double);
                }
                parsed.value
            }
            Source::Bits(v) => v as f64,
            Source::Integer(v) => v.to_f64(),
        }
    }

    fn to_integer(self) -> Integer {
        match self {
            Source::Int(v) => Integer::from_i64(v),
            Source::Double(v) => <Integer as BigIntBackend>::from_f64(v),
            Source::Char(v) => Integer::from_u64(u64::from(v)),
            Source::Text(text) => match Integer::from_decimal(&strip_ascii_space(text)) {
                Some(v) => v,
                None => {
                    lossy(text, CastKind::Integer);
                    Integer::zero()
                }
            },
            Source::Bits(v) => Integer::from_u64(v),
            Source::Integer(v) => v.clone(),
        }
    }

    fn to_text(self) -> Vec<u8> {
        match self {
            Source::Int(v) => v.to_string().into_bytes(),
            Source::Double(v) => format_fixed(v).into_bytes(),
            Source::Char(v) => vec![v],
            Source::Text(text) => text.to_vec(),
            Source::Bits(v) => v.to_string().into_bytes(),
            Source::Integer(v) => v.to_decimal().into_bytes(),
        }
    }

    fn to_char(self) -> u8 {
        match self {
            // The first byte, or the terminator of an empty string.
            Source::Text(text) => text.first().copied().unwrap_or(0),
            other => other.word(CastKind::Char) as u8,
        }
    }

    fn convert(self, target: CastKind) -> Value {
        match target {
            CastKind::Int => make_int(self.word(target) as i64),
            CastKind::Double => make_double(self.to_f64()),
            CastKind::Char => make_char(self.to_char()),
            CastKind::String => make_string(self.to_text()),
            CastKind::Bits8 => make_bits8(self.word(target) as u8),
            CastKind::Bits16 => make_bits16(self.word(target) as u16),
            CastKind::Bits32 => make_bits32(self.word(target) as u32),
            CastKind::Bits64 => make_bits64(self.word(target)),
            CastKind::Integer => make_integer_from(self.to_integer()),
        }
    }
}

/// C `%f`: six fractional digits, no grouping.
fn format_fixed(value: f64) -> String {
    if value.is_nan() {
        return if value.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    format!("{:.6}", value)
}

fn lossy(text: &[u8], target: CastKind) {
    if config::current().warn_on_lossy_parse {
        log::warn!(
            target: "refc::casts",
            "lossy parse of {:?} as {}",
            String::from_utf8_lossy(text),
            target
        );
    }
}

/// Converts `value` to `target`, permissively.
///
/// Non-primitive inputs are a caller error: they are rejected by a debug
/// assertion and produce zero of the target kind otherwise.
pub fn cast(value: &Value, target: CastKind) -> Value {
    let source = Source::of(value);
    debug_assert!(source.is_some(), "{} values cannot be cast", value.kind());
    source.unwrap_or(Source::Int(0)).convert(target)
}

/// Strict conversion: text must be exactly a number in range of `target`.
///
/// Non-text sources convert as [`cast`] does.
pub fn try_cast(value: &Value, target: CastKind) -> Result<Value, RuntimeError> {
    let source = Source::of(value).ok_or(RuntimeError::NotCastable { kind: value.kind() })?;
    let Source::Text(text) = source else {
        return Ok(source.convert(target));
    };
    let malformed = || RuntimeError::MalformedText {
        text: String::from_utf8_lossy(text).into_owned(),
        target,
    };
    let digits = std::str::from_utf8(text).map_err(|_| malformed())?;
    Ok(match target {
        CastKind::String => make_string(text),
        CastKind::Char => match text {
            [byte] => make_char(*byte),
            _ => return Err(malformed()),
        },
        CastKind::Int => make_int(digits.parse().map_err(|_| malformed())?),
        CastKind::Double => make_double(digits.parse().map_err(|_| malformed())?),
        CastKind::Bits8 => make_bits8(digits.parse().map_err(|_| malformed())?),
        CastKind::Bits16 => make_bits16(digits.parse().map_err(|_| malformed())?),
        CastKind::Bits32 => make_bits32(digits.parse().map_err(|_| malformed())?),
        CastKind::Bits64 => make_bits64(digits.parse().map_err(|_| malformed())?),
        CastKind::Integer => {
            make_integer_from(Integer::from_decimal(digits).ok_or_else(malformed)?)
        }
    })
}

/// Invokes `$callback!` with one `rust_name, c_name, Source, Target;` row per
/// named cast.
macro_rules! for_each_named_cast {
    ($callback:ident) => {
        $callback! {
            cast_int_to_double, cast_Int_to_double, Int, Double;
            cast_int_to_char, cast_Int_to_char, Int, Char;
            cast_int_to_string, cast_Int_to_string, Int, String;
            cast_int_to_bits8, cast_Int_to_Bits8, Int, Bits8;
            cast_int_to_bits16, cast_Int_to_Bits16, Int, Bits16;
            cast_int_to_bits32, cast_Int_to_Bits32, Int, Bits32;
            cast_int_to_bits64, cast_Int_to_Bits64, Int, Bits64;
            cast_int_to_integer, cast_Int_to_Integer, Int, Integer;

            cast_double_to_int, cast_double_to_Int, Double, Int;
            cast_double_to_char, cast_double_to_char, Double, Char;
            cast_double_to_string, cast_double_to_string, Double, String;
            cast_double_to_bits8, cast_double_to_Bits8, Double, Bits8;
            cast_double_to_bits16, cast_double_to_Bits16, Double, Bits16;
            cast_double_to_bits32, cast_double_to_Bits32, Double, Bits32;
            cast_double_to_bits64, cast_double_to_Bits64, Double, Bits64;
            cast_double_to_integer, cast_double_to_Integer, Double, Integer;

            cast_char_to_int, cast_char_to_Int, Char, Int;
            cast_char_to_double, cast_char_to_double, Char, Double;
            cast_char_to_string, cast_char_to_string, Char, String;
            cast_char_to_bits8, cast_char_to_Bits8, Char, Bits8;
            cast_char_to_bits16, cast_char_to_Bits16, Char, Bits16;
            cast_char_to_bits32, cast_char_to_Bits32, Char, Bits32;
            cast_char_to_bits64, cast_char_to_Bits64, Char, Bits64;
            cast_char_to_integer, cast_char_to_Integer, Char, Integer;

            cast_string_to_int, cast_string_to_Int, String, Int;
            cast_string_to_double, cast_string_to_double, String, Double;
            cast_string_to_char, cast_string_to_char, String, Char;
            cast_string_to_bits8, cast_string_to_Bits8, String, Bits8;
            cast_string_to_bits16, cast_string_to_Bits16, String, Bits16;
            cast_string_to_bits32, cast_string_to_Bits32, String, Bits32;
            cast_string_to_bits64, cast_string_to_Bits64, String, Bits64;
            cast_string_to_integer, cast_string_to_Integer, String, Integer;

            cast_bits8_to_int, cast_Bits8_to_Int, Bits8, Int;
            cast_bits8_to_double, cast_Bits8_to_double, Bits8, Double;
            cast_bits8_to_char, cast_Bits8_to_char, Bits8, Char;
            cast_bits8_to_string, cast_Bits8_to_string, Bits8, String;
            cast_bits8_to_bits16, cast_Bits8_to_Bits16, Bits8, Bits16;
            cast_bits8_to_bits32, cast_Bits8_to_Bits32, Bits8, Bits32;
            cast_bits8_to_bits64, cast_Bits8_to_Bits64, Bits8, Bits64;
            cast_bits8_to_integer, cast_Bits8_to_Integer, Bits8, Integer;

            cast_bits16_to_int, cast_Bits16_to_Int, Bits16, Int;
            cast_bits16_to_double, cast_Bits16_to_double, Bits16, Double;
            cast_bits16_to_char, cast_Bits16_to_char, Bits16, Char;
            cast_bits16_to_string, cast_Bits16_to_string, Bits16, String;
            cast_bits16_to_bits8, cast_Bits16_to_Bits8, Bits16, Bits8;
            cast_bits16_to_bits32, cast_Bits16_to_Bits32, Bits16, Bits32;
            cast_bits16_to_bits64, cast_Bits16_to_Bits64, Bits16, Bits64;
            cast_bits16_to_integer, cast_Bits16_to_Integer, Bits16, Integer;

            cast_bits32_to_int, cast_Bits32_to_Int, Bits32, Int;
            cast_bits32_to_double, cast_Bits32_to_double, Bits32, Double;
            cast_bits32_to_char, cast_Bits32_to_char, Bits32, Char;
            cast_bits32_to_string, cast_Bits32_to_string, Bits32, String;
            cast_bits32_to_bits8, cast_Bits32_to_Bits8, Bits32, Bits8;
            cast_bits32_to_bits16, cast_Bits32_to_Bits16, Bits32, Bits16;
            cast_bits32_to_bits64, cast_Bits32_to_Bits64, Bits32, Bits64;
            cast_bits32_to_integer, cast_Bits32_to_Integer, Bits32, Integer;

            cast_bits64_to_int, cast_Bits64_to_Int, Bits64, Int;
            cast_bits64_to_double, cast_Bits64_to_double, Bits64, Double;
            cast_bits64_to_char, cast_Bits64_to_char, Bits64, Char;
            cast_bits64_to_string, cast_Bits64_to_string, Bits64, String;
            cast_bits64_to_bits8, cast_Bits64_to_Bits8, Bits64, Bits8;
            cast_bits64_to_bits16, cast_Bits64_to_Bits16, Bits64, Bits16;
            cast_bits64_to_bits32, cast_Bits64_to_Bits32, Bits64, Bits32;
            cast_bits64_to_integer, cast_Bits64_to_Integer, Bits64, Integer;

            cast_integer_to_int, cast_Integer_to_Int, Integer, Int;
            cast_integer_to_double, cast_Integer_to_double, Integer, Double;
            cast_integer_to_char, cast_Integer_to_char, Integer, Char;
            cast_integer_to_string, cast_Integer_to_string, Integer, String;
            cast_integer_to_bits8, cast_Integer_to_Bits8, Integer, Bits8;
            cast_integer_to_bits16, cast_Integer_to_Bits16, Integer, Bits16;
            cast_integer_to_bits32, cast_Integer_to_Bits32, Integer, Bits32;
            cast_integer_to_bits64, cast_Integer_to_Bits64, Integer, Bits64;
        }
    };
}

pub(crate) use for_each_named_cast;

macro_rules! named_casts {
    ($($name:ident, $c_name:ident, $src:ident, $dst:ident;)*) => {
        $(
            #[doc = concat!("`", stringify!($src), "` to `", stringify!($dst), "`.")]
            pub fn $name(value: &Value) -> Value {
                debug_assert_eq!(value.kind(), ValueKind::$src, stringify!($name));
                cast(value, CastKind::$dst)
            }
        )*

        /// Every named cast as `(source, target, function)`.
        pub const NAMED_CASTS: &[(CastKind, CastKind, fn(&Value) -> Value)] = &[
            $((CastKind::$src, CastKind::$dst, $name as fn(&Value) -> Value),)*
        ];
    };
}

for_each_named_cast!(named_casts);
