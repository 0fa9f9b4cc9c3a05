//! Smart constructors for every value kind.
//!
//! Each function allocates a fresh value and returns the single reference to
//! it. Composite constructors only reserve slots; the caller fills them with
//! [`Value::fill_slot`] before sharing the value.

use crate::runtime::{
    arglist::Arglist,
    array::Array,
    buffer::Buffer,
    constructor::Constructor,
    gc_pointer::GcPointer,
    integer::{BigIntBackend, Integer},
    kind::ValueKind,
    parse::strip_ascii_space,
    value::{Payload, RawPtr, Value},
};

pub fn make_int(value: i64) -> Value {
    Value::new(Payload::Int(value))
}

pub fn make_bool(value: bool) -> Value {
    make_int(i64::from(value))
}

pub fn make_double(value: f64) -> Value {
    Value::new(Payload::Double(value))
}

pub fn make_char(value: u8) -> Value {
    Value::new(Payload::Char(value))
}

pub fn make_bits8(value: u8) -> Value {
    Value::new(Payload::Bits8(value))
}

pub fn make_bits16(value: u16) -> Value {
    Value::new(Payload::Bits16(value))
}

pub fn make_bits32(value: u32) -> Value {
    Value::new(Payload::Bits32(value))
}

pub fn make_bits64(value: u64) -> Value {
    Value::new(Payload::Bits64(value))
}

/// A zero-valued arbitrary-precision integer.
pub fn make_integer() -> Value {
    make_integer_from(Integer::zero())
}

pub fn make_integer_from(value: Integer) -> Value {
    Value::new(Payload::Integer(value))
}

/// Parses decimal text, ignoring whitespace. Malformed text yields zero.
pub fn make_integer_literal(text: &str) -> Value {
    let digits = strip_ascii_space(text.as_bytes());
    make_integer_from(Integer::from_decimal(&digits).unwrap_or_else(Integer::zero))
}

/// An `len`-byte zeroed string, terminator included, for in-place filling
/// through [`Value::string_bytes_mut`].
pub fn make_empty_string(len: usize) -> Value {
    Value::new(Payload::String(vec![0; len].into_boxed_slice()))
}

/// Copies `text` into a new string value.
pub fn make_string(text: impl AsRef<[u8]>) -> Value {
    Value::new(Payload::String(Box::from(text.as_ref())))
}

pub fn make_pointer(raw: RawPtr) -> Value {
    Value::new(Payload::Pointer(raw))
}

/// Wraps `raw` with the finalizer closure `on_collect`, which gains one
/// reference owned by the new value.
pub fn make_gc_pointer(raw: RawPtr, on_collect: &Value) -> Value {
    debug_assert_eq!(
        on_collect.kind(),
        ValueKind::Closure,
        "gc pointer finalizer must be a closure"
    );
    Value::new(Payload::GcPointer(GcPointer::new(raw, on_collect.clone())))
}

pub fn make_buffer(bytes: impl Into<Box<[u8]>>) -> Value {
    Value::new(Payload::Buffer(Buffer::new(bytes.into())))
}

/// An array of `len` empty slots.
pub fn make_array(len: usize) -> Value {
    Value::new(Payload::Array(Array::new(len)))
}

pub fn make_world() -> Value {
    Value::new(Payload::World)
}

/// A constructor with `total` unfilled fields.
pub fn new_constructor(total: usize, tag: i32, name: Option<&str>) -> Value {
    Value::new(Payload::Constructor(Constructor::new(total, tag, name)))
}

/// An arglist of arity `total` with `missing` arguments still to come.
pub fn new_arglist(missing: usize, total: usize) -> Value {
    Value::new(Payload::Arglist(Arglist::new(missing, total)))
}
