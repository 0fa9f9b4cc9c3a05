use std::fmt;

use serde::Serialize;

/// Discriminant of a runtime value's payload.
///
/// The set is closed: every [`Value`](crate::runtime::value::Value) carries
/// exactly one of these tags for its whole lifetime. The `u8` representation
/// is what the C entry points report through `valueTag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum ValueKind {
    Int = 0,
    Double = 1,
    Char = 2,
    String = 3,
    Bits8 = 4,
    Bits16 = 5,
    Bits32 = 6,
    Bits64 = 7,
    Integer = 8,
    Constructor = 9,
    Closure = 10,
    Arglist = 11,
    Pointer = 12,
    GcPointer = 13,
    Buffer = 14,
    Array = 15,
    World = 16,
}

impl ValueKind {
    pub const COUNT: usize = 17;

    /// All variants for iteration, in tag order.
    pub const ALL: [ValueKind; Self::COUNT] = [
        ValueKind::Int,
        ValueKind::Double,
        ValueKind::Char,
        ValueKind::String,
        ValueKind::Bits8,
        ValueKind::Bits16,
        ValueKind::Bits32,
        ValueKind::Bits64,
        ValueKind::Integer,
        ValueKind::Constructor,
        ValueKind::Closure,
        ValueKind::Arglist,
        ValueKind::Pointer,
        ValueKind::GcPointer,
        ValueKind::Buffer,
        ValueKind::Array,
        ValueKind::World,
    ];

    /// Canonical label used in diagnostics and error messages.
    pub fn label(self) -> &'static str {
        match self {
            ValueKind::Int => "Int",
            ValueKind::Double => "Double",
            ValueKind::Char => "Char",
            ValueKind::String => "String",
            ValueKind::Bits8 => "Bits8",
            ValueKind::Bits16 => "Bits16",
            ValueKind::Bits32 => "Bits32",
            ValueKind::Bits64 => "Bits64",
            ValueKind::Integer => "Integer",
            ValueKind::Constructor => "Constructor",
            ValueKind::Closure => "Closure",
            ValueKind::Arglist => "Arglist",
            ValueKind::Pointer => "Pointer",
            ValueKind::GcPointer => "GCPointer",
            ValueKind::Buffer => "Buffer",
            ValueKind::Array => "Array",
            ValueKind::World => "World",
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for kinds that own child values.
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            ValueKind::Constructor | ValueKind::Closure | ValueKind::Arglist | ValueKind::Array
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
