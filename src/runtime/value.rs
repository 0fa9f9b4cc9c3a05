use std::{ffi::c_void, fmt, rc::Rc};

use crate::runtime::{
    arglist::Arglist,
    array::Array,
    buffer::Buffer,
    closure::Closure,
    constructor::Constructor,
    error::RuntimeError,
    gc_pointer::GcPointer,
    integer::{BigIntBackend, Integer},
    kind::ValueKind,
    leak_detector,
};

/// Address of a resource the runtime does not own.
pub type RawPtr = *mut c_void;

/// Runtime value handed to and returned from compiled code.
///
/// ## Memory Management Model
///
/// Every value, scalars included, lives behind an `Rc`: the strong count is
/// the value's reference count. `Clone` is `newReference` and `Drop` is
/// `removeReference`, so a Rust caller cannot release a value twice or keep
/// using one it released.
///
/// When the last reference goes away the [`Object`] is reclaimed. Children of
/// composite payloads are released iteratively through a worklist, so
/// arbitrarily deep constructor chains tear down in constant stack space.
///
/// ### No-Cycle Invariant
///
/// Reference counting cannot reclaim cycles. Values are immutable once
/// shared; arrays are the only shared-mutable composite and storing an array
/// (directly or transitively) into itself leaks it.
#[derive(Clone)]
pub struct Value(pub(crate) Rc<Object>);

/// Heap cell behind a [`Value`]: the tag-bearing payload.
///
/// Opaque to C callers, which only ever hold `*const Object`.
pub struct Object {
    payload: Payload,
    /// Allocation-counter epoch this value was counted in, if any.
    counted: Option<u64>,
}

/// Payload of a value, one variant per [`ValueKind`].
#[derive(Debug)]
pub enum Payload {
    /// 64-bit signed integer. Booleans are `Int(0)` and `Int(1)`.
    Int(i64),
    Double(f64),
    /// One Latin-1 byte.
    Char(u8),
    /// Owned bytes; the text is everything before the first NUL.
    String(Box<[u8]>),
    Bits8(u8),
    Bits16(u16),
    Bits32(u32),
    Bits64(u64),
    Integer(Integer),
    Constructor(Constructor),
    Closure(Closure),
    Arglist(Arglist),
    Pointer(RawPtr),
    GcPointer(GcPointer),
    Buffer(Buffer),
    Array(Array),
    World,
}

impl Payload {
    pub fn kind(&self) -> ValueKind {
        match self {
            Payload::Int(_) => ValueKind::Int,
            Payload::Double(_) => ValueKind::Double,
            Payload::Char(_) => ValueKind::Char,
            Payload::String(_) => ValueKind::String,
            Payload::Bits8(_) => ValueKind::Bits8,
            Payload::Bits16(_) => ValueKind::Bits16,
            Payload::Bits32(_) => ValueKind::Bits32,
            Payload::Bits64(_) => ValueKind::Bits64,
            Payload::Integer(_) => ValueKind::Integer,
            Payload::Constructor(_) => ValueKind::Constructor,
            Payload::Closure(_) => ValueKind::Closure,
            Payload::Arglist(_) => ValueKind::Arglist,
            Payload::Pointer(_) => ValueKind::Pointer,
            Payload::GcPointer(_) => ValueKind::GcPointer,
            Payload::Buffer(_) => ValueKind::Buffer,
            Payload::Array(_) => ValueKind::Array,
            Payload::World => ValueKind::World,
        }
    }

    /// Moves every owned child into `out`, leaving the payload childless.
    ///
    /// Foreign pointers keep their finalizer: it must run when the pointer
    /// itself is reclaimed.
    fn drain_children(&mut self, out: &mut Vec<Value>) {
        match self {
            Payload::Constructor(constructor) => constructor.drain_into(out),
            Payload::Closure(closure) => closure.drain_into(out),
            Payload::Arglist(arglist) => arglist.drain_into(out),
            Payload::Array(array) => array.drain_into(out),
            Payload::Int(_)
            | Payload::Double(_)
            | Payload::Char(_)
            | Payload::String(_)
            | Payload::Bits8(_)
            | Payload::Bits16(_)
            | Payload::Bits32(_)
            | Payload::Bits64(_)
            | Payload::Integer(_)
            | Payload::Pointer(_)
            | Payload::GcPointer(_)
            | Payload::Buffer(_)
            | Payload::World => {}
        }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        let kind = self.payload.kind();
        leak_detector::record_free(kind, self.counted);
        if !kind.is_composite() {
            return;
        }

        let mut pending = Vec::new();
        self.payload.drain_children(&mut pending);
        if pending.is_empty() {
            return;
        }
        log::trace!(
            target: "refc::teardown",
            "reclaiming {} with {} children",
            kind,
            pending.len()
        );

        // Children we hold the last reference to are unwrapped and drained
        // here, so each nested `Object::drop` finds nothing left to release.
        while let Some(child) = pending.pop() {
            if let Ok(mut object) = Rc::try_unwrap(child.0) {
                object.payload.drain_children(&mut pending);
            }
        }
    }
}

impl Value {
    /// Allocates a value holding the single reference returned to the caller.
    pub(crate) fn new(payload: Payload) -> Self {
        let counted = leak_detector::record_alloc(payload.kind());
        Value(Rc::new(Object { payload, counted }))
    }

    pub fn kind(&self) -> ValueKind {
        self.0.payload.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.0.payload
    }

    /// Canonical runtime type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.kind().label()
    }

    pub fn reference_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// `true` when this handle is the only reference.
    pub fn is_unique(&self) -> bool {
        Rc::strong_count(&self.0) == 1
    }

    /// Identity comparison: both handles refer to the same allocation.
    pub fn ptr_eq(a: &Value, b: &Value) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.payload() {
            Payload::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self.payload() {
            Payload::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<u8> {
        match self.payload() {
            Payload::Char(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bits8(&self) -> Option<u8> {
        match self.payload() {
            Payload::Bits8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bits16(&self) -> Option<u16> {
        match self.payload() {
            Payload::Bits16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bits32(&self) -> Option<u32> {
        match self.payload() {
            Payload::Bits32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bits64(&self) -> Option<u64> {
        match self.payload() {
            Payload::Bits64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&Integer> {
        match self.payload() {
            Payload::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Text bytes of a string value, up to the first NUL.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self.payload() {
            Payload::String(bytes) => Some(c_text(bytes)),
            _ => None,
        }
    }

    /// Text of a string value when it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_constructor(&self) -> Option<&Constructor> {
        match self.payload() {
            Payload::Constructor(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&Closure> {
        match self.payload() {
            Payload::Closure(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_arglist(&self) -> Option<&Arglist> {
        match self.payload() {
            Payload::Arglist(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<RawPtr> {
        match self.payload() {
            Payload::Pointer(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_gc_pointer(&self) -> Option<&GcPointer> {
        match self.payload() {
            Payload::GcPointer(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_buffer(&self) -> Option<&Buffer> {
        match self.payload() {
            Payload::Buffer(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self.payload() {
            Payload::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_world(&self) -> bool {
        matches!(self.payload(), Payload::World)
    }

    /// Writable storage of a string built with `make_empty_string`.
    ///
    /// Only available while this handle is the sole reference.
    pub fn string_bytes_mut(&mut self) -> Option<&mut [u8]> {
        match Rc::get_mut(&mut self.0).map(|object| &mut object.payload) {
            Some(Payload::String(bytes)) => Some(&mut bytes[..]),
            _ => None,
        }
    }

    /// Stores `value` into slot `index` of a freshly built composite.
    ///
    /// Constructors and arrays accept any slot; arglists accept only their
    /// pre-supplied prefix (`total - missing` slots). The composite must not
    /// have been shared yet. A previously stored child is released.
    pub fn fill_slot(&mut self, index: usize, value: Value) -> Result<(), RuntimeError> {
        let kind = self.kind();
        if !kind.is_composite() || kind == ValueKind::Closure {
            return Err(RuntimeError::NotComposite { kind });
        }
        // Arrays are shared-mutable and take the interior path.
        if let Payload::Array(array) = self.payload() {
            return array.set(index, value);
        }
        let object = Rc::get_mut(&mut self.0).ok_or(RuntimeError::SharedComposite { kind })?;
        match &mut object.payload {
            Payload::Constructor(constructor) => constructor.fill(index, value),
            Payload::Arglist(arglist) => arglist.fill_prefix(index, value),
            _ => Err(RuntimeError::NotComposite { kind }),
        }
    }

    /// Hands the reference to C code as an opaque pointer.
    pub fn into_raw(self) -> *const Object {
        Rc::into_raw(self.0)
    }

    /// Reclaims a reference previously produced by [`Value::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `into_raw` (or a C entry point returning a value)
    /// and the reference it stands for must not have been released yet.
    pub unsafe fn from_raw(ptr: *const Object) -> Self {
        Value(unsafe { Rc::from_raw(ptr) })
    }

    pub fn as_ptr(&self) -> *const Object {
        Rc::as_ptr(&self.0)
    }
}

pub(crate) fn c_text(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("refs", &self.reference_count())
            .field("payload", self.payload())
            .finish()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Payload::Int(v) => write!(f, "{}", v),
            Payload::Double(v) => write!(f, "{}", v),
            Payload::Char(v) => write!(f, "{:?}", char::from(*v)),
            Payload::String(bytes) => write!(f, "\"{}\"", String::from_utf8_lossy(c_text(bytes))),
            Payload::Bits8(v) => write!(f, "{}", v),
            Payload::Bits16(v) => write!(f, "{}", v),
            Payload::Bits32(v) => write!(f, "{}", v),
            Payload::Bits64(v) => write!(f, "{}", v),
            Payload::Integer(v) => f.write_str(&v.to_decimal()),
            Payload::Constructor(c) => write!(f, "{}", c),
            Payload::Closure(c) => write!(f, "<closure {}/{}>", c.arglist().filled(), c.arglist().total()),
            Payload::Arglist(a) => write!(f, "<arglist {}/{}>", a.filled(), a.total()),
            Payload::Pointer(p) => write!(f, "<pointer {:p}>", *p),
            Payload::GcPointer(p) => write!(f, "<gc pointer {:p}>", p.raw()),
            Payload::Buffer(b) => write!(f, "<buffer {}>", b.len()),
            Payload::Array(a) => write!(f, "<array {}>", a.len()),
            Payload::World => f.write_str("<world>"),
        }
    }
}
