//! C entry points for natively compiled code.
//!
//! Symbol names match what the code generator emits. Values cross the
//! boundary as `*const Object`; a returned pointer carries one reference the
//! caller owns, and pointer arguments are borrowed unless documented as
//! consumed. Readers are the exception: the pointers they return are borrowed
//! from the value they inspect.
//!
//! # Safety
//!
//! Every pointer argument must be null (where allowed) or a live value
//! produced by one of these functions and not yet released. Strings passed as
//! `*const c_char` must be NUL-terminated.

#![allow(non_snake_case)]

use std::{
    ffi::{CStr, c_char, c_int, c_void},
    mem::ManuallyDrop,
    ptr, slice,
};

use crate::runtime::{
    casts::for_each_named_cast,
    closure::{NativeFunction, apply_closure, invoke_closure, make_native_closure_from_arglist},
    make,
    value::{Object, Value},
};

/// Views the value behind `ptr` without taking over its reference.
unsafe fn borrowed(ptr: *const Object) -> ManuallyDrop<Value> {
    ManuallyDrop::new(unsafe { Value::from_raw(ptr) })
}

unsafe fn c_bytes<'a>(text: *const c_char) -> &'a [u8] {
    if text.is_null() {
        return &[];
    }
    unsafe { CStr::from_ptr(text) }.to_bytes()
}

/// Applies `f` to the value behind `source`; `None` for null.
unsafe fn read<T>(source: *const Object, f: impl FnOnce(&Value) -> Option<T>) -> Option<T> {
    if source.is_null() {
        return None;
    }
    let value = unsafe { borrowed(source) };
    f(&value)
}

fn count(n: c_int) -> usize {
    usize::try_from(n).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Lifetime
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub unsafe extern "C" fn newReference(source: *const Object) -> *const Object {
    if source.is_null() {
        return ptr::null();
    }
    let value = unsafe { borrowed(source) };
    Value::clone(&value).into_raw()
}

/// Consumes one reference. Null is ignored.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn removeReference(source: *const Object) {
    if source.is_null() {
        return;
    }
    drop(unsafe { Value::from_raw(source) });
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn referenceCount(source: *const Object) -> usize {
    if source.is_null() {
        return 0;
    }
    unsafe { borrowed(source) }.reference_count()
}

/// Tag reported by `valueTag` for a null pointer.
pub const NULL_TAG: u8 = u8::MAX;

#[unsafe(no_mangle)]
pub unsafe extern "C" fn valueTag(source: *const Object) -> u8 {
    unsafe { read(source, |value| Some(value.kind().tag())) }.unwrap_or(NULL_TAG)
}

// ---------------------------------------------------------------------------
// Value constructors
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn makeDouble(d: f64) -> *const Object {
    make::make_double(d).into_raw()
}

#[unsafe(no_mangle)]
pub extern "C" fn makeChar(c: c_char) -> *const Object {
    make::make_char(c as u8).into_raw()
}

#[unsafe(no_mangle)]
pub extern "C" fn makeBits8(i: u8) -> *const Object {
    make::make_bits8(i).into_raw()
}

#[unsafe(no_mangle)]
pub extern "C" fn makeBits16(i: u16) -> *const Object {
    make::make_bits16(i).into_raw()
}

#[unsafe(no_mangle)]
pub extern "C" fn makeBits32(i: u32) -> *const Object {
    make::make_bits32(i).into_raw()
}

#[unsafe(no_mangle)]
pub extern "C" fn makeBits64(i: u64) -> *const Object {
    make::make_bits64(i).into_raw()
}

#[unsafe(no_mangle)]
pub extern "C" fn makeInt(i: i64) -> *const Object {
    make::make_int(i).into_raw()
}

#[unsafe(no_mangle)]
pub extern "C" fn makeBool(p: c_int) -> *const Object {
    make::make_bool(p != 0).into_raw()
}

#[unsafe(no_mangle)]
pub extern "C" fn makeInteger() -> *const Object {
    make::make_integer().into_raw()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn makeIntegerLiteral(text: *const c_char) -> *const Object {
    let text = String::from_utf8_lossy(unsafe { c_bytes(text) });
    make::make_integer_literal(&text).into_raw()
}

#[unsafe(no_mangle)]
pub extern "C" fn makeEmptyString(len: usize) -> *const Object {
    make::make_empty_string(len).into_raw()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn makeString(text: *const c_char) -> *const Object {
    make::make_string(unsafe { c_bytes(text) }).into_raw()
}

/// Writable bytes of a string value, or null when the value is shared or not
/// a string. Valid until the value is released or shared.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stringBuffer(string: *const Object) -> *mut u8 {
    let mut value = unsafe { borrowed(string) };
    match value.string_bytes_mut() {
        Some(bytes) => bytes.as_mut_ptr(),
        None => ptr::null_mut(),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn makePointer(raw: *mut c_void) -> *const Object {
    make::make_pointer(raw).into_raw()
}

/// `on_collect` is borrowed; the new value takes its own reference.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn makeGCPointer(raw: *mut c_void, on_collect: *const Object) -> *const Object {
    let on_collect = unsafe { borrowed(on_collect) };
    make::make_gc_pointer(raw, &on_collect).into_raw()
}

/// Copies `len` bytes from `bytes` into a new buffer. A null source gives
/// `len` zeroed bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn makeBufferFrom(bytes: *const u8, len: usize) -> *const Object {
    let contents: Box<[u8]> = if bytes.is_null() || len == 0 {
        vec![0; len].into_boxed_slice()
    } else {
        Box::from(unsafe { slice::from_raw_parts(bytes, len) })
    };
    make::make_buffer(contents).into_raw()
}

#[unsafe(no_mangle)]
pub extern "C" fn makeArray(length: c_int) -> *const Object {
    make::make_array(count(length)).into_raw()
}

#[unsafe(no_mangle)]
pub extern "C" fn makeWorld() -> *const Object {
    make::make_world().into_raw()
}

#[unsafe(no_mangle)]
pub extern "C" fn newArglist(missing: c_int, total: c_int) -> *const Object {
    make::new_arglist(count(missing), count(total)).into_raw()
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn newConstructor(total: c_int, tag: c_int, name: *const c_char) -> *const Object {
    let name = (!name.is_null()).then(|| String::from_utf8_lossy(unsafe { c_bytes(name) }));
    make::new_constructor(count(total), tag, name.as_deref()).into_raw()
}

/// Copies `arglist`; null when it is not an arglist.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn makeClosureFromArglist(
    function: NativeFunction,
    arglist: *const Object,
) -> *const Object {
    let arglist = unsafe { borrowed(arglist) };
    match make_native_closure_from_arglist(function, &arglist) {
        Ok(closure) => closure.into_raw(),
        Err(err) => {
            log::error!(target: "refc::abi", "makeClosureFromArglist: {}", err);
            ptr::null()
        }
    }
}

/// Stores `value` into slot `index` of `composite`. The reference to `value`
/// is consumed whether or not the store succeeds. Returns 0 on success and -1
/// otherwise.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fillSlot(composite: *const Object, index: c_int, value: *const Object) -> c_int {
    let mut composite = unsafe { borrowed(composite) };
    let value = unsafe { Value::from_raw(value) };
    let Ok(index) = usize::try_from(index) else {
        return -1;
    };
    match composite.fill_slot(index, value) {
        Ok(()) => 0,
        Err(err) => {
            log::error!(target: "refc::abi", "fillSlot: {}", err);
            -1
        }
    }
}

// ---------------------------------------------------------------------------
// Readers
//
// Scalar readers return zero for null or for a value of another kind.
// Pointers handed out by readers are borrowed: they stay valid while the
// value they were read from is alive and must not be released.
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub unsafe extern "C" fn intValue(source: *const Object) -> i64 {
    unsafe { read(source, Value::as_int) }.unwrap_or(0)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn doubleValue(source: *const Object) -> f64 {
    unsafe { read(source, Value::as_double) }.unwrap_or(0.0)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn charValue(source: *const Object) -> c_char {
    let byte = unsafe { read(source, Value::as_char) }.unwrap_or(0);
    byte as c_char
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn bits8Value(source: *const Object) -> u8 {
    unsafe { read(source, Value::as_bits8) }.unwrap_or(0)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn bits16Value(source: *const Object) -> u16 {
    unsafe { read(source, Value::as_bits16) }.unwrap_or(0)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn bits32Value(source: *const Object) -> u32 {
    unsafe { read(source, Value::as_bits32) }.unwrap_or(0)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn bits64Value(source: *const Object) -> u64 {
    unsafe { read(source, Value::as_bits64) }.unwrap_or(0)
}

/// Text bytes of a string, up to its first NUL. The length is stored through
/// `len` when it is non-null. Null for anything but a string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stringBytes(source: *const Object, len: *mut usize) -> *const u8 {
    let text = unsafe { read(source, |value| value.as_bytes().map(|b| (b.as_ptr(), b.len()))) };
    let (bytes, n) = text.unwrap_or((ptr::null(), 0));
    if !len.is_null() {
        unsafe { *len = n };
    }
    bytes
}

/// Constructor tag, or -1 for anything but a constructor.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn constructorTag(source: *const Object) -> c_int {
    unsafe { read(source, |value| value.as_constructor().map(|c| c.tag())) }.unwrap_or(-1)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn constructorArity(source: *const Object) -> c_int {
    let arity = unsafe { read(source, |value| value.as_constructor().map(|c| c.arity())) };
    arity.map_or(-1, |n| c_int::try_from(n).unwrap_or(c_int::MAX))
}

/// Borrowed field `index`; null when out of range or unfilled.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn constructorField(source: *const Object, index: c_int) -> *const Object {
    let Ok(index) = usize::try_from(index) else {
        return ptr::null();
    };
    unsafe {
        read(source, |value| {
            value
                .as_constructor()
                .and_then(|c| c.field(index))
                .map(Value::as_ptr)
        })
    }
    .unwrap_or(ptr::null())
}

/// Borrowed argument `index` of an arglist, in application order; null when
/// not yet supplied.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn arglistArg(source: *const Object, index: c_int) -> *const Object {
    let Ok(index) = usize::try_from(index) else {
        return ptr::null();
    };
    unsafe {
        read(source, |value| {
            value
                .as_arglist()
                .and_then(|a| a.arg(index))
                .map(Value::as_ptr)
        })
    }
    .unwrap_or(ptr::null())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn arglistTotal(source: *const Object) -> c_int {
    let total = unsafe { read(source, |value| value.as_arglist().map(|a| a.total())) };
    total.map_or(-1, |n| c_int::try_from(n).unwrap_or(c_int::MAX))
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Applies `function` (borrowed) to `arg` (consumed). Returns the call's
/// result once the closure saturates and a longer closure otherwise; null on
/// failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn applyClosure(function: *const Object, arg: *const Object) -> *const Object {
    let arg = unsafe { Value::from_raw(arg) };
    if function.is_null() {
        return ptr::null();
    }
    let function = unsafe { borrowed(function) };
    match apply_closure(&function, arg) {
        Ok(result) => result.into_raw(),
        Err(err) => {
            log::error!(target: "refc::abi", "applyClosure: {}", err);
            ptr::null()
        }
    }
}

/// Calls a saturated closure (borrowed); null on failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn invokeClosure(function: *const Object) -> *const Object {
    if function.is_null() {
        return ptr::null();
    }
    let function = unsafe { borrowed(function) };
    match invoke_closure(&function) {
        Ok(result) => result.into_raw(),
        Err(err) => {
            log::error!(target: "refc::abi", "invokeClosure: {}", err);
            ptr::null()
        }
    }
}

// ---------------------------------------------------------------------------
// Casts
// ---------------------------------------------------------------------------

macro_rules! extern_casts {
    ($($name:ident, $c_name:ident, $src:ident, $dst:ident;)*) => {
        $(
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $c_name(input: *const Object) -> *const Object {
                let input = unsafe { borrowed(input) };
                crate::runtime::casts::$name(&input).into_raw()
            }
        )*
    };
}

for_each_named_cast!(extern_casts);
