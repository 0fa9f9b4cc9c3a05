#[path = "../support/mod.rs"]
mod support;

use std::{
    ffi::{CStr, c_char},
    mem::ManuallyDrop,
    ptr,
};

use refc::{
    abi::*,
    runtime::{Object, Value, ValueKind, make, new_closure},
};
use support::{assert_no_leaks, tracked};

/// Borrows a pointer for inspection without consuming its reference.
fn peek(ptr: *const Object) -> ManuallyDrop<Value> {
    assert!(!ptr.is_null());
    // SAFETY: every pointer passed here is a live value owned by the test.
    ManuallyDrop::new(unsafe { Value::from_raw(ptr) })
}

fn c(text: &CStr) -> *const c_char {
    text.as_ptr()
}

#[test]
fn reference_protocol_balances() {
    tracked(|| unsafe {
        let value = makeInt(5);
        let other = newReference(value);
        assert_eq!(value, other);
        assert_eq!(referenceCount(value), 2);

        removeReference(other);
        assert_eq!(referenceCount(value), 1);
        removeReference(value);
        removeReference(ptr::null());
        assert_no_leaks();
    });
}

#[test]
fn constructors_report_their_tags() {
    tracked(|| unsafe {
        let values = [
            (makeInt(1), ValueKind::Int),
            (makeDouble(1.5), ValueKind::Double),
            (makeChar(b'a' as c_char), ValueKind::Char),
            (makeBits8(1), ValueKind::Bits8),
            (makeBits16(1), ValueKind::Bits16),
            (makeBits32(1), ValueKind::Bits32),
            (makeBits64(1), ValueKind::Bits64),
            (makeBool(7), ValueKind::Int),
            (makeInteger(), ValueKind::Integer),
            (makeIntegerLiteral(c(c"123")), ValueKind::Integer),
            (makeString(c(c"hi")), ValueKind::String),
            (makeEmptyString(4), ValueKind::String),
            (makePointer(ptr::null_mut()), ValueKind::Pointer),
            (makeBufferFrom(b"abc".as_ptr(), 3), ValueKind::Buffer),
            (makeArray(2), ValueKind::Array),
            (makeWorld(), ValueKind::World),
            (newArglist(1, 2), ValueKind::Arglist),
            (newConstructor(2, 3, c(c"Pair")), ValueKind::Constructor),
        ];
        for (value, kind) in values {
            assert_eq!(valueTag(value), kind.tag());
            removeReference(value);
        }
        assert_no_leaks();
    });
}

#[test]
fn entry_points_match_the_rust_api() {
    unsafe {
        let literal = makeIntegerLiteral(c(c"-42"));
        assert_eq!(peek(literal).to_string(), make::make_integer_literal("-42").to_string());
        removeReference(literal);

        let flag = makeBool(-3);
        assert_eq!(peek(flag).as_int(), Some(1));
        removeReference(flag);

        let buffer = makeBufferFrom(b"xyz".as_ptr(), 3);
        assert_eq!(peek(buffer).as_buffer().map(|b| b.to_vec()), Some(b"xyz".to_vec()));
        removeReference(buffer);

        let pair = newConstructor(1, 9, ptr::null());
        let view = peek(pair);
        let constructor = view.as_constructor().unwrap();
        assert_eq!((constructor.tag(), constructor.name()), (9, None));
        removeReference(pair);
    }
}

#[test]
fn casts_match_the_rust_casts() {
    tracked(|| unsafe {
        let big = makeIntegerLiteral(c(c"300"));
        let byte = cast_Integer_to_Bits8(big);
        assert_eq!(peek(byte).as_bits8(), Some(44));

        let half = makeDouble(1.5);
        let shown = cast_double_to_string(half);
        assert_eq!(peek(shown).as_str(), Some("1.500000"));

        let a = makeChar(b'A' as c_char);
        let letter = cast_char_to_string(a);
        assert_eq!(peek(letter).as_str(), Some("A"));

        let text = makeString(c(c"  -17 apples"));
        let parsed = cast_string_to_Int(text);
        assert_eq!(peek(parsed).as_int(), Some(-17));
        assert_eq!(referenceCount(text), 1);

        for value in [big, byte, half, shown, a, letter, text, parsed] {
            removeReference(value);
        }
        assert_no_leaks();
    });
}

#[test]
fn strings_are_built_in_place() {
    tracked(|| unsafe {
        let string = makeEmptyString(4);
        let bytes = stringBuffer(string);
        assert!(!bytes.is_null());
        ptr::copy_nonoverlapping(b"abc".as_ptr(), bytes, 3);
        assert_eq!(peek(string).as_str(), Some("abc"));

        let shared = newReference(string);
        assert!(stringBuffer(string).is_null());
        removeReference(shared);

        let number = makeInt(0);
        assert!(stringBuffer(number).is_null());

        removeReference(number);
        removeReference(string);
        assert_no_leaks();
    });
}

#[test]
fn fill_slot_consumes_the_element() {
    tracked(|| unsafe {
        let pair = newConstructor(2, 1, c(c"Pair"));
        assert_eq!(fillSlot(pair, 0, makeInt(1)), 0);
        assert_eq!(fillSlot(pair, 1, makeString(c(c"two"))), 0);
        assert_eq!(fillSlot(pair, 2, makeInt(3)), -1);
        assert_eq!(fillSlot(pair, -1, makeInt(4)), -1);
        assert_eq!(peek(pair).to_string(), r#"Pair(1, "two")"#);

        let shared = newReference(pair);
        assert_eq!(fillSlot(pair, 0, makeInt(5)), -1);
        removeReference(shared);

        removeReference(pair);
        assert_no_leaks();
    });
}

unsafe extern "C" fn native_sub(arglist: *const Object) -> *const Object {
    unsafe {
        let lhs = intValue(arglistArg(arglist, 0));
        let rhs = intValue(arglistArg(arglist, 1));
        makeInt(lhs - rhs)
    }
}

#[test]
fn native_closures_run_through_the_rust_engine() {
    tracked(|| unsafe {
        let arglist = newArglist(0, 2);
        assert_eq!(fillSlot(arglist, 0, makeInt(50)), 0);
        assert_eq!(fillSlot(arglist, 1, makeInt(8)), 0);

        let closure = makeClosureFromArglist(native_sub, arglist);
        let result = invokeClosure(closure);
        assert_eq!(intValue(result), 42);
        removeReference(result);

        let world = makeWorld();
        assert!(makeClosureFromArglist(native_sub, world).is_null());

        for value in [world, arglist, closure] {
            removeReference(value);
        }
        assert_no_leaks();
    });
}

#[test]
fn finalizers_run_for_c_handles() {
    tracked(|| unsafe {
        let finalizer = new_closure(|_| make::make_world(), 1).into_raw();
        let handle = makeGCPointer(0x10 as *mut _, finalizer);
        assert_eq!(referenceCount(finalizer), 2);

        removeReference(handle);
        assert_eq!(referenceCount(finalizer), 1);
        removeReference(finalizer);
        assert_no_leaks();
    });
}

#[test]
fn null_has_its_own_tag() {
    unsafe {
        assert_eq!(valueTag(ptr::null()), NULL_TAG);
    }
    assert!(ValueKind::ALL.iter().all(|kind| kind.tag() != NULL_TAG));
}

#[test]
fn buffers_copy_their_source() {
    tracked(|| unsafe {
        let mut source = *b"xyz";
        let buffer = makeBufferFrom(source.as_ptr(), source.len());
        source[0] = b'!';
        assert_eq!(peek(buffer).as_buffer().map(|b| b.to_vec()), Some(b"xyz".to_vec()));

        let zeroed = makeBufferFrom(ptr::null(), 2);
        assert_eq!(peek(zeroed).as_buffer().map(|b| b.to_vec()), Some(vec![0, 0]));

        removeReference(buffer);
        removeReference(zeroed);
        assert_no_leaks();
    });
}

#[test]
fn readers_see_scalar_payloads() {
    tracked(|| unsafe {
        let values = [
            makeInt(-7),
            makeDouble(2.5),
            makeChar(b'q' as c_char),
            makeBits8(200),
            makeBits16(60_000),
            makeBits32(4_000_000_000),
            makeBits64(u64::MAX),
        ];
        let [int, double, ch, b8, b16, b32, b64] = values;
        assert_eq!(intValue(int), -7);
        assert_eq!(doubleValue(double), 2.5);
        assert_eq!(charValue(ch), b'q' as c_char);
        assert_eq!(bits8Value(b8), 200);
        assert_eq!(bits16Value(b16), 60_000);
        assert_eq!(bits32Value(b32), 4_000_000_000);
        assert_eq!(bits64Value(b64), u64::MAX);

        assert_eq!(intValue(double), 0);
        assert_eq!(bits64Value(ptr::null()), 0);

        for value in values {
            removeReference(value);
        }
        assert_no_leaks();
    });
}

#[test]
fn readers_borrow_strings_and_fields() {
    tracked(|| unsafe {
        let text = makeString(c(c"hello"));
        let mut len = usize::MAX;
        let bytes = stringBytes(text, &mut len);
        assert_eq!(std::slice::from_raw_parts(bytes, len), b"hello");

        let number = makeInt(1);
        assert!(stringBytes(number, &mut len).is_null());
        assert_eq!(len, 0);

        let pair = newConstructor(2, 4, c(c"Pair"));
        assert_eq!(fillSlot(pair, 0, newReference(text)), 0);
        assert_eq!((constructorTag(pair), constructorArity(pair)), (4, 2));
        assert_eq!(constructorField(pair, 0), text);
        assert!(constructorField(pair, 1).is_null());
        assert!(constructorField(pair, 2).is_null());
        assert!(constructorField(pair, -1).is_null());
        assert_eq!(constructorTag(number), -1);
        assert_eq!(referenceCount(text), 2);

        let arglist = newArglist(1, 2);
        assert_eq!(fillSlot(arglist, 0, makeInt(9)), 0);
        assert_eq!(arglistTotal(arglist), 2);
        assert_eq!(intValue(arglistArg(arglist, 0)), 9);
        assert!(arglistArg(arglist, 1).is_null());
        assert!(arglistArg(number, 0).is_null());

        for value in [text, number, pair, arglist] {
            removeReference(value);
        }
        assert_no_leaks();
    });
}

#[test]
fn closures_apply_through_the_c_surface() {
    tracked(|| unsafe {
        let arglist = newArglist(2, 2);
        let sub = makeClosureFromArglist(native_sub, arglist);
        removeReference(arglist);
        let partial = applyClosure(sub, makeInt(50));
        assert_eq!(valueTag(partial), ValueKind::Closure.tag());
        let result = applyClosure(partial, makeInt(8));
        assert_eq!(intValue(result), 42);
        assert_eq!(referenceCount(sub), 1);

        assert!(invokeClosure(partial).is_null());
        assert!(applyClosure(result, makeInt(1)).is_null());
        assert!(applyClosure(ptr::null(), makeInt(1)).is_null());

        for value in [sub, partial, result] {
            removeReference(value);
        }
        assert_no_leaks();
    });
}
