#[path = "../support/mod.rs"]
mod support;

use std::cell::Cell;

use refc::runtime::{Arglist, RawPtr, Value, ValueKind, make::*, new_closure, remove_reference};
use support::{assert_no_leaks, stats, tracked};

thread_local! {
    static FREED: Cell<u32> = const { Cell::new(0) };
}

struct Resource {
    id: u32,
}

fn acquire(id: u32) -> RawPtr {
    Box::into_raw(Box::new(Resource { id })).cast()
}

/// Finalizer of type `Ptr -> World -> ()`: reclaims the boxed resource.
fn release(args: &Arglist) -> Value {
    let raw = args.arg(0).and_then(Value::as_pointer);
    assert!(args.arg(1).is_some_and(Value::is_world));
    if let Some(raw) = raw {
        // SAFETY: the pointer came from `acquire` and is finalized once.
        let resource = unsafe { Box::from_raw(raw.cast::<Resource>()) };
        FREED.with(|freed| freed.set(freed.get() + resource.id));
    }
    new_constructor(0, 0, Some("Unit"))
}

#[test]
fn resource_is_released_with_its_last_reference() {
    FREED.with(|f| f.set(0));
    tracked(|| {
        let finalizer = new_closure(release, 2);
        let handle = make_gc_pointer(acquire(7), &finalizer);
        let copies: Vec<Value> = (0..3).map(|_| handle.clone()).collect();
        drop(finalizer);

        copies.into_iter().for_each(remove_reference);
        assert_eq!(FREED.with(Cell::get), 0);
        assert_eq!(stats().live_of(ValueKind::GcPointer), 1);

        remove_reference(handle);
        assert_eq!(FREED.with(Cell::get), 7);
        assert_no_leaks();
    });
}

#[test]
fn each_handle_finalizes_its_own_resource() {
    FREED.with(|f| f.set(0));
    tracked(|| {
        let finalizer = new_closure(release, 2);
        let mut array = make_array(3);
        for (slot, id) in [1, 10, 100].into_iter().enumerate() {
            array.fill_slot(slot, make_gc_pointer(acquire(id), &finalizer)).unwrap();
        }
        assert_eq!(finalizer.reference_count(), 4);

        drop(array);
        assert_eq!(FREED.with(Cell::get), 111);
        assert!(finalizer.is_unique());

        drop(finalizer);
        assert_no_leaks();
    });
}
