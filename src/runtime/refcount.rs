//! Acquire/release protocol for values.
//!
//! Both operations are thin names over `Clone` and `Drop` on [`Value`]; they
//! exist so call sites read like the protocol generated code follows.

use crate::runtime::value::Value;

/// Adds one reference to `value` and returns it.
#[inline]
pub fn new_reference(value: &Value) -> Value {
    value.clone()
}

/// Gives up one reference. The last release reclaims the value and releases
/// its children, running a foreign pointer's finalizer on the way.
#[inline]
pub fn remove_reference(value: Value) {
    drop(value);
}
