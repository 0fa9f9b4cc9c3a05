//! Reference-counted runtime values for compiled code.
//!
//! # No-Cycle Invariant
//! Runtime values are immutable graphs once shared and are expected to remain
//! acyclic. Every value sits behind an `Rc`, so introducing cycles would leak
//! memory under reference counting.
//!
//! The invariant is:
//! - Constructors, arglists and closures are filled while exclusively held
//!   and never change afterwards.
//! - Arrays are the only shared-mutable composite; an array must not be
//!   stored, directly or transitively, into itself.
//! - A finalizer closure must not capture the foreign pointer it finalizes.
//!
//! Any future cyclic data feature must use cycle-aware memory management.

pub mod arglist;
pub mod array;
pub mod buffer;
pub mod casts;
pub mod closure;
pub mod config;
pub mod constructor;
pub mod error;
pub mod gc_pointer;
pub mod integer;
pub mod kind;
pub mod leak_detector;
pub mod make;
pub mod parse;
pub mod refcount;
pub mod value;

pub use arglist::{Arglist, fill_arglist};
pub use casts::{CastKind, cast, try_cast};
pub use closure::{
    Callee, Closure, Function, NativeFunction, apply_closure, apply_closure_many,
    invoke_closure, make_closure_from_arglist, make_native_closure_from_arglist, new_closure,
};
pub use config::RuntimeConfig;
pub use error::RuntimeError;
pub use integer::{BigIntBackend, Integer};
pub use kind::ValueKind;
pub use make::*;
pub use refcount::{new_reference, remove_reference};
pub use value::{Object, Payload, RawPtr, Value};
