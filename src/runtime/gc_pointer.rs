use std::fmt;

use crate::runtime::{
    closure::apply_closure,
    error::RuntimeError,
    make::{make_pointer, make_world},
    value::{RawPtr, Value},
};

/// Foreign resource paired with the closure that releases it.
///
/// The finalizer runs exactly once, when the last reference to the wrapping
/// value is released. It is applied to the raw address as a `Pointer` value;
/// a finalizer of effect type (two arguments missing) also receives the
/// `World` token.
pub struct GcPointer {
    raw: RawPtr,
    on_collect: Value,
}

impl GcPointer {
    pub(crate) fn new(raw: RawPtr, on_collect: Value) -> Self {
        GcPointer { raw, on_collect }
    }

    pub fn raw(&self) -> RawPtr {
        self.raw
    }

    pub fn on_collect(&self) -> &Value {
        &self.on_collect
    }

    fn finalize(&self) -> Result<(), RuntimeError> {
        // Decided by the finalizer's own arity, not by what it returns.
        let takes_world = self
            .on_collect
            .as_closure()
            .is_some_and(|closure| closure.arglist().missing() == 2);
        let result = apply_closure(&self.on_collect, make_pointer(self.raw))?;
        if takes_world {
            apply_closure(&result, make_world())?;
        }
        Ok(())
    }
}

impl Drop for GcPointer {
    fn drop(&mut self) {
        log::trace!(target: "refc::teardown", "finalizing foreign pointer {:p}", self.raw);
        if let Err(err) = self.finalize() {
            log::error!(
                target: "refc::finalizer",
                "finalizer for {:p} failed: {}",
                self.raw,
                err
            );
        }
    }
}

impl fmt::Debug for GcPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcPointer")
            .field("raw", &self.raw)
            .field("on_collect", &self.on_collect.kind())
            .finish()
    }
}
