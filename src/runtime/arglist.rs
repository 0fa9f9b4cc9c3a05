//! Argument lists for partial application.
//!
//! An arglist records a function's total arity and the arguments supplied so
//! far. It grows persistently: [`fill_arglist`] and [`Arglist::with_arg`]
//! build a new list holding fresh references to the previous arguments plus
//! the new one, and never touch the source list.

use crate::runtime::{
    error::RuntimeError,
    kind::ValueKind,
    value::{Payload, Value},
};

#[derive(Debug)]
pub struct Arglist {
    total: usize,
    missing: usize,
    slots: Box<[Option<Value>]>,
}

impl Arglist {
    /// `missing` is clamped to `total`; the first `total - missing` slots are
    /// supplied by the caller through `Value::fill_slot`.
    pub(crate) fn new(missing: usize, total: usize) -> Self {
        debug_assert!(missing <= total, "arglist missing {missing} exceeds total {total}");
        Self {
            total,
            missing: missing.min(total),
            slots: (0..total).map(|_| None).collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn missing(&self) -> usize {
        self.missing
    }

    pub fn filled(&self) -> usize {
        self.total - self.missing
    }

    pub fn is_saturated(&self) -> bool {
        self.missing == 0
    }

    /// Argument `index` in application order.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        if index >= self.filled() {
            return None;
        }
        let arg = self.slots[index].as_ref();
        debug_assert!(arg.is_some(), "arglist slot {index} read before it was filled");
        arg
    }

    /// Supplied arguments in application order.
    pub fn args(&self) -> impl Iterator<Item = &Value> {
        self.slots[..self.filled()].iter().flatten()
    }

    /// A new list with `arg` in the next free slot. Every earlier argument
    /// gains one reference owned by the new list.
    pub fn with_arg(&self, arg: Value) -> Result<Arglist, RuntimeError> {
        if self.is_saturated() {
            return Err(RuntimeError::Saturated { total: self.total });
        }
        let filled = self.filled();
        let mut slots: Vec<Option<Value>> = Vec::with_capacity(self.total);
        slots.extend(self.slots[..filled].iter().cloned());
        slots.push(Some(arg));
        slots.resize_with(self.total, || None);
        Ok(Arglist {
            total: self.total,
            missing: self.missing - 1,
            slots: slots.into_boxed_slice(),
        })
    }

    /// Structural copy: same shape, every supplied argument re-referenced.
    pub(crate) fn duplicate(&self) -> Arglist {
        Arglist {
            total: self.total,
            missing: self.missing,
            slots: self.slots.clone(),
        }
    }

    pub(crate) fn fill_prefix(&mut self, index: usize, value: Value) -> Result<(), RuntimeError> {
        let len = self.filled();
        let slot = self.slots[..len]
            .get_mut(index)
            .ok_or(RuntimeError::SlotOutOfBounds { index, len })?;
        *slot = Some(value);
        Ok(())
    }

    pub(crate) fn drain_into(&mut self, out: &mut Vec<Value>) {
        out.extend(self.slots.iter_mut().filter_map(Option::take));
    }
}

/// Fills the next slot of an arglist value, producing a new arglist value.
///
/// The source keeps its own references and stays valid.
pub fn fill_arglist(arglist: &Value, arg: Value) -> Result<Value, RuntimeError> {
    let source = arglist
        .as_arglist()
        .ok_or(RuntimeError::kind_mismatch(ValueKind::Arglist, arglist.kind()))?;
    Ok(Value::new(Payload::Arglist(source.with_arg(arg)?)))
}
