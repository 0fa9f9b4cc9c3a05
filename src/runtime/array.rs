use std::cell::RefCell;

use crate::runtime::{error::RuntimeError, value::Value};

/// Fixed-length mutable array of values.
///
/// Unlike the other composites an array may be written after it is shared,
/// so its slots sit behind a `RefCell`. Empty slots read as `None`.
#[derive(Debug)]
pub struct Array {
    slots: RefCell<Box<[Option<Value>]>>,
}

impl Array {
    pub(crate) fn new(len: usize) -> Self {
        Array {
            slots: RefCell::new((0..len).map(|_| None).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A new reference to the element at `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.slots.borrow().get(index).cloned().flatten()
    }

    /// Replaces the element at `index`, releasing the previous one.
    pub fn set(&self, index: usize, value: Value) -> Result<(), RuntimeError> {
        let previous = {
            let mut slots = self.slots.borrow_mut();
            let len = slots.len();
            let slot = slots
                .get_mut(index)
                .ok_or(RuntimeError::SlotOutOfBounds { index, len })?;
            slot.replace(value)
        };
        // Released outside the borrow: a finalizer may reach this array again.
        drop(previous);
        Ok(())
    }

    pub(crate) fn drain_into(&mut self, out: &mut Vec<Value>) {
        out.extend(self.slots.get_mut().iter_mut().filter_map(Option::take));
    }
}
