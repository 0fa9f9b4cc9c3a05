use std::cell::RefCell;

/// Mutable byte buffer. Bytes are opaque to the runtime.
#[derive(Debug)]
pub struct Buffer {
    bytes: RefCell<Box<[u8]>>,
}

impl Buffer {
    pub(crate) fn new(bytes: Box<[u8]>) -> Self {
        Buffer {
            bytes: RefCell::new(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_byte(&self, index: usize) -> Option<u8> {
        self.bytes.borrow().get(index).copied()
    }

    /// Writes one byte; `false` when `index` is out of range.
    pub fn set_byte(&self, index: usize, byte: u8) -> bool {
        match self.bytes.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = byte;
                true
            }
            None => false,
        }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.borrow().to_vec()
    }

    /// Runs `f` over the bytes in place.
    pub fn with_bytes_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        f(&mut self.bytes.borrow_mut())
    }
}
