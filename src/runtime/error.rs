//! Errors reported by the checked runtime API.
//!
//! The hot path (construction, release, the permissive cast matrix) has no
//! error channel. These errors come from operations that validate their
//! inputs: slot filling, partial application, strict casts and configuration.

use thiserror::Error;

use crate::runtime::{casts::CastKind, kind::ValueKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("expected a {expected} value, got {found}")]
    KindMismatch {
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("closure is missing {missing} of {total} arguments")]
    Unsaturated { missing: usize, total: usize },

    #[error("argument list is already saturated with {total} arguments")]
    Saturated { total: usize },

    #[error("slot {index} is out of bounds for a composite with {len} slots")]
    SlotOutOfBounds { index: usize, len: usize },

    #[error("cannot fill a slot of a shared {kind} value")]
    SharedComposite { kind: ValueKind },

    #[error("{kind} values have no slots")]
    NotComposite { kind: ValueKind },

    #[error("{kind} values cannot be cast")]
    NotCastable { kind: ValueKind },

    #[error("cannot read {text:?} as {target}")]
    MalformedText { text: String, target: CastKind },

    #[error("native function returned a null value")]
    NullResult,

    #[error("invalid runtime configuration: {0}")]
    Config(String),
}

impl RuntimeError {
    pub(crate) fn kind_mismatch(expected: ValueKind, found: ValueKind) -> Self {
        RuntimeError::KindMismatch { expected, found }
    }
}
