//! Runtime value layer for natively compiled functional programs.
//!
//! [`runtime`] is the Rust API: tagged reference-counted values, closures
//! and partial application, and the primitive cast matrix. [`abi`] exposes
//! the same operations under the C symbol names generated code links against.

pub mod abi;
pub mod runtime;
