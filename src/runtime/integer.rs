//! Arbitrary-precision integer capability.
//!
//! The runtime never does big-integer arithmetic itself. Everything the cast
//! matrix and the constructors need is expressed by [`BigIntBackend`], and
//! [`Integer`] names the backend in use. Swapping backends means
//! implementing the trait and changing the alias.

use std::fmt;

use num_bigint::{BigInt, Sign};
use num_traits::{FromPrimitive, ToPrimitive, Zero};

pub trait BigIntBackend: Clone + fmt::Debug + fmt::Display + Sized {
    fn zero() -> Self;
    fn from_i64(value: i64) -> Self;
    fn from_u64(value: u64) -> Self;
    /// Parses optionally signed base-10 digits. `None` on malformed text.
    fn from_decimal(text: &str) -> Option<Self>;
    /// Truncates toward zero. Non-finite inputs produce zero.
    fn from_f64(value: f64) -> Self;
    /// The low `bits` bits of the two's-complement representation.
    ///
    /// `bits` is at most 64.
    fn low_bits(&self, bits: u32) -> u64;
    fn to_f64(&self) -> f64;
    fn to_decimal(&self) -> String;
}

pub type Integer = BigInt;

impl BigIntBackend for BigInt {
    fn zero() -> Self {
        Zero::zero()
    }

    fn from_i64(value: i64) -> Self {
        BigInt::from(value)
    }

    fn from_u64(value: u64) -> Self {
        BigInt::from(value)
    }

    fn from_decimal(text: &str) -> Option<Self> {
        let (negative, digits) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10)?;
        Some(if negative { -magnitude } else { magnitude })
    }

    fn from_f64(value: f64) -> Self {
        <BigInt as FromPrimitive>::from_f64(value.trunc()).unwrap_or_default()
    }

    fn low_bits(&self, bits: u32) -> u64 {
        debug_assert!(bits <= 64, "low_bits supports at most 64 bits, got {bits}");
        let fill = if self.sign() == Sign::Minus { 0xFF } else { 0x00 };
        let mut word = [fill; 8];
        for (slot, byte) in word.iter_mut().zip(self.to_signed_bytes_le()) {
            *slot = byte;
        }
        let value = u64::from_le_bytes(word);
        if bits >= 64 {
            value
        } else {
            value & ((1u64 << bits) - 1)
        }
    }

    fn to_f64(&self) -> f64 {
        ToPrimitive::to_f64(self).unwrap_or(if self.sign() == Sign::Minus {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        })
    }

    fn to_decimal(&self) -> String {
        self.to_str_radix(10)
    }
}
