//! Permissive numeric text parsing with C library semantics.
//!
//! String-to-number casts read the longest numeric prefix of their input the
//! way `strtoll` and `strtod` do and never fail. [`Parsed::exact`] reports
//! whether the whole input was consumed without saturation, which is what
//! strict casts and lossy-parse warnings build on.

/// Result of a prefix parse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    /// The entire input was a well-formed, in-range number.
    pub exact: bool,
}

fn is_c_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

fn skip_space(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|&&b| is_c_space(b)).count()
}

/// `strtoll(text, NULL, 10)`: leading whitespace, optional sign, decimal
/// digits. Out-of-range values saturate at `i64::MIN`/`i64::MAX`; text with
/// no digits reads as 0.
pub fn parse_i64_prefix(bytes: &[u8]) -> Parsed<i64> {
    let mut pos = skip_space(bytes);
    let negative = match bytes.get(pos) {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let digits_start = pos;
    let mut magnitude: u64 = 0;
    let mut overflow = false;
    while let Some(digit) = bytes.get(pos).filter(|b| b.is_ascii_digit()) {
        let d = u64::from(digit - b'0');
        match magnitude.checked_mul(10).and_then(|m| m.checked_add(d)) {
            Some(next) => magnitude = next,
            None => overflow = true,
        }
        pos += 1;
    }

    if pos == digits_start {
        return Parsed {
            value: 0,
            exact: false,
        };
    }

    let limit = if negative {
        i64::MIN.unsigned_abs()
    } else {
        i64::MAX as u64
    };
    let saturated = overflow || magnitude > limit;
    let value = match (saturated, negative) {
        (true, true) => i64::MIN,
        (true, false) => i64::MAX,
        (false, true) => (magnitude as i64).wrapping_neg(),
        (false, false) => magnitude as i64,
    };

    Parsed {
        value,
        exact: !saturated && skip_space(bytes) == 0 && pos == bytes.len(),
    }
}

/// `strtod(text, NULL)`: leading whitespace, optional sign, then either
/// `inf`/`infinity`/`nan` (any case) or digits with an optional fraction and
/// exponent. Text with no number reads as 0.0.
pub fn parse_f64_prefix(bytes: &[u8]) -> Parsed<f64> {
    let start = skip_space(bytes);
    let mut pos = start;
    if matches!(bytes.get(pos), Some(b'-' | b'+')) {
        pos += 1;
    }

    let rest = &bytes[pos..];
    for word in [&b"infinity"[..], b"inf", b"nan"] {
        if rest.len() >= word.len() && rest[..word.len()].eq_ignore_ascii_case(word) {
            let end = pos + word.len();
            return finish_f64(bytes, start, end);
        }
    }

    let int_digits = count_digits(&bytes[pos..]);
    pos += int_digits;
    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        frac_digits = count_digits(&bytes[pos + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            pos += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return Parsed {
            value: 0.0,
            exact: false,
        };
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'-' | b'+')) {
            exp += 1;
        }
        let exp_digits = count_digits(&bytes[exp.min(bytes.len())..]);
        if exp_digits > 0 {
            pos = exp + exp_digits;
        }
    }

    finish_f64(bytes, start, pos)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn finish_f64(bytes: &[u8], start: usize, end: usize) -> Parsed<f64> {
    // The prefix is pure ASCII by construction.
    let value = std::str::from_utf8(&bytes[start..end])
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .unwrap_or(0.0);
    Parsed {
        value,
        exact: start == 0 && end == bytes.len(),
    }
}

/// Decimal text for the arbitrary-precision parser, which ignores ASCII
/// whitespace anywhere in the number.
pub fn strip_ascii_space(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|b| !b.is_ascii_whitespace() && **b != b'\x0b')
        .map(|&b| char::from(b))
        .collect()
}
