//! Parsing of value and bit pattern inputs.
//!
//! Hex inputs are parsed as arbitrary-width unsigned integers, so leading
//! zeros and patterns wider than 32 bits (FP64, 64-bit integers) are handled
//! without truncation.

use crate::{Codec, Encoded, Error, Format, Result};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde_json::Value;

/// Strips a `0x`/`0X` prefix.
fn hex_digits(s: &str) -> Option<&str> {
    if s.starts_with("0x") || s.starts_with("0X") {
        Some(&s[2..])
    } else {
        None
    }
}

fn parse_hex(digits: &str) -> Option<BigUint> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
}

/// Parses a value input.
///
/// Accepts hex integer literals (`0x1F`), the keywords `inf`, `+inf`,
/// `-inf`, `infinity`, `+infinity`, `-infinity` and `nan` (in any case), and
/// decimal numerals (`-1.5`, `6.02e23`).
pub fn parse_value(input: &str) -> Result<f64> {
    let s = input.trim();
    let err = || Error::ValueParse(input.to_string());

    if let Some(digits) = hex_digits(s) {
        return parse_hex(digits)
            .and_then(|n| n.to_f64())
            .ok_or_else(err);
    }

    match s.to_ascii_lowercase().as_str() {
        "inf" | "+inf" | "infinity" | "+infinity" => return Ok(std::f64::INFINITY),
        "-inf" | "-infinity" => return Ok(std::f64::NEG_INFINITY),
        "nan" => return Ok(std::f64::NAN),
        _ => {}
    }

    // `f64::from_str` also accepts spellings like "infinity" and "NaN",
    // which are handled above; everything left must be a numeral.
    let numeral = s.bytes().all(|b| b.is_ascii_digit() || b"+-.eE".contains(&b))
        && s.bytes().any(|b| b.is_ascii_digit());
    if !numeral {
        return Err(err());
    }
    s.parse::<f64>().map_err(|_| err())
}

/// Converts a JSON value input: a number, or a string accepted by
/// [`parse_value`].
pub fn value_from_json(value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| Error::ValueParse(n.to_string())),
        Value::String(s) => parse_value(s),
        other => Err(Error::ValueParse(other.to_string())),
    }
}

/// Parses a bit pattern for a layout that is `width` bits wide.
///
/// The pattern is either a string of binary digits, left-padded with zeros
/// to `width`, or a `0x`-prefixed hex number.
///
/// Besides malformed strings, patterns with set bits beyond `width` also
/// fail with [`Error::BitPattern`] instead of being truncated.
pub fn parse_bits(input: &str, width: u32) -> Result<u64> {
    let s = input.trim();
    let err = |reason: &str| Error::BitPattern(input.to_string(), reason.to_string());

    let value = if let Some(digits) = hex_digits(s) {
        parse_hex(digits).ok_or_else(|| err("expected hex digits after `0x`"))?
    } else if !s.is_empty() && s.bytes().all(|b| b == b'0' || b == b'1') {
        BigUint::parse_bytes(s.as_bytes(), 2).ok_or_else(|| err("expected binary digits"))?
    } else {
        return Err(err("expected binary digits or a `0x`-prefixed hex number"));
    };

    if !value.is_zero() && value.bits() > width as usize {
        return Err(err(&format!("pattern is wider than {} bits", width)));
    }
    value.to_u64().ok_or_else(|| err("pattern is wider than 64 bits"))
}

/// Renders the low `width` bits of `bits` as binary digits, most significant
/// first.
pub fn to_binary(bits: u64, width: u32) -> String {
    format!("{:0width$b}", bits, width = width as usize)
}

/// Renders `bits` as an uppercase, `0x`-prefixed hex string with one digit
/// per started nibble of `width`.
pub fn to_hex(bits: u64, width: u32) -> String {
    let digits = ((width + 3) / 4).max(1) as usize;
    format!("0x{:0digits$X}", bits, digits = digits)
}

impl Format {
    /// Parses a bit pattern (see [`parse_bits`]) and splits it into fields.
    ///
    /// A well-formed pattern that is wider than this layout is an
    /// [`Error::BitPattern`] too, with a reason naming the width.
    pub fn parse_bits(&self, input: &str) -> Result<Encoded> {
        parse_bits(input, self.total_bits()).map(|bits| self.from_bits(bits))
    }
}
