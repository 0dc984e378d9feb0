//! Encoder and decoder for configurable floating point and integer layouts.
//!
//! A [`Format`] describes a bit layout: either a floating point layout with a
//! custom number of sign, exponent and mantissa bits, a custom exponent bias
//! and optional infinity/NaN support, or a two's complement integer of up to
//! 64 bits. Any `f64` can be encoded into such a layout, and any bit pattern of
//! the layout can be decoded back into an `f64`.
//!
//! This covers the IEEE 754 binary formats, the common machine learning
//! formats (`bfloat16`, TF32) and the OCP microscaling formats (FP8, FP6,
//! FP4), which trade infinity and NaN encodings for more dynamic range.
//!
//! ```
//! use fpformat::{registry, Codec};
//!
//! let fp32 = registry::lookup("fp32").unwrap();
//! let one = fp32.encode(1.0);
//! assert_eq!((one.sign, one.exponent, one.mantissa), (false, 127, 0));
//! assert_eq!(fp32.to_bits(&one), 0x3F80_0000);
//! ```
//!
//! All types are immutable values. Nothing in this crate holds state between
//! calls, so formats can be shared freely between threads.

#![doc(html_root_url = "https://docs.rs/fpformat/0.1.0")]
#![warn(missing_debug_implementations)]

#[macro_use] extern crate bitflags;
#[macro_use] extern crate log;

mod convert;
mod custom;
mod encoded;
mod float;
mod format;
mod int;
pub mod parse;
pub mod registry;
mod stats;
mod utils;

pub use crate::convert::{convert, Conversion, ConversionStats, PrecisionLoss, Side};
pub use crate::custom::{CustomFloat, CustomInt};
pub use crate::encoded::{Class, Encoded};
pub use crate::format::{FloatFormat, Format, IntFormat, Specials};
pub use crate::stats::{label, Real, Stats};

use std::fmt;

/// A value that a floating point layout can opt out of.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpecialValue {
    Infinity,
    NaN,
}

impl fmt::Display for SpecialValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SpecialValue::Infinity => f.write_str("infinity"),
            SpecialValue::NaN => f.write_str("NaN"),
        }
    }
}

/// Errors reported by this crate.
///
/// Saturation and flushing of unrepresentable special values are part of the
/// encoding rules and never reported as errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// No preset with the given key exists.
    #[error("format not found: `{0}`")]
    FormatNotFound(String),
    /// A custom format description lacks a required field.
    #[error("custom format is missing required field `{0}`")]
    MissingField(&'static str),
    /// Integer formats must be 1 to 64 bits wide.
    #[error("integer formats must be 1 to 64 bits wide, got {0}")]
    IntegerWidth(i64),
    /// The floating point layout can't be represented.
    #[error("invalid floating point layout: {0}")]
    InvalidFloatLayout(String),
    /// The format description is neither a preset key nor a valid custom
    /// float or integer description.
    #[error("malformed format description: {0}")]
    MalformedFormat(String),
    /// A value string is neither a keyword, a hex literal nor a decimal.
    #[error("cannot parse `{0}` as a number")]
    ValueParse(String),
    /// A bit pattern string is neither binary digits nor a `0x` hex literal.
    #[error("invalid bit pattern `{0}`: {1}")]
    BitPattern(String, String),
    /// The format does not support the requested special value.
    #[error("format does not support {0}")]
    UnsupportedSpecialValue(SpecialValue),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Conversion between `f64` and the bit fields of a format.
///
/// Implemented by [`FloatFormat`], [`IntFormat`] and the [`Format`] sum type
/// that dispatches to either.
pub trait Codec {
    /// Encodes `value`, rounding, saturating or flushing it as the layout
    /// requires.
    fn encode(&self, value: f64) -> Encoded;

    /// Decodes the given fields into an `f64`.
    ///
    /// Fields wider than the layout are truncated to the layout's width.
    fn decode(&self, sign: bool, exponent: u64, mantissa: u64) -> f64;

    /// Total number of bits in the layout.
    fn total_bits(&self) -> u32;

    /// Decodes a previously encoded value.
    fn decode_encoded(&self, encoded: &Encoded) -> f64 {
        self.decode(encoded.sign, encoded.exponent, encoded.mantissa)
    }

    /// Encodes `value` and decodes the result again, yielding the nearest
    /// value representable in this layout.
    fn quantize(&self, value: f64) -> f64 {
        self.decode_encoded(&self.encode(value))
    }
}
