//! Human-readable reports about encoded values.

use crate::parse::{to_binary, to_hex};
use crate::utils::ldexp;
use crate::{Class, Codec, Encoded, Format};
use serde::{Serialize, Serializer};
use std::fmt;

/// An `f64` that serializes infinities and NaN as the strings `"Infinity"`,
/// `"-Infinity"` and `"NaN"`, since JSON has no representation for them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Real(pub f64);

impl Serialize for Real {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.collect_str(self)
        }
    }
}

pub(crate) fn serialize_real<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    Real(*value).serialize(serializer)
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_nan() {
            f.write_str("NaN")
        } else if self.0.is_infinite() {
            f.write_str(if self.0 > 0.0 { "Infinity" } else { "-Infinity" })
        } else {
            fmt::Display::fmt(&self.0, f)
        }
    }
}

/// Everything worth knowing about one encoded value.
///
/// Fields that only apply to floating point (or integer) layouts are `None`
/// for the other kind and omitted when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub binary: String,
    pub hex: String,
    pub sign: u8,
    pub classification: &'static str,
    pub value: Real,
    pub total_bits: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_bits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exponent_bits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mantissa_bits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bias: Option<i64>,
    /// The biased exponent field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exponent: Option<u64>,
    /// How the unbiased exponent is computed, eg. `"128 - 127 = 1"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_exponent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mantissa: Option<u64>,
    /// The mantissa field as a fraction, `mantissa / 2^mantissa_bits`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mantissa_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed: Option<bool>,
}

/// The classification label of an encoded value.
pub fn label(encoded: &Encoded) -> &'static str {
    match encoded.class {
        Class::Zero if encoded.sign => "-Zero",
        Class::Zero => "+Zero",
        Class::Subnormal => "Subnormal",
        Class::Normal => "Normal",
        Class::Infinite if encoded.sign => "-Infinity",
        Class::Infinite => "+Infinity",
        Class::NaN => "NaN",
        Class::FixedPoint if encoded.mantissa == 0 => "Zero",
        Class::FixedPoint => "Fixed-point",
        Class::Integer(0) => "Zero",
        Class::Integer(v) if v > 0 => "Positive Integer",
        Class::Integer(_) => "Negative Integer",
    }
}

impl Stats {
    pub fn new(format: &Format, encoded: &Encoded) -> Stats {
        let width = format.total_bits();
        let bits = format.to_bits(encoded);
        let mut stats = Stats {
            binary: to_binary(bits, width),
            hex: to_hex(bits, width),
            sign: encoded.sign as u8,
            classification: label(encoded),
            value: Real(format.decode_encoded(encoded)),
            total_bits: width,
            sign_bits: None,
            exponent_bits: None,
            mantissa_bits: None,
            bias: None,
            exponent: None,
            actual_exponent: None,
            mantissa: None,
            mantissa_fraction: None,
            signed: None,
        };

        match format {
            Format::Float(f) => {
                stats.sign_bits = Some(f.sign_bits());
                stats.exponent_bits = Some(f.exponent_bits());
                stats.mantissa_bits = Some(f.mantissa_bits());
                stats.bias = Some(f.bias());
                stats.mantissa = Some(encoded.mantissa);
                stats.mantissa_fraction =
                    Some(ldexp(encoded.mantissa as f64, -i64::from(f.mantissa_bits())));

                if !f.is_fixed_point() {
                    stats.exponent = Some(encoded.exponent);
                    stats.actual_exponent = Some(match encoded.class {
                        Class::Infinite | Class::NaN => "Special".to_string(),
                        _ if encoded.exponent == 0 => {
                            format!("1 - {} = {}", f.bias(), 1 - i128::from(f.bias()))
                        }
                        _ => format!(
                            "{} - {} = {}",
                            encoded.exponent,
                            f.bias(),
                            i128::from(encoded.exponent) - i128::from(f.bias())
                        ),
                    });
                }
            }
            Format::Integer(i) => {
                stats.signed = Some(i.is_signed());
            }
        }

        stats
    }
}

impl Format {
    /// Encodes `value` and reports on the result.
    pub fn encode_stats(&self, value: f64) -> Stats {
        Stats::new(self, &self.encode(value))
    }

    /// Reports on the value stored in the bit pattern `bits`.
    pub fn decode_stats(&self, bits: u64) -> Stats {
        Stats::new(self, &self.from_bits(bits))
    }
}
