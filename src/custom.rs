//! Format descriptions supplied by callers.
//!
//! A description is either the key of a preset or a custom float or integer
//! layout, given as JSON:
//!
//! ```notrust
//! "bf16"
//! { "exponentBits": 4, "mantissaBits": 3, "bias": 7, "hasInfinity": false }
//! { "bits": 12, "signed": false }
//! ```

use crate::{registry, Error, FloatFormat, Format, IntFormat, Result, Specials};
use serde::Deserialize;
use serde_json::Value;

/// A custom floating point layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomFloat {
    #[serde(default = "default_sign_bits")]
    pub sign_bits: u32,
    pub exponent_bits: u32,
    pub mantissa_bits: u32,
    /// Defaults to `2^(exponent_bits-1) - 1`.
    #[serde(default)]
    pub bias: Option<i64>,
    #[serde(default = "default_true")]
    pub has_infinity: bool,
    #[serde(default = "default_true")]
    pub has_nan: bool,
}

/// A custom integer layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomInt {
    pub bits: i64,
    #[serde(default = "default_true")]
    pub signed: bool,
}

fn default_sign_bits() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl CustomFloat {
    pub fn to_format(&self) -> Result<FloatFormat> {
        let mut specials = Specials::empty();
        specials.set(Specials::INFINITY, self.has_infinity);
        specials.set(Specials::NAN, self.has_nan);

        let format = FloatFormat::new(self.sign_bits, self.exponent_bits, self.mantissa_bits)?
            .with_specials(specials);
        Ok(match self.bias {
            Some(bias) => format.with_bias(bias),
            None => format,
        })
    }
}

impl CustomInt {
    pub fn to_format(&self) -> Result<IntFormat> {
        if self.bits < 1 || self.bits > 64 {
            return Err(Error::IntegerWidth(self.bits));
        }
        IntFormat::new(self.bits as u32, self.signed)
    }
}

impl Format {
    /// Resolves a preset key or a custom layout description.
    pub fn from_json(desc: &Value) -> Result<Format> {
        match desc {
            Value::String(key) => registry::lookup(key),
            Value::Object(fields) => {
                if fields.contains_key("bits") {
                    let custom: CustomInt = deserialize(desc)?;
                    return Ok(Format::Integer(custom.to_format()?));
                }

                if !fields.contains_key("exponentBits") && !fields.contains_key("mantissaBits") {
                    return Err(Error::MalformedFormat(
                        "expected `bits` or `exponentBits` and `mantissaBits`".to_string(),
                    ));
                }
                for &field in &["exponentBits", "mantissaBits"] {
                    if !fields.contains_key(field) {
                        return Err(Error::MissingField(field));
                    }
                }
                let custom: CustomFloat = deserialize(desc)?;
                Ok(Format::Float(custom.to_format()?))
            }
            other => Err(Error::MalformedFormat(format!(
                "expected a preset key or an object, got `{}`", other
            ))),
        }
    }

    /// Parses `json` and resolves it like [`Format::from_json`].
    ///
    /// A bare word that isn't valid JSON is treated as a preset key.
    pub fn from_json_str(json: &str) -> Result<Format> {
        match serde_json::from_str::<Value>(json) {
            Ok(desc) => Format::from_json(&desc),
            Err(_) => registry::lookup(json),
        }
    }
}

fn deserialize<'a, T: Deserialize<'a>>(desc: &'a Value) -> Result<T> {
    T::deserialize(desc).map_err(|e| Error::MalformedFormat(e.to_string()))
}
