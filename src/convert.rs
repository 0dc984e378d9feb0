//! Conversion of a value from one format into another.

use crate::stats::serialize_real;
use crate::{Codec, Encoded, Format, Stats};
use serde::Serialize;

/// One side of a conversion: the encoding and the value it decodes to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Side {
    pub format: Format,
    pub encoded: Encoded,
    /// The value actually stored, after rounding to the format.
    pub actual: f64,
}

impl Side {
    fn new(format: &Format, value: f64) -> Side {
        let encoded = format.encode(value);
        Side {
            format: *format,
            encoded,
            actual: format.decode_encoded(&encoded),
        }
    }

    pub fn stats(&self) -> Stats {
        Stats::new(&self.format, &self.encoded)
    }
}

/// How much a conversion changed the stored value.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecisionLoss {
    #[serde(serialize_with = "serialize_real")]
    pub absolute: f64,
    /// The absolute loss relative to the input value, in percent. `0` when
    /// the input value is zero.
    #[serde(serialize_with = "serialize_real")]
    pub relative_percent: f64,
    /// No loss at all. NaN converted to NaN counts as lossless.
    pub lossless: bool,
}

impl PrecisionLoss {
    pub fn between(input: f64, output: f64) -> PrecisionLoss {
        let absolute = (input - output).abs();
        let relative_percent = if input != 0.0 {
            absolute / input.abs() * 100.0
        } else {
            0.0
        };
        PrecisionLoss {
            absolute,
            relative_percent,
            lossless: absolute == 0.0 || absolute.is_nan(),
        }
    }
}

/// The result of [`convert`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Conversion {
    pub input: Side,
    pub output: Side,
    pub loss: PrecisionLoss,
}

/// A serializable report of a [`Conversion`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStats {
    pub input: Stats,
    pub output: Stats,
    pub precision_loss: PrecisionLoss,
}

impl Conversion {
    pub fn stats(&self) -> ConversionStats {
        ConversionStats {
            input: self.input.stats(),
            output: self.output.stats(),
            precision_loss: self.loss,
        }
    }
}

/// Converts `value` from the `input` format into the `output` format.
///
/// `value` is first rounded to the input format, since it may not be exactly
/// representable there either. The rounded value is then encoded in the
/// output format and the loss between the two decoded values is measured.
pub fn convert(value: f64, input: &Format, output: &Format) -> Conversion {
    let input = Side::new(input, value);
    let output = Side::new(output, input.actual);
    let loss = PrecisionLoss::between(input.actual, output.actual);

    debug!(
        "convert {}: {:?} ({}) -> {:?} ({}), loss {:?}",
        value, input.encoded, input.actual, output.encoded, output.actual, loss
    );

    Conversion { input, output, loss }
}
