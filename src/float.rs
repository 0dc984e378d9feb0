//! Encoding and decoding of floating point layouts.
//!
//! Useful resources:
//! * https://www.opencompute.org/documents/ocp-microscaling-formats-mx-v1-0-spec-final-pdf
//! * https://en.wikipedia.org/wiki/Minifloat

use crate::format::FloatFormat;
use crate::utils::{floor_log2, ldexp, pow2};
use crate::{Class, Codec, Encoded, Error, Result, SpecialValue};

impl FloatFormat {
    /// Classifies the given exponent and mantissa fields.
    ///
    /// The all-ones exponent holds NaNs (non-zero mantissa) and infinities
    /// (zero mantissa) only if the layout supports them. Otherwise it is used
    /// for normal numbers, as the OCP FP4 and FP6 formats do.
    pub fn classify(&self, exponent: u64, mantissa: u64) -> Class {
        if self.is_fixed_point() {
            return Class::FixedPoint;
        }

        let exponent = exponent & self.exponent_mask();
        let mantissa = mantissa & self.mantissa_mask();
        if exponent == self.max_exponent() {
            if self.has_nan() && mantissa != 0 {
                return Class::NaN;
            }
            if self.has_infinity() && mantissa == 0 {
                return Class::Infinite;
            }
        }

        match (exponent, mantissa) {
            (0, 0) => Class::Zero,
            (0, _) => Class::Subnormal,
            _ => Class::Normal,
        }
    }

    /// Builds an `Encoded` from raw fields, deriving its class.
    fn fields(&self, sign: bool, exponent: u64, mantissa: u64) -> Encoded {
        let exponent = exponent & self.exponent_mask();
        let mantissa = mantissa & self.mantissa_mask();
        Encoded {
            sign: sign && self.is_signed(),
            exponent,
            mantissa,
            class: self.classify(exponent, mantissa),
        }
    }

    /// Signed zero. The sign is dropped by unsigned layouts.
    pub fn zero(&self, negative: bool) -> Encoded {
        self.fields(negative, 0, 0)
    }

    /// Signed infinity.
    pub fn infinity(&self, negative: bool) -> Result<Encoded> {
        if !self.has_infinity() {
            return Err(Error::UnsupportedSpecialValue(SpecialValue::Infinity));
        }
        Ok(self.fields(negative, self.max_exponent(), 0))
    }

    /// The canonical NaN: positive sign, all-ones exponent, mantissa `1`.
    pub fn nan(&self) -> Result<Encoded> {
        // a NaN needs a non-zero mantissa to be told apart from infinity
        if !self.has_nan() || self.mantissa_bits() == 0 {
            return Err(Error::UnsupportedSpecialValue(SpecialValue::NaN));
        }
        Ok(self.fields(false, self.max_exponent(), 1))
    }

    /// The finite encoding with the largest magnitude.
    ///
    /// Layouts without special values use the all-ones exponent and
    /// mantissa. When the all-ones exponent is (partially) reserved, this is
    /// the largest encoding still classified as a finite number.
    pub fn max_normal(&self, negative: bool) -> Encoded {
        let mantissa = self.mantissa_mask();
        if self.is_fixed_point() {
            return self.fields(negative, 0, mantissa);
        }

        let max = self.max_exponent();
        [(max, mantissa), (max, 0), (max - 1, mantissa)]
            .iter()
            .map(|&(e, m)| self.fields(negative, e, m))
            .find(|enc| !enc.is_nan() && !enc.is_infinite())
            .unwrap_or_else(|| self.zero(negative))
    }

    /// The smallest positive normal encoding (exponent `1`, mantissa `0`).
    ///
    /// For fixed point layouts this is the smallest positive encoding.
    pub fn min_normal(&self) -> Encoded {
        if self.is_fixed_point() {
            self.fields(false, 0, 1)
        } else {
            self.fields(false, 1, 0)
        }
    }

    /// The smallest positive subnormal encoding (exponent `0`, mantissa `1`).
    ///
    /// Layouts without mantissa bits have no subnormals and return zero.
    pub fn min_subnormal(&self) -> Encoded {
        self.fields(false, 0, 1)
    }

    /// The largest finite value of this layout.
    pub fn max_value(&self) -> f64 {
        self.decode_encoded(&self.max_normal(false))
    }

    /// The smallest positive value of this layout.
    pub fn min_positive(&self) -> f64 {
        if self.mantissa_bits() > 0 {
            self.decode_encoded(&self.min_subnormal())
        } else {
            self.decode_encoded(&self.min_normal())
        }
    }

    /// Packs the fields into a `[sign | exponent | mantissa]` bit pattern.
    pub(crate) fn pack(&self, encoded: &Encoded) -> u64 {
        let fraction_bits = self.mantissa_bits();
        let sign = if self.is_signed() && encoded.sign {
            1 << (self.exponent_bits() + fraction_bits)
        } else {
            0
        };
        let exponent = (encoded.exponent & self.exponent_mask())
            .checked_shl(fraction_bits)
            .unwrap_or(0);
        sign | exponent | (encoded.mantissa & self.mantissa_mask())
    }

    /// Splits a `[sign | exponent | mantissa]` bit pattern into its fields.
    pub(crate) fn unpack(&self, bits: u64) -> Encoded {
        let fraction_bits = self.mantissa_bits();
        let mantissa = bits & self.mantissa_mask();
        let exponent = bits.checked_shr(fraction_bits).unwrap_or(0) & self.exponent_mask();
        let sign = self.is_signed()
            && (bits >> (self.exponent_bits() + fraction_bits)) & 1 != 0;
        self.fields(sign, exponent, mantissa)
    }

    /// Result of an out-of-range magnitude: infinity, or the largest finite
    /// value when the layout has no infinity.
    fn overflow(&self, negative: bool) -> Encoded {
        match self.infinity(negative) {
            Ok(inf) => inf,
            Err(_) => {
                trace!("saturating to max normal (negative={})", negative);
                self.max_normal(negative)
            }
        }
    }

    fn encode_fixed_point(&self, value: f64) -> Encoded {
        if value.is_nan() {
            trace!("fixed point: flushing NaN to zero");
            return self.zero(false);
        }
        let negative = value < 0.0;
        if negative && !self.is_signed() {
            return self.zero(false);
        }

        let scaled = ldexp(value.abs(), i64::from(self.mantissa_bits())).round();
        let mantissa = if scaled >= pow2(i64::from(self.mantissa_bits())) {
            trace!("fixed point: saturating {}", value);
            self.mantissa_mask()
        } else {
            scaled as u64
        };
        self.fields(negative, 0, mantissa)
    }

    /// Encodes a finite, non-zero magnitude.
    fn encode_finite(&self, negative: bool, magnitude: f64) -> Encoded {
        let fraction_bits = i64::from(self.mantissa_bits());
        let bias = self.bias();
        let raw_exponent = floor_log2(magnitude);
        let mut biased = raw_exponent.saturating_add(bias);

        // `fraction` is the mantissa field before rounding
        let fraction = if biased <= 0 {
            // subnormal: `magnitude / 2^(1-bias)`, no implicit leading 1
            biased = 0;
            let scale = fraction_bits.saturating_sub(1i64.saturating_sub(bias));
            ldexp(magnitude, scale)
        } else {
            let significand = ldexp(magnitude, -raw_exponent);
            ldexp(significand - 1.0, fraction_bits)
        };

        let mut mantissa = fraction.round();
        if mantissa >= pow2(fraction_bits) {
            // rounded up into the next binade
            biased = biased.saturating_add(1);
            trace!("mantissa carry: {} -> exponent {}", magnitude, biased);
            mantissa = 0.0;
        }

        if biased > self.max_exponent() as i64 {
            trace!("{} overflows (biased exponent {})", magnitude, biased);
            return self.overflow(negative);
        }

        let encoded = self.fields(negative, biased as u64, mantissa as u64);
        match encoded.class {
            // landed on an encoding reserved for a special value
            Class::Infinite | Class::NaN => {
                trace!("{} overflows into reserved encoding {:?}", magnitude, encoded);
                self.overflow(negative)
            }
            _ => encoded,
        }
    }
}

impl Codec for FloatFormat {
    fn encode(&self, value: f64) -> Encoded {
        if self.is_fixed_point() {
            return self.encode_fixed_point(value);
        }

        if value.is_nan() {
            return match self.nan() {
                Ok(nan) => nan,
                Err(_) => {
                    trace!("flushing NaN to zero");
                    self.zero(false)
                }
            };
        }

        let negative = value.is_sign_negative();
        if negative && !self.is_signed() {
            trace!("clamping {} to +0 in unsigned layout", value);
            return self.zero(false);
        }

        if value.is_infinite() {
            self.overflow(negative)
        } else if value == 0.0 {
            self.zero(negative)
        } else {
            self.encode_finite(negative, value.abs())
        }
    }

    fn decode(&self, sign: bool, exponent: u64, mantissa: u64) -> f64 {
        let exponent = exponent & self.exponent_mask();
        let mantissa = mantissa & self.mantissa_mask();
        let fraction_bits = i64::from(self.mantissa_bits());

        let magnitude = match self.classify(exponent, mantissa) {
            Class::NaN => return std::f64::NAN,
            Class::Infinite => std::f64::INFINITY,
            Class::Zero => 0.0,
            Class::FixedPoint => ldexp(mantissa as f64, -fraction_bits),
            Class::Subnormal => {
                let scale = 1i64.saturating_sub(self.bias()).saturating_sub(fraction_bits);
                ldexp(mantissa as f64, scale)
            }
            _ => {
                // implicit leading 1
                let significand = (1u128 << fraction_bits) | u128::from(mantissa);
                let scale = (exponent as i64)
                    .saturating_sub(self.bias())
                    .saturating_sub(fraction_bits);
                ldexp(significand as f64, scale)
            }
        };

        if sign && self.is_signed() {
            -magnitude
        } else {
            magnitude
        }
    }

    fn total_bits(&self) -> u32 {
        FloatFormat::total_bits(self)
    }
}

#[cfg(test)]
mod tests {
    extern crate env_logger;

    use super::*;
    use crate::Specials;

    fn fp32() -> FloatFormat {
        FloatFormat::new(1, 8, 23).unwrap()
    }

    fn fp16() -> FloatFormat {
        FloatFormat::new(1, 5, 10).unwrap()
    }

    fn e2m1() -> FloatFormat {
        FloatFormat::new(1, 2, 1).unwrap().with_bias(1).with_specials(Specials::empty())
    }

    fn e4m3() -> FloatFormat {
        FloatFormat::new(1, 4, 3).unwrap().with_bias(7).with_specials(Specials::NAN)
    }

    fn fields(e: &Encoded) -> (bool, u64, u64) {
        (e.sign, e.exponent, e.mantissa)
    }

    #[test]
    fn fp32_one() {
        let one = fp32().encode(1.0);
        assert_eq!(fields(&one), (false, 127, 0));
        assert!(one.is_normal());
        assert_eq!(fp32().pack(&one), 0x3F80_0000);
    }

    #[test]
    fn fp32_specials() {
        let f = fp32();
        assert_eq!(f.decode(false, 255, 0), std::f64::INFINITY);
        assert_eq!(f.decode(true, 255, 0), std::f64::NEG_INFINITY);
        assert!(f.decode(false, 255, 1).is_nan());

        let nan = f.encode(std::f64::NAN);
        assert_eq!(fields(&nan), (false, 255, 1));
        assert!(nan.is_nan());
        let inf = f.encode(std::f64::NEG_INFINITY);
        assert_eq!(fields(&inf), (true, 255, 0));
        assert!(inf.is_infinite());
    }

    #[test]
    fn signed_zero() {
        let f = fp32();
        let neg = f.encode(-0.0);
        assert_eq!(fields(&neg), (true, 0, 0));
        assert!(neg.is_zero());
        let back = f.decode(true, 0, 0);
        assert_eq!(back, 0.0);
        assert!(back.is_sign_negative());
        assert!(f.decode(false, 0, 0).is_sign_positive());
    }

    #[test]
    fn subnormals() {
        let f = fp32();
        let tiny = f.encode(f32::from_bits(1) as f64);
        assert_eq!(fields(&tiny), (false, 0, 1));
        assert!(tiny.is_subnormal());
        assert_eq!(f.decode(false, 0, 1), f32::from_bits(1) as f64);
        assert_eq!(f.decode(false, 0, 0x7f_ffff), f32::from_bits(0x7f_ffff) as f64);

        // the largest subnormal rounds up into the smallest normal
        let almost = f.encode(std::f32::MIN_POSITIVE as f64 * (1.0 - 1e-9));
        assert_eq!(fields(&almost), (false, 1, 0));
        assert!(almost.is_normal());
    }

    #[test]
    fn underflow_keeps_sign() {
        let zero = fp16().encode(-1e-45);
        assert_eq!(fields(&zero), (true, 0, 0));
        assert!(zero.is_zero());
        assert!(fp16().decode_encoded(&zero).is_sign_negative());
    }

    #[test]
    fn carry_into_next_binade() {
        let f = fp16();
        // 1.9999 rounds up to 2.0
        let two = f.encode(1.99999);
        assert_eq!(fields(&two), (false, 16, 0));
        assert_eq!(f.decode_encoded(&two), 2.0);

        assert_eq!(fields(&f.encode(65504.0)), (false, 30, 0x3ff));
        assert_eq!(fields(&f.encode(65519.0)), (false, 30, 0x3ff));
        // carry into the reserved exponent
        let inf = f.encode(65520.0);
        assert!(inf.is_infinite());
        assert_eq!(fields(&inf), (false, 31, 0));
    }

    #[test]
    fn overflow() {
        let f = fp16();
        assert!(f.encode(1e6).is_infinite());
        assert!(f.encode(-1e6).sign);

        let e = e2m1();
        let saturated = e.encode(100.0);
        assert_eq!(fields(&saturated), (false, 3, 1));
        assert!(saturated.is_normal());
        assert_eq!(fields(&e.encode(-1e300)), (true, 3, 1));
        assert_eq!(fields(&e.encode(std::f64::INFINITY)), (false, 3, 1));
    }

    #[test]
    fn e2m1_values() {
        let e = e2m1();
        let six = e.encode(6.0);
        assert_eq!(fields(&six), (false, 3, 1));
        assert_eq!(e.decode(false, 3, 1), 6.0);
        assert_eq!(e.decode(false, 0, 1), 0.5);
        assert_eq!(e.decode(false, 1, 0), 1.0);
        assert_eq!(e.decode(true, 2, 1), -3.0);
        assert_eq!(e.max_value(), 6.0);
        assert_eq!(e.min_positive(), 0.5);

        // no NaN: flushed to positive zero
        let nan = e.encode(std::f64::NAN);
        assert_eq!(fields(&nan), (false, 0, 0));
        assert!(nan.is_zero());
    }

    #[test]
    fn e4m3_reserved_exponent() {
        let e = e4m3();
        assert_eq!(e.decode(false, 15, 0), 256.0);
        assert!(e.decode(false, 15, 1).is_nan());
        assert_eq!(e.classify(15, 0), Class::Normal);
        assert_eq!(e.classify(15, 7), Class::NaN);

        assert_eq!(fields(&e.encode(256.0)), (false, 15, 0));
        assert_eq!(fields(&e.encode(240.0)), (false, 14, 7));
        // would land on a NaN encoding, saturates to the largest finite value
        assert_eq!(fields(&e.encode(300.0)), (false, 15, 0));
        assert_eq!(fields(&e.encode(std::f64::NEG_INFINITY)), (true, 15, 0));
        assert!(e.encode(std::f64::NAN).is_nan());
    }

    #[test]
    fn helpers() {
        let f = fp32();
        assert_eq!(fields(&f.zero(true)), (true, 0, 0));
        assert_eq!(fields(&f.infinity(false).unwrap()), (false, 255, 0));
        assert_eq!(fields(&f.nan().unwrap()), (false, 255, 1));
        assert_eq!(fields(&f.max_normal(false)), (false, 254, 0x7f_ffff));
        assert_eq!(f.max_value(), std::f32::MAX as f64);
        assert_eq!(f.decode_encoded(&f.min_normal()), std::f32::MIN_POSITIVE as f64);
        assert_eq!(f.min_positive(), f32::from_bits(1) as f64);

        let e = e2m1();
        assert_eq!(e.infinity(true), Err(Error::UnsupportedSpecialValue(SpecialValue::Infinity)));
        assert_eq!(e.nan(), Err(Error::UnsupportedSpecialValue(SpecialValue::NaN)));
        assert_eq!(fields(&e.max_normal(true)), (true, 3, 1));

        let inf_only = fp16().with_specials(Specials::INFINITY);
        assert_eq!(fields(&inf_only.max_normal(false)), (false, 31, 0x3ff));
        assert!(inf_only.decode(false, 31, 1).is_finite());
        assert!(inf_only.nan().is_err());
    }

    #[test]
    fn classification() {
        let f = fp16();
        match f.classify(0, 0) {
            Class::Zero => {}
            c => panic!("(0, 0) is {:?}", c),
        }
        assert_eq!(f.classify(0, 1), Class::Subnormal);
        assert_eq!(f.classify(1, 0), Class::Normal);
        assert_eq!(f.classify(31, 0), Class::Infinite);
        assert_eq!(f.classify(31, 0x200), Class::NaN);
        assert_eq!(e2m1().classify(3, 1), Class::Normal);
    }

    #[test]
    fn fixed_point() {
        let q8 = FloatFormat::new(1, 0, 8).unwrap();
        let half = q8.encode(0.5);
        assert_eq!(fields(&half), (false, 0, 128));
        assert_eq!(half.class, Class::FixedPoint);
        assert_eq!(q8.decode(true, 0, 64), -0.25);
        assert_eq!(fields(&q8.encode(-0.25)), (true, 0, 64));
        // saturates below 1.0
        assert_eq!(fields(&q8.encode(3.0)), (false, 0, 255));
        assert_eq!(fields(&q8.encode(std::f64::INFINITY)), (false, 0, 255));
        assert!(q8.encode(std::f64::NAN).is_zero());
        assert_eq!(q8.max_value(), 255.0 / 256.0);
    }

    #[test]
    fn unsigned_layout() {
        let u = FloatFormat::new(0, 5, 3).unwrap();
        assert_eq!(u.total_bits(), 8);
        assert_eq!(fields(&u.encode(-3.0)), (false, 0, 0));
        assert_eq!(fields(&u.encode(std::f64::NEG_INFINITY)), (false, 0, 0));
        assert_eq!(u.decode(true, 15, 0), 1.0);
        assert_eq!(u.unpack(0xff).sign, false);
    }

    #[test]
    fn pack_unpack() {
        env_logger::try_init().ok();

        let f = fp32();
        let pi = f.encode(std::f64::consts::PI);
        assert_eq!(f.pack(&pi), 0x4049_0FDB);
        assert_eq!(f.unpack(0x4049_0FDB), pi);
        let neg_inf = f.unpack(0xFF80_0000);
        assert_eq!(fields(&neg_inf), (true, 255, 0));
        assert!(neg_inf.is_infinite());

        let fp64 = FloatFormat::new(1, 11, 52).unwrap();
        let bits = (-1.5f64).to_bits();
        assert_eq!(fp64.pack(&fp64.unpack(bits)), bits);
        assert_eq!(fp64.decode_encoded(&fp64.unpack(bits)), -1.5);
    }

    #[test]
    fn custom_bias() {
        // same layout as fp16, shifted range
        let f = fp16().with_bias(0);
        assert_eq!(f.decode(false, 1, 0), 2.0);
        assert_eq!(fields(&f.encode(2.0)), (false, 1, 0));
        assert_eq!(f.decode(false, 0, 0x200), 1.0);
        assert!(f.encode(0.25).is_subnormal());
    }

    #[test]
    fn extreme_bias() {
        env_logger::try_init().ok();

        // every exponent overflows, including one reached by a mantissa carry
        let high = FloatFormat::new(1, 8, 2).unwrap().with_bias(i64::max_value());
        assert!(high.encode(1.99).is_infinite());
        assert!(high.encode(-1.0).is_infinite());
        assert!(high.encode(-1.0).sign);
        let saturating = high.with_specials(Specials::empty());
        assert_eq!(fields(&saturating.encode(1.99)), (false, 255, 3));
        assert_eq!(high.decode(false, 1, 0), 0.0);

        // every value underflows
        let low = FloatFormat::new(1, 8, 2).unwrap().with_bias(i64::min_value());
        assert!(low.encode(1.0).is_zero());
        assert!(low.encode(-1e300).sign);
        assert!(low.encode(-1e300).is_zero());
        assert_eq!(low.decode(false, 0, 1), std::f64::INFINITY);
        assert_eq!(low.decode(true, 254, 3), std::f64::NEG_INFINITY);
    }
}
