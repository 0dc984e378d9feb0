//! Saturating two's complement integer encoding.

use crate::format::IntFormat;
use crate::utils::round_half_up;
use crate::{Class, Codec, Encoded};

impl IntFormat {
    /// Builds an `Encoded` from a value already within range.
    fn fields(&self, value: i128) -> Encoded {
        debug_assert!(self.min_value() <= value && value <= self.max_value());

        let raw = if value < 0 {
            (1i128 << self.bits()) + value
        } else {
            value
        };
        Encoded {
            sign: false,
            exponent: 0,
            mantissa: raw as u64,
            class: Class::Integer(value),
        }
    }

    /// Interprets the low `bits` bits of `raw` as an integer of this layout.
    pub fn value_of(&self, raw: u64) -> i128 {
        let raw = raw & self.mask();
        if self.is_signed() && raw >> (self.bits() - 1) != 0 {
            i128::from(raw) - (1i128 << self.bits())
        } else {
            i128::from(raw)
        }
    }

    pub(crate) fn unpack(&self, bits: u64) -> Encoded {
        self.fields(self.value_of(bits))
    }

    /// Rounds `value` and clamps it into range.
    fn saturate(&self, value: f64) -> i128 {
        let (min, max) = (self.min_value(), self.max_value());
        if value.is_nan() {
            return 0;
        }

        let rounded = round_half_up(value);
        // `max as f64` may round up, so clamp once more after converting
        let int = if rounded <= min as f64 {
            min
        } else if rounded >= max as f64 {
            max
        } else {
            rounded as i128
        };

        if int != rounded as i128 || value.is_infinite() {
            trace!("saturating {} to {}", value, int);
        }
        int.max(min).min(max)
    }
}

impl Codec for IntFormat {
    fn encode(&self, value: f64) -> Encoded {
        self.fields(self.saturate(value))
    }

    fn decode(&self, _sign: bool, _exponent: u64, mantissa: u64) -> f64 {
        self.value_of(mantissa) as f64
    }

    fn total_bits(&self) -> u32 {
        self.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(bits: u32) -> IntFormat {
        IntFormat::new(bits, true).unwrap()
    }

    fn uint(bits: u32) -> IntFormat {
        IntFormat::new(bits, false).unwrap()
    }

    #[test]
    fn int8_saturates() {
        let int8 = int(8);
        assert_eq!(int8.encode(200.0).int_value(), Some(127));
        assert_eq!(int8.encode(-200.0).int_value(), Some(-128));
        assert_eq!(int8.encode(std::f64::INFINITY).int_value(), Some(127));
        assert_eq!(int8.encode(std::f64::NEG_INFINITY).int_value(), Some(-128));
        assert_eq!(int8.encode(-128.0).mantissa, 0x80);
        assert_eq!(int8.encode(127.0).mantissa, 0x7f);
    }

    #[test]
    fn nan_is_zero() {
        let zero = int(16).encode(std::f64::NAN);
        assert_eq!(zero.int_value(), Some(0));
        assert!(zero.is_zero());
        assert_eq!(zero.mantissa, 0);
    }

    #[test]
    fn rounding_ties() {
        let int8 = int(8);
        assert_eq!(int8.encode(1.5).int_value(), Some(2));
        assert_eq!(int8.encode(-1.5).int_value(), Some(-1));
        assert_eq!(int8.encode(2.5).int_value(), Some(3));
        assert_eq!(int8.encode(-2.5).int_value(), Some(-2));
        assert_eq!(int8.encode(0.4).int_value(), Some(0));
        assert_eq!(int8.encode(-0.6).int_value(), Some(-1));
        assert_eq!(int8.encode(126.6).int_value(), Some(127));
        assert_eq!(int8.encode(127.5).int_value(), Some(127));
        assert_eq!(int8.encode(-128.5).int_value(), Some(-128));
    }

    #[test]
    fn twos_complement() {
        let int8 = int(8);
        let minus_one = int8.encode(-1.0);
        assert_eq!(minus_one.mantissa, 0xff);
        assert_eq!((minus_one.sign, minus_one.exponent), (false, 0));
        assert_eq!(int8.decode(false, 0, 0xff), -1.0);
        assert_eq!(int8.decode(false, 0, 0x80), -128.0);
        assert_eq!(int8.decode(false, 0, 0x7f), 127.0);
        // excess bits are ignored
        assert_eq!(int8.decode(false, 0, 0x1ff), -1.0);

        assert_eq!(uint(8).decode(false, 0, 0xff), 255.0);
        assert_eq!(int(4).decode(false, 0, 0b1000), -8.0);
    }

    #[test]
    fn unsigned_clamps_at_zero() {
        let uint4 = uint(4);
        assert_eq!(uint4.encode(-3.0).int_value(), Some(0));
        assert_eq!(uint4.encode(15.0).mantissa, 15);
        assert_eq!(uint4.encode(16.0).int_value(), Some(15));
    }

    #[test]
    fn wide_integers() {
        let int64 = int(64);
        let max = int64.encode(1e30);
        assert_eq!(max.int_value(), Some(i128::from(i64::max_value())));
        assert_eq!(max.mantissa, i64::max_value() as u64);
        let min = int64.encode(-1e30);
        assert_eq!(min.mantissa, 1 << 63);
        assert_eq!(int64.decode(false, 0, !0), -1.0);

        let uint64 = uint(64);
        // 2^64 as f64 saturates to u64::MAX
        let top = uint64.encode(18446744073709551616.0);
        assert_eq!(top.mantissa, u64::max_value());
        assert_eq!(uint64.encode(4294967296.0).mantissa, 1 << 32);
    }

    #[test]
    fn one_bit() {
        let int1 = int(1);
        assert_eq!(int1.encode(5.0).int_value(), Some(0));
        assert_eq!(int1.encode(-5.0).mantissa, 1);
        assert_eq!(int1.decode(false, 0, 1), -1.0);
        assert_eq!(uint(1).encode(5.0).mantissa, 1);
    }

    #[test]
    fn unpack_round_trip() {
        let int16 = int(16);
        for &v in &[-32768.0, -1.0, 0.0, 1.0, 1000.0, 32767.0] {
            let enc = int16.encode(v);
            assert_eq!(int16.unpack(enc.mantissa), enc);
            assert_eq!(int16.decode_encoded(&enc), v);
        }
    }
}
