//! The field representation produced by encoding and consumed by decoding.

use std::fmt;

/// The kind of value an encoding represents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Class {
    /// All-zero exponent and mantissa.
    Zero,
    /// All-zero exponent, non-zero mantissa. No implicit leading 1.
    Subnormal,
    /// Any other finite floating point encoding.
    Normal,
    /// Reserved exponent, zero mantissa.
    Infinite,
    /// Reserved exponent, non-zero mantissa.
    NaN,
    /// An encoding of a layout without exponent bits.
    FixedPoint,
    /// A two's complement integer holding the given value.
    Integer(i128),
}

/// An encoded value, split into its fields.
///
/// For integer layouts, `sign` and `exponent` are unused and always `false`
/// and `0`; `mantissa` holds the complete two's complement bit pattern.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Encoded {
    pub sign: bool,
    /// The biased exponent field.
    pub exponent: u64,
    pub mantissa: u64,
    pub class: Class,
}

impl Encoded {
    /// Returns `true` for `+0`, `-0`, a zero fixed point value or the
    /// integer `0`.
    pub fn is_zero(&self) -> bool {
        match self.class {
            Class::Zero => true,
            Class::FixedPoint => self.mantissa == 0,
            Class::Integer(v) => v == 0,
            _ => false,
        }
    }

    pub fn is_normal(&self) -> bool {
        self.class == Class::Normal
    }

    pub fn is_subnormal(&self) -> bool {
        self.class == Class::Subnormal
    }

    pub fn is_infinite(&self) -> bool {
        self.class == Class::Infinite
    }

    pub fn is_nan(&self) -> bool {
        self.class == Class::NaN
    }

    /// The integer value, if this is an integer encoding.
    pub fn int_value(&self) -> Option<i128> {
        match self.class {
            Class::Integer(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Debug for Encoded {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.class {
            Class::Integer(v) => write!(f, "{}_i ({:#b})", v, self.mantissa),
            class => {
                if self.sign {
                    write!(f, "-")?;
                }
                write!(f, "e={} m={:#b} {:?}", self.exponent, self.mantissa, class)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(exponent: u64, mantissa: u64, class: Class) -> Encoded {
        Encoded { sign: false, exponent, mantissa, class }
    }

    #[test]
    fn flags_follow_class() {
        assert!(enc(0, 0, Class::Zero).is_zero());
        assert!(enc(0, 1, Class::Subnormal).is_subnormal());
        assert!(enc(3, 0, Class::Normal).is_normal());
        assert!(enc(31, 0, Class::Infinite).is_infinite());
        assert!(enc(31, 1, Class::NaN).is_nan());

        let nan = enc(31, 1, Class::NaN);
        assert!(!nan.is_zero() && !nan.is_normal() && !nan.is_subnormal() && !nan.is_infinite());
    }

    #[test]
    fn zero_like() {
        assert!(enc(0, 0, Class::FixedPoint).is_zero());
        assert!(!enc(0, 5, Class::FixedPoint).is_zero());
        assert!(enc(0, 0, Class::Integer(0)).is_zero());
        assert!(!enc(0, 0xff, Class::Integer(-1)).is_zero());
        assert_eq!(enc(0, 0xff, Class::Integer(-1)).int_value(), Some(-1));
        assert_eq!(enc(0, 0, Class::Zero).int_value(), None);
    }

    #[test]
    fn debug_output() {
        let neg = Encoded { sign: true, exponent: 127, mantissa: 0b101, class: Class::Normal };
        assert_eq!(format!("{:?}", neg), "-e=127 m=0b101 Normal");
        assert_eq!(format!("{:?}", enc(0, 0xff, Class::Integer(-1))), "-1_i (0b11111111)");
    }
}
