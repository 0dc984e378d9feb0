//! Format descriptors.

use crate::{Codec, Encoded, Error, Result};

bitflags! {
    /// The special values a floating point layout reserves encodings for.
    ///
    /// When either flag is set, the all-ones exponent is reserved: it holds
    /// infinities (zero mantissa) and NaNs (non-zero mantissa) instead of
    /// normal numbers, as far as the layout supports them.
    pub struct Specials: u8 {
        const INFINITY = 1 << 0;
        const NAN      = 1 << 1;
        /// Infinity and NaN, as in all IEEE 754 binary formats.
        const IEEE     = Self::INFINITY.bits | Self::NAN.bits;
    }
}

/// Returns a mask with the low `bits` bits set.
pub(crate) fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        !0
    } else {
        (1 << bits) - 1
    }
}

/// A binary floating point layout.
///
/// The bits are laid out as `[sign | exponent | mantissa]`, most significant
/// bit first. A layout without exponent bits is a fixed point fraction
/// `mantissa / 2^mantissa_bits`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FloatFormat {
    sign_bits: u32,
    exponent_bits: u32,
    mantissa_bits: u32,
    bias: i64,
    specials: Specials,
}

impl FloatFormat {
    /// Largest supported exponent field.
    pub const MAX_EXPONENT_BITS: u32 = 32;

    /// Creates a layout with the standard bias `2^(exponent_bits-1) - 1` and
    /// IEEE 754 style infinity and NaN encodings.
    pub fn new(sign_bits: u32, exponent_bits: u32, mantissa_bits: u32) -> Result<Self> {
        if sign_bits > 1 {
            return Err(Error::InvalidFloatLayout(format!(
                "sign bit count must be 0 or 1, got {}", sign_bits
            )));
        }
        if exponent_bits > Self::MAX_EXPONENT_BITS {
            return Err(Error::InvalidFloatLayout(format!(
                "at most {} exponent bits are supported, got {}",
                Self::MAX_EXPONENT_BITS, exponent_bits
            )));
        }
        let total = u64::from(sign_bits) + u64::from(exponent_bits) + u64::from(mantissa_bits);
        if total == 0 || total > 64 {
            return Err(Error::InvalidFloatLayout(format!(
                "layout must be 1 to 64 bits wide, got {}", total
            )));
        }

        Ok(Self {
            sign_bits,
            exponent_bits,
            mantissa_bits,
            bias: Self::default_bias(exponent_bits),
            specials: if exponent_bits == 0 { Specials::empty() } else { Specials::IEEE },
        })
    }

    /// The bias used when none is given explicitly.
    pub fn default_bias(exponent_bits: u32) -> i64 {
        if exponent_bits == 0 {
            0
        } else {
            (1i64 << (exponent_bits - 1)) - 1
        }
    }

    /// Returns a copy of `self` using a custom exponent bias.
    pub fn with_bias(self, bias: i64) -> Self {
        Self { bias, ..self }
    }

    /// Returns a copy of `self` that supports the given special values.
    ///
    /// Fixed point layouts have no exponent to reserve and ignore this.
    pub fn with_specials(self, specials: Specials) -> Self {
        let specials = if self.exponent_bits == 0 { Specials::empty() } else { specials };
        Self { specials, ..self }
    }

    pub fn sign_bits(&self) -> u32 {
        self.sign_bits
    }

    pub fn exponent_bits(&self) -> u32 {
        self.exponent_bits
    }

    pub fn mantissa_bits(&self) -> u32 {
        self.mantissa_bits
    }

    pub fn total_bits(&self) -> u32 {
        self.sign_bits + self.exponent_bits + self.mantissa_bits
    }

    pub fn bias(&self) -> i64 {
        self.bias
    }

    pub fn specials(&self) -> Specials {
        self.specials
    }

    pub fn has_infinity(&self) -> bool {
        self.specials.contains(Specials::INFINITY)
    }

    pub fn has_nan(&self) -> bool {
        self.specials.contains(Specials::NAN)
    }

    /// Whether the layout can store negative numbers.
    pub fn is_signed(&self) -> bool {
        self.sign_bits == 1
    }

    /// Whether this is a fixed point layout (no exponent bits).
    pub fn is_fixed_point(&self) -> bool {
        self.exponent_bits == 0
    }

    /// The largest biased exponent, `2^exponent_bits - 1`.
    pub fn max_exponent(&self) -> u64 {
        low_mask(self.exponent_bits)
    }

    /// Whether the all-ones exponent is reserved for special values.
    pub fn reserves_max_exponent(&self) -> bool {
        !self.specials.is_empty()
    }

    pub(crate) fn exponent_mask(&self) -> u64 {
        low_mask(self.exponent_bits)
    }

    pub(crate) fn mantissa_mask(&self) -> u64 {
        low_mask(self.mantissa_bits)
    }
}

/// A two's complement integer layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IntFormat {
    bits: u32,
    signed: bool,
}

impl IntFormat {
    /// Creates an integer layout of `bits` bits (1 to 64).
    pub fn new(bits: u32, signed: bool) -> Result<Self> {
        if bits < 1 || bits > 64 {
            return Err(Error::IntegerWidth(i64::from(bits)));
        }
        Ok(Self { bits, signed })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// The smallest representable integer.
    pub fn min_value(&self) -> i128 {
        if self.signed {
            -(1i128 << (self.bits - 1))
        } else {
            0
        }
    }

    /// The largest representable integer.
    pub fn max_value(&self) -> i128 {
        if self.signed {
            (1i128 << (self.bits - 1)) - 1
        } else {
            (1i128 << self.bits) - 1
        }
    }

    pub(crate) fn mask(&self) -> u64 {
        low_mask(self.bits)
    }
}

/// A bit layout: floating point or integer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Format {
    Float(FloatFormat),
    Integer(IntFormat),
}

impl Format {
    pub fn as_float(&self) -> Option<&FloatFormat> {
        match self {
            Format::Float(f) => Some(f),
            Format::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<&IntFormat> {
        match self {
            Format::Integer(i) => Some(i),
            Format::Float(_) => None,
        }
    }

    /// Packs the fields of `encoded` into a single bit pattern.
    pub fn to_bits(&self, encoded: &Encoded) -> u64 {
        match self {
            Format::Float(f) => f.pack(encoded),
            Format::Integer(i) => encoded.mantissa & i.mask(),
        }
    }

    /// Splits a bit pattern into its fields and classifies it.
    ///
    /// Bits above the layout's width are ignored.
    pub fn from_bits(&self, bits: u64) -> Encoded {
        match self {
            Format::Float(f) => f.unpack(bits),
            Format::Integer(i) => i.unpack(bits),
        }
    }

    /// Decodes a complete bit pattern.
    pub fn decode_bits(&self, bits: u64) -> f64 {
        self.decode_encoded(&self.from_bits(bits))
    }
}

impl Codec for Format {
    fn encode(&self, value: f64) -> Encoded {
        match self {
            Format::Float(f) => f.encode(value),
            Format::Integer(i) => i.encode(value),
        }
    }

    fn decode(&self, sign: bool, exponent: u64, mantissa: u64) -> f64 {
        match self {
            Format::Float(f) => f.decode(sign, exponent, mantissa),
            Format::Integer(i) => i.decode(sign, exponent, mantissa),
        }
    }

    fn total_bits(&self) -> u32 {
        match self {
            Format::Float(f) => Codec::total_bits(f),
            Format::Integer(i) => Codec::total_bits(i),
        }
    }
}

impl From<FloatFormat> for Format {
    fn from(f: FloatFormat) -> Self {
        Format::Float(f)
    }
}

impl From<IntFormat> for Format {
    fn from(i: IntFormat) -> Self {
        Format::Integer(i)
    }
}
