//! Exact power-of-two helpers on `f64`.
//!
//! Going through `log2`/`powf` loses the last bit near binade boundaries, so
//! everything here works on the raw IEEE 754 fields instead.

use ieee754::Ieee754;

const F64_EXPONENT_BIAS: i64 = 1023;
const F64_FRACTION_BITS: u32 = 52;

/// Returns `2^exp` exactly, or `0.0`/`+Inf` when it is out of range.
pub fn pow2(exp: i64) -> f64 {
    if exp > F64_EXPONENT_BIAS {
        std::f64::INFINITY
    } else if exp >= 1 - F64_EXPONENT_BIAS {
        f64::recompose_raw(false, (exp + F64_EXPONENT_BIAS) as u16, 0)
    } else if exp >= 1 - F64_EXPONENT_BIAS - i64::from(F64_FRACTION_BITS) {
        // subnormal power of two: a single fraction bit
        let shift = exp - (1 - F64_EXPONENT_BIAS - i64::from(F64_FRACTION_BITS));
        f64::recompose_raw(false, 0, 1 << shift)
    } else {
        0.0
    }
}

/// Computes `x * 2^exp`.
///
/// The scaling is split into steps that each stay within the normal range,
/// so intermediate results don't overflow or flush to zero early.
pub fn ldexp(mut x: f64, exp: i64) -> f64 {
    const STEP: i64 = 1000;
    // any finite non-zero `f64` overflows or underflows well before this
    const LIMIT: i64 = 2200;

    let mut exp = exp.max(-LIMIT).min(LIMIT);

    while exp > STEP {
        x *= pow2(STEP);
        exp -= STEP;
        if x.is_infinite() {
            return x;
        }
    }
    while exp < -STEP {
        x *= pow2(-STEP);
        exp += STEP;
        if x == 0.0 {
            return x;
        }
    }
    x * pow2(exp)
}

/// Returns `floor(log2(|x|))` for a finite, non-zero `x`.
pub fn floor_log2(x: f64) -> i64 {
    debug_assert!(x.is_finite() && x != 0.0, "floor_log2({})", x);

    let (_, raw_exp, significand) = x.decompose_raw();
    if raw_exp == 0 {
        // denormal: value is `significand * 2^-1074`
        let top_bit = 63 - i64::from(significand.leading_zeros());
        top_bit - (F64_EXPONENT_BIAS - 1 + i64::from(F64_FRACTION_BITS))
    } else {
        i64::from(raw_exp) - F64_EXPONENT_BIAS
    }
}

/// Rounds to the nearest integer, breaking ties towards `+Inf`.
///
/// `1.5` becomes `2`, `-1.5` becomes `-1`.
pub fn round_half_up(x: f64) -> f64 {
    let floor = x.floor();
    // `x - floor` is exact for every finite `x`
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}
