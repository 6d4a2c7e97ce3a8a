//! Integer requantization.
//!
//! A real rescale factor `m` is split into a Q31 mantissa and a power-of-two
//! shift once, when an operator is prepared. Kernels then rescale int32
//! accumulators with integer arithmetic only.

/// Splits `real_multiplier` into `(quantized_multiplier, shift)` such that
/// `real_multiplier ≈ quantized_multiplier * 2^(shift - 31)`, with the
/// mantissa in `[2^30, 2^31)`.
///
/// Returns `(0, 0)` for zero and for multipliers too small to represent.
pub fn quantize_multiplier(real_multiplier: f64) -> (i32, i32) {
    if real_multiplier == 0.0 || !real_multiplier.is_finite() {
        return (0, 0);
    }
    let (q, mut shift) = frexp(real_multiplier);
    let mut q_fixed = (q * (1i64 << 31) as f64).round() as i64;
    if q_fixed == 1i64 << 31 {
        q_fixed /= 2;
        shift += 1;
    }
    if shift < -31 {
        return (0, 0);
    }
    (q_fixed as i32, shift)
}

/// Computes `round(x * quantized_multiplier * 2^(shift - 31))`.
///
/// `x` saturates at the int32 range after the left shift, so positive
/// shifts above 30 lose precision instead of wrapping.
pub fn multiply_by_quantized_multiplier(x: i32, quantized_multiplier: i32, shift: i32) -> i32 {
    let left_shift = shift.clamp(0, 32);
    let right_shift = shift.saturating_neg().clamp(0, 62);
    let shifted = ((x as i64) << left_shift).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    rounding_divide_by_pot(
        saturating_rounding_doubling_high_mul(shifted, quantized_multiplier),
        right_shift,
    )
}

/// High 32 bits of `2 * a * b`, rounded to nearest.
fn saturating_rounding_doubling_high_mul(a: i32, b: i32) -> i32 {
    if a == i32::MIN && b == i32::MIN {
        return i32::MAX;
    }
    let ab = a as i64 * b as i64;
    let nudge = if ab >= 0 { 1i64 << 30 } else { 1 - (1i64 << 30) };
    ((ab + nudge) / (1i64 << 31)) as i32
}

/// `x / 2^exponent`, rounding half away from zero.
fn rounding_divide_by_pot(x: i32, exponent: i32) -> i32 {
    if exponent <= 0 {
        return x;
    }
    let mask = (1i64 << exponent) - 1;
    let remainder = x as i64 & mask;
    let threshold = (mask >> 1) + if x < 0 { 1 } else { 0 };
    let quotient = (x as i64) >> exponent;
    (quotient + if remainder > threshold { 1 } else { 0 }) as i32
}

/// Decomposes a positive finite `value` into `(mantissa, exponent)` with
/// `value = mantissa * 2^exponent` and `mantissa` in `[0.5, 1)`.
fn frexp(value: f64) -> (f64, i32) {
    let mut exponent = value.abs().log2().floor() as i32 + 1;
    let mut mantissa = value / 2f64.powi(exponent);
    // log2 can land one off near exact powers of two.
    if mantissa.abs() >= 1.0 {
        mantissa /= 2.0;
        exponent += 1;
    } else if mantissa.abs() < 0.5 {
        mantissa *= 2.0;
        exponent -= 1;
    }
    (mantissa, exponent)
}
