use serde::{Deserialize, Serialize};

/// Per-tensor affine quantization: `real = (q - zero_point) * scale`.
///
/// Both fields come from the model file; nothing at inference time derives
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantParams {
    pub scale: f32,
    pub zero_point: i32,
}

impl QuantParams {
    pub fn new(scale: f32, zero_point: i32) -> QuantParams {
        QuantParams { scale, zero_point }
    }

    /// True when the scale can be divided by.
    pub fn is_valid(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0
    }

    pub fn encode(&self, value: f32) -> i8 {
        encode(value, self.scale, self.zero_point)
    }

    pub fn decode(&self, value: i32) -> f32 {
        decode(value, self.scale, self.zero_point)
    }
}

/// Quantizes a real value: `trunc(value / scale) + zero_point`.
///
/// Results outside the int8 range saturate at -128 / 127 instead of
/// wrapping. NaN maps to `zero_point`.
pub fn encode(value: f32, scale: f32, zero_point: i32) -> i8 {
    // `as` truncates toward zero and saturates; NaN becomes 0.
    let steps = (value / scale) as i32;
    steps
        .saturating_add(zero_point)
        .clamp(i8::MIN as i32, i8::MAX as i32) as i8
}

/// Maps a quantized value back to a real: `(value - zero_point) * scale`.
///
/// Takes `i32` so callers can pass int8 tensor slots widened without a cast
/// back.
pub fn decode(value: i32, scale: f32, zero_point: i32) -> f32 {
    (value - zero_point) as f32 * scale
}
