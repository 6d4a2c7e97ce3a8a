pub mod codec;
pub mod fixed_point;

pub use codec::{decode, encode, QuantParams};
pub use fixed_point::{multiply_by_quantized_multiplier, quantize_multiplier};
