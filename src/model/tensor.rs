use serde::{Deserialize, Serialize};

use crate::quant::codec::QuantParams;

/// Element type of a tensor.
///
/// - `Int8`: activations and weights
/// - `Int32`: dense-layer biases, stored at scale `s_in * s_w` with zero point 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Int8,
    Int32,
}

impl DataType {
    pub fn size_bytes(&self) -> usize {
        match self {
            DataType::Int8 => 1,
            DataType::Int32 => 4,
        }
    }

    /// Inclusive value range representable by this type.
    pub fn range(&self) -> (i64, i64) {
        match self {
            DataType::Int8 => (i8::MIN as i64, i8::MAX as i64),
            DataType::Int32 => (i32::MIN as i64, i32::MAX as i64),
        }
    }
}

/// One tensor entry in a model file.
///
/// Tensors with `data` are constants (weights, biases) and live in the model
/// itself. Tensors without it are activations, materialized in the
/// interpreter's workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorDef {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: DataType,
    #[serde(default)]
    pub quantization: Option<QuantParams>,
    #[serde(default)]
    pub data: Option<Vec<i32>>,
}

impl TensorDef {
    /// Number of elements; an empty shape is a scalar. Saturates at
    /// `usize::MAX` for shapes that overflow.
    pub fn element_count(&self) -> usize {
        self.checked_byte_len_of(1).unwrap_or(usize::MAX)
    }

    pub fn byte_len(&self) -> usize {
        self.checked_byte_len().unwrap_or(usize::MAX)
    }

    /// Byte size of the tensor, or `None` if it does not fit in `usize`.
    pub fn checked_byte_len(&self) -> Option<usize> {
        self.checked_byte_len_of(self.dtype.size_bytes())
    }

    fn checked_byte_len_of(&self, element_size: usize) -> Option<usize> {
        self.shape.iter().try_fold(element_size, |acc, &dim| acc.checked_mul(dim))
    }

    pub fn is_constant(&self) -> bool {
        self.data.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor(shape: Vec<usize>, dtype: DataType) -> TensorDef {
        TensorDef { name: "t".to_string(), shape, dtype, quantization: None, data: None }
    }

    #[test]
    fn sizes_follow_shape_and_dtype() {
        let t = tensor(vec![1, 3], DataType::Int32);
        assert_eq!(t.element_count(), 3);
        assert_eq!(t.byte_len(), 12);
        assert_eq!(tensor(vec![], DataType::Int8).element_count(), 1);
    }

    #[test]
    fn overflowing_shape_has_no_byte_len() {
        let t = tensor(vec![usize::MAX, 2], DataType::Int8);
        assert_eq!(t.checked_byte_len(), None);
        assert_eq!(t.element_count(), usize::MAX);
        assert_eq!(t.byte_len(), usize::MAX);
    }
}
