pub mod fully_connected;
pub mod logistic;
pub mod op_kind;
pub mod registry;

pub use op_kind::{OpData, OpKind};
pub use registry::OpRegistry;

use crate::error::AllocationError;
use crate::model::model::Model;
use crate::model::operator::OperatorDef;
use crate::model::tensor::{DataType, TensorDef};
use crate::quant::codec::QuantParams;

/// What a kernel sees while it is being prepared: its own operator entry and
/// read access to the whole model.
pub struct OpContext<'m> {
    pub index: usize,
    pub def: &'m OperatorDef,
    pub model: &'m Model,
}

impl<'m> OpContext<'m> {
    /// Checks operand counts; `inputs` is an inclusive range.
    pub fn expect_operands(
        &self,
        min_inputs: usize,
        max_inputs: usize,
        outputs: usize,
    ) -> Result<(), AllocationError> {
        let found = self.def.inputs.len();
        if found < min_inputs || found > max_inputs {
            return Err(AllocationError::OperandCount {
                op: self.index,
                what: "input",
                expected: min_inputs,
                found,
            });
        }
        if self.def.outputs.len() != outputs {
            return Err(AllocationError::OperandCount {
                op: self.index,
                what: "output",
                expected: outputs,
                found: self.def.outputs.len(),
            });
        }
        Ok(())
    }

    pub fn input(&self, n: usize) -> Result<(usize, &'m TensorDef), AllocationError> {
        self.operand(self.def.inputs.get(n).copied())
    }

    pub fn output(&self, n: usize) -> Result<(usize, &'m TensorDef), AllocationError> {
        self.operand(self.def.outputs.get(n).copied())
    }

    fn operand(&self, index: Option<usize>) -> Result<(usize, &'m TensorDef), AllocationError> {
        let model: &'m Model = self.model;
        index
            .and_then(|i| model.tensor(i).map(|t| (i, t)))
            .ok_or(AllocationError::ShapeMismatch { op: self.index, reason: "operand missing" })
    }
}

/// An int8 activation tensor with valid quantization.
pub(crate) fn int8_activation(index: usize, tensor: &TensorDef) -> Result<QuantParams, AllocationError> {
    if tensor.dtype != DataType::Int8 {
        return Err(AllocationError::InvalidTensor { tensor: index, reason: "expected int8 data" });
    }
    if tensor.is_constant() {
        return Err(AllocationError::InvalidTensor {
            tensor: index,
            reason: "expected an activation, found a constant",
        });
    }
    quant_params(index, tensor)
}

pub(crate) fn quant_params(index: usize, tensor: &TensorDef) -> Result<QuantParams, AllocationError> {
    let params = tensor
        .quantization
        .ok_or(AllocationError::MissingQuantization { tensor: index })?;
    if !params.is_valid() {
        return Err(AllocationError::InvalidScale { tensor: index, scale: params.scale });
    }
    if params.zero_point < i8::MIN as i32 || params.zero_point > i8::MAX as i32 {
        return Err(AllocationError::InvalidZeroPoint { tensor: index, zero_point: params.zero_point });
    }
    Ok(params)
}
