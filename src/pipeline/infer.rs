use tracing::{error, warn};

use crate::engine::interpreter::Interpreter;
use crate::engine::workspace::Workspace;
use crate::error::InferenceError;
use crate::kernels::registry::OpRegistry;
use crate::model::model::Model;
use crate::model::tensor::DataType;

/// Workspace size used by [`infer`]. Comfortably above what any of the
/// bundled gate models needs.
pub const TENSOR_ARENA_SIZE: usize = 2056;

/// Runs one forward pass of a serialized two-input model and returns the
/// dequantized output probability.
///
/// A fresh engine and a fresh stack workspace of [`TENSOR_ARENA_SIZE`]
/// bytes are built for every call, so repeated calls are independent.
pub fn infer(model_blob: &[u8], x0: f32, x1: f32) -> Result<f32, InferenceError> {
    let mut arena = [0u8; TENSOR_ARENA_SIZE];
    infer_with_workspace(model_blob, x0, x1, &mut arena)
}

/// Same as [`infer`], with a caller-supplied workspace buffer.
pub fn infer_with_workspace(
    model_blob: &[u8],
    x0: f32,
    x1: f32,
    arena: &mut [u8],
) -> Result<f32, InferenceError> {
    let model = Model::from_bytes(model_blob).map_err(|e| report(e.into()))?;
    run_model(&model, x0, x1, arena)
}

/// Runs an already-parsed model. Registry, interpreter and workspace are
/// still rebuilt on every call.
pub fn run_model(model: &Model, x0: f32, x1: f32, arena: &mut [u8]) -> Result<f32, InferenceError> {
    if let Err(mismatch) = model.check_version() {
        warn!("{mismatch}");
    }

    let registry = OpRegistry::for_gates().map_err(|e| report(e.into()))?;
    let mut interpreter = Interpreter::new(model, &registry, Workspace::new(arena));
    interpreter.allocate_tensors().map_err(|e| report(e.into()))?;

    let input = interpreter
        .input(0)
        .ok_or_else(|| report(InferenceError::TensorBindingFailed("input tensor is null")))?;
    let output = interpreter
        .output(0)
        .ok_or_else(|| report(InferenceError::TensorBindingFailed("output tensor is null")))?;
    if input.dtype != DataType::Int8 || input.len < 2 {
        return Err(report(InferenceError::TensorBindingFailed(
            "input tensor must hold at least two int8 values",
        )));
    }
    if output.dtype != DataType::Int8 || output.len < 1 {
        return Err(report(InferenceError::TensorBindingFailed(
            "output tensor must hold an int8 value",
        )));
    }
    let input_params = input.quantization.ok_or_else(|| {
        report(InferenceError::TensorBindingFailed("input tensor is not quantized"))
    })?;
    let output_params = output.quantization.ok_or_else(|| {
        report(InferenceError::TensorBindingFailed("output tensor is not quantized"))
    })?;

    let written = interpreter.set_i8(&input, 0, input_params.encode(x0))
        && interpreter.set_i8(&input, 1, input_params.encode(x1));
    if !written {
        return Err(report(InferenceError::TensorBindingFailed("input tensor has fewer than two slots")));
    }

    interpreter.invoke().map_err(|e| report(e.into()))?;

    let y = interpreter
        .get_i8(&output, 0)
        .ok_or_else(|| report(InferenceError::TensorBindingFailed("output tensor is empty")))?;
    Ok(output_params.decode(y as i32))
}

fn report(err: InferenceError) -> InferenceError {
    error!("{err}");
    err
}
