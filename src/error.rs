use thiserror::Error;

use crate::kernels::op_kind::OpKind;

/// Problems found while reading a serialized model blob.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model blob is not a valid model document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("could not read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("graph input/output references tensor {tensor}, but the model only has {count} tensors")]
    DanglingIo { tensor: usize, count: usize },

    #[error("operator {op} references tensor {tensor}, but the model only has {count} tensors")]
    DanglingTensor { op: usize, tensor: usize, count: usize },

    #[error("tensor '{name}' declares {declared} elements but carries {actual} values")]
    DataLength { name: String, declared: usize, actual: usize },

    #[error("tensor '{name}' holds value {value}, outside the range of its data type")]
    DataRange { name: String, value: i64 },

    #[error("tensor '{name}' has a shape whose byte size overflows")]
    ShapeOverflow { name: String },
}

/// Failures while filling the operation registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("operation registry is full ({capacity} kernels); cannot add {kind}")]
    RegistryFull { kind: OpKind, capacity: usize },

    #[error("kernel {0} is already registered")]
    AlreadyRegistered(OpKind),
}

/// Failures of `Interpreter::allocate_tensors`, covering both arena sizing
/// and per-operator preparation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    #[error("workspace exhausted: need {requested} more bytes, {available} left")]
    ArenaExhausted { requested: usize, available: usize },

    #[error("operator {op} uses kernel {kind}, which is not registered")]
    UnregisteredOperator { op: usize, kind: OpKind },

    #[error("operator {op} expects {expected} {what} tensors, found {found}")]
    OperandCount { op: usize, what: &'static str, expected: usize, found: usize },

    #[error("tensor {tensor}: {reason}")]
    InvalidTensor { tensor: usize, reason: &'static str },

    #[error("operator {op}: shape mismatch ({reason})")]
    ShapeMismatch { op: usize, reason: &'static str },

    #[error("tensor {tensor} has no quantization parameters")]
    MissingQuantization { tensor: usize },

    #[error("tensor {tensor} has non-positive or non-finite scale {scale}")]
    InvalidScale { tensor: usize, scale: f32 },

    #[error("tensor {tensor} has zero point {zero_point}, outside the int8 range")]
    InvalidZeroPoint { tensor: usize, zero_point: i32 },

    #[error("operator {op}: rescale factor {multiplier} cannot be represented in fixed point")]
    MultiplierOutOfRange { op: usize, multiplier: f64 },
}

/// Errors raised by a kernel while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("invoke called before tensors were allocated")]
    NotAllocated,

    #[error("{kind} operator {op}: {reason}")]
    Failed { op: usize, kind: OpKind, reason: &'static str },
}

/// Everything that can stop one `infer` call.
///
/// Schema-version drift is not an error: it is logged and inference
/// continues.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("invalid model: {0}")]
    InvalidModel(#[from] ModelError),

    #[error("kernel registration failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error("tensor allocation failed: {0}")]
    AllocationFailed(#[from] AllocationError),

    #[error("tensor binding failed: {0}")]
    TensorBindingFailed(&'static str),

    #[error("forward pass failed: {0}")]
    ExecutionFailed(#[from] KernelError),
}

/// Diagnostic emitted when a model's schema version differs from the
/// runtime's. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Model provided is schema version {found} not equal to supported version {supported}.")]
pub struct SchemaVersionMismatch {
    pub found: u32,
    pub supported: u32,
}
