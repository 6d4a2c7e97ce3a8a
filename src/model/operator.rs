use serde::{Deserialize, Serialize};

use crate::kernels::op_kind::OpKind;

/// Activation fused into a dense layer's output clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusedActivation {
    #[default]
    None,
    Relu,
    Relu6,
}

/// One node of the model graph. Operators run in the order they are listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorDef {
    pub opcode: OpKind,
    pub inputs: Vec<usize>,
    pub outputs: Vec<usize>,
    #[serde(default)]
    pub fused_activation: FusedActivation,
}
