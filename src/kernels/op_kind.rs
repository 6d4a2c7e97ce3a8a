use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::interpreter::ExecContext;
use crate::engine::workspace::Workspace;
use crate::error::{AllocationError, KernelError};
use crate::kernels::fully_connected::{self, FullyConnectedData};
use crate::kernels::logistic::{self, LogisticData};
use crate::kernels::OpContext;

/// The closed set of kernels the engine can execute.
///
/// Each variant knows how to prepare itself against a model (validate
/// operands, derive integer parameters, reserve scratch) and how to apply
/// itself to allocated tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Dense affine transform `y = W·x + b` with an optional fused clamp.
    FullyConnected,
    /// Element-wise sigmoid `1 / (1 + e^-x)`.
    Logistic,
}

/// Per-operator state produced by [`OpKind::prepare`].
#[derive(Debug, Clone)]
pub enum OpData {
    FullyConnected(FullyConnectedData),
    Logistic(LogisticData),
}

impl OpKind {
    pub const ALL: [OpKind; 2] = [OpKind::FullyConnected, OpKind::Logistic];

    pub fn name(&self) -> &'static str {
        match self {
            OpKind::FullyConnected => "fully_connected",
            OpKind::Logistic => "logistic",
        }
    }

    /// Runs once per interpreter during tensor allocation.
    pub fn prepare(
        &self,
        ctx: &OpContext<'_>,
        workspace: &mut Workspace<'_>,
    ) -> Result<OpData, AllocationError> {
        match self {
            OpKind::FullyConnected => fully_connected::prepare(ctx).map(OpData::FullyConnected),
            OpKind::Logistic => logistic::prepare(ctx, workspace).map(OpData::Logistic),
        }
    }

    /// Executes the operator over already-allocated tensors.
    pub fn apply(&self, data: &OpData, exec: &mut ExecContext<'_, '_>) -> Result<(), KernelError> {
        match (self, data) {
            (OpKind::FullyConnected, OpData::FullyConnected(d)) => fully_connected::apply(d, exec),
            (OpKind::Logistic, OpData::Logistic(d)) => logistic::apply(d, exec),
            _ => Err(KernelError::Failed {
                op: exec.op_index(),
                kind: *self,
                reason: "prepared data belongs to a different kernel",
            }),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
