use tracing::debug;

use crate::engine::workspace::{OutputSplit, Region, Workspace};
use crate::error::{AllocationError, KernelError};
use crate::kernels::op_kind::{OpData, OpKind};
use crate::kernels::registry::OpRegistry;
use crate::kernels::OpContext;
use crate::model::model::Model;
use crate::model::operator::OperatorDef;
use crate::model::tensor::DataType;
use crate::quant::codec::QuantParams;

/// A graph input or output bound to its workspace storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorHandle {
    pub index: usize,
    pub dtype: DataType,
    pub quantization: Option<QuantParams>,
    /// Number of elements.
    pub len: usize,
    region: Region,
}

struct PreparedOp {
    kind: OpKind,
    data: OpData,
}

/// One runnable engine instance: a model, the kernels it may use, and the
/// workspace its activations live in.
///
/// Built fresh for every inference call; nothing carries over between
/// instances.
pub struct Interpreter<'m, 'a> {
    model: &'m Model,
    registry: &'m OpRegistry,
    workspace: Workspace<'a>,
    regions: Vec<Option<Region>>,
    prepared: Vec<PreparedOp>,
    allocated: bool,
}

impl<'m, 'a> Interpreter<'m, 'a> {
    pub fn new(model: &'m Model, registry: &'m OpRegistry, workspace: Workspace<'a>) -> Self {
        Interpreter {
            model,
            registry,
            workspace,
            regions: vec![None; model.tensors.len()],
            prepared: Vec::with_capacity(model.operators.len()),
            allocated: false,
        }
    }

    /// Places every activation tensor in the workspace and prepares each
    /// operator. Calling it again after success is a no-op.
    pub fn allocate_tensors(&mut self) -> Result<(), AllocationError> {
        if self.allocated {
            return Ok(());
        }
        let model = self.model;

        for (op, def) in model.operators.iter().enumerate() {
            if !self.registry.contains(def.opcode) {
                return Err(AllocationError::UnregisteredOperator { op, kind: def.opcode });
            }
        }

        for index in activation_tensors(model) {
            let tensor = &model.tensors[index];
            if tensor.dtype != DataType::Int8 {
                return Err(AllocationError::InvalidTensor {
                    tensor: index,
                    reason: "activation tensors must be int8",
                });
            }
            self.regions[index] = Some(self.workspace.allocate(tensor.byte_len())?);
        }

        for (index, def) in model.operators.iter().enumerate() {
            let ctx = OpContext { index, def, model };
            let data = def.opcode.prepare(&ctx, &mut self.workspace)?;
            self.prepared.push(PreparedOp { kind: def.opcode, data });
        }

        self.allocated = true;
        debug!(
            used = self.workspace.used(),
            capacity = self.workspace.capacity(),
            "tensor arena allocated"
        );
        Ok(())
    }

    /// Workspace bytes consumed so far, alignment padding included.
    pub fn arena_used_bytes(&self) -> usize {
        self.workspace.used()
    }

    pub fn inputs_len(&self) -> usize {
        self.model.inputs.len()
    }

    pub fn outputs_len(&self) -> usize {
        self.model.outputs.len()
    }

    /// Handle to the `n`th graph input, once tensors are allocated.
    pub fn input(&self, n: usize) -> Option<TensorHandle> {
        self.handle(self.model.inputs.get(n).copied()?)
    }

    /// Handle to the `n`th graph output, once tensors are allocated.
    pub fn output(&self, n: usize) -> Option<TensorHandle> {
        self.handle(self.model.outputs.get(n).copied()?)
    }

    fn handle(&self, index: usize) -> Option<TensorHandle> {
        let region = (*self.regions.get(index)?)?;
        let tensor = self.model.tensor(index)?;
        Some(TensorHandle {
            index,
            dtype: tensor.dtype,
            quantization: tensor.quantization,
            len: tensor.element_count(),
            region,
        })
    }

    /// Writes one int8 slot of a bound tensor. Returns false if `slot` is out
    /// of range.
    pub fn set_i8(&mut self, handle: &TensorHandle, slot: usize, value: i8) -> bool {
        match self.workspace.bytes_mut(handle.region).get_mut(slot) {
            Some(byte) => {
                *byte = value as u8;
                true
            }
            None => false,
        }
    }

    /// Reads one int8 slot of a bound tensor.
    pub fn get_i8(&self, handle: &TensorHandle, slot: usize) -> Option<i8> {
        self.workspace.bytes(handle.region).get(slot).map(|&b| b as i8)
    }

    /// Runs every operator once, in model order.
    pub fn invoke(&mut self) -> Result<(), KernelError> {
        if !self.allocated {
            return Err(KernelError::NotAllocated);
        }
        let model = self.model;
        for (index, op) in self.prepared.iter().enumerate() {
            let mut exec = ExecContext {
                index,
                kind: op.kind,
                def: &model.operators[index],
                model,
                regions: &self.regions,
                workspace: &mut self.workspace,
            };
            op.kind.apply(&op.data, &mut exec)?;
        }
        Ok(())
    }
}

/// Graph inputs, graph outputs and operator outputs that carry no constant
/// data, in tensor order, without duplicates.
fn activation_tensors(model: &Model) -> Vec<usize> {
    let mut wanted = vec![false; model.tensors.len()];
    let referenced = model
        .inputs
        .iter()
        .chain(model.outputs.iter())
        .chain(model.operators.iter().flat_map(|op| op.inputs.iter().chain(op.outputs.iter())));
    for &index in referenced {
        if !model.tensors[index].is_constant() {
            wanted[index] = true;
        }
    }
    wanted
        .iter()
        .enumerate()
        .filter_map(|(i, &w)| w.then_some(i))
        .collect()
}

/// What a kernel sees while it runs: its operator entry, constant data from
/// the model, and the workspace regions of its activations.
pub struct ExecContext<'i, 'a> {
    index: usize,
    kind: OpKind,
    def: &'i OperatorDef,
    model: &'i Model,
    regions: &'i [Option<Region>],
    workspace: &'i mut Workspace<'a>,
}

impl<'i, 'a> ExecContext<'i, 'a> {
    pub fn op_index(&self) -> usize {
        self.index
    }

    pub fn fail(&self, reason: &'static str) -> KernelError {
        KernelError::Failed { op: self.index, kind: self.kind, reason }
    }

    /// Workspace region of the `n`th operator input.
    pub fn input_region(&self, n: usize) -> Result<Region, KernelError> {
        self.region(self.def.inputs.get(n).copied())
    }

    /// Workspace region of the `n`th operator output.
    pub fn output_region(&self, n: usize) -> Result<Region, KernelError> {
        self.region(self.def.outputs.get(n).copied())
    }

    fn region(&self, tensor: Option<usize>) -> Result<Region, KernelError> {
        tensor
            .and_then(|t| self.regions.get(t).copied().flatten())
            .ok_or_else(|| self.fail("activation tensor has no workspace storage"))
    }

    /// Constant data of the `n`th operator input, if it has any.
    pub fn constant(&self, n: usize) -> Option<&'i [i32]> {
        let model: &'i Model = self.model;
        let tensor = model.tensor(*self.def.inputs.get(n)?)?;
        tensor.data.as_deref()
    }

    pub fn split_at_output(&mut self, output: Region) -> OutputSplit<'_> {
        self.workspace.split_at_output(output)
    }
}
