use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::error::{ModelError, SchemaVersionMismatch};
use crate::model::operator::OperatorDef;
use crate::model::tensor::TensorDef;

/// Schema version this runtime was written against.
pub const SCHEMA_VERSION: u32 = 3;

/// A parsed, immutable model: tensors, graph inputs/outputs, and the
/// operator list in execution order.
///
/// Built from a serialized blob with [`Model::from_bytes`]; the blob itself is
/// never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub version: u32,
    #[serde(default)]
    pub description: Option<String>,
    pub tensors: Vec<TensorDef>,
    pub inputs: Vec<usize>,
    pub outputs: Vec<usize>,
    pub operators: Vec<OperatorDef>,
}

impl Model {
    /// Parses a JSON model blob and checks that every tensor reference and
    /// every constant buffer is consistent.
    pub fn from_bytes(blob: &[u8]) -> Result<Model, ModelError> {
        let model: Model = serde_json::from_slice(blob)?;
        model.validate()?;
        Ok(model)
    }

    /// Reads a model from a JSON file written in the same format.
    pub fn load_json(path: &str) -> Result<Model, ModelError> {
        let bytes = std::fs::read(path)?;
        Model::from_bytes(&bytes)
    }

    /// Compares the declared schema version with [`SCHEMA_VERSION`].
    pub fn check_version(&self) -> Result<(), SchemaVersionMismatch> {
        if self.version == SCHEMA_VERSION {
            Ok(())
        } else {
            Err(SchemaVersionMismatch { found: self.version, supported: SCHEMA_VERSION })
        }
    }

    pub fn tensor(&self, index: usize) -> Option<&TensorDef> {
        self.tensors.get(index)
    }

    /// Human-readable listing of tensors and operators.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} (schema v{})",
            self.description.as_deref().unwrap_or("unnamed model"),
            self.version
        );
        let _ = writeln!(out, "tensors:");
        for (i, t) in self.tensors.iter().enumerate() {
            let kind = if t.is_constant() { "const" } else { "activation" };
            let quant = match t.quantization {
                Some(q) => format!("scale={:.6} zp={}", q.scale, q.zero_point),
                None => "unquantized".to_string(),
            };
            let _ = writeln!(
                out,
                "  [{i}] {:<45} {:?} {:?} {kind} {quant}",
                t.name, t.dtype, t.shape
            );
        }
        let _ = writeln!(out, "operators:");
        for (i, op) in self.operators.iter().enumerate() {
            let _ = writeln!(
                out,
                "  [{i}] {} {:?} -> {:?} ({:?})",
                op.opcode, op.inputs, op.outputs, op.fused_activation
            );
        }
        let _ = write!(out, "inputs: {:?}  outputs: {:?}", self.inputs, self.outputs);
        out
    }

    fn validate(&self) -> Result<(), ModelError> {
        let count = self.tensors.len();
        for &tensor in self.inputs.iter().chain(self.outputs.iter()) {
            if tensor >= count {
                return Err(ModelError::DanglingIo { tensor, count });
            }
        }
        for (op, def) in self.operators.iter().enumerate() {
            for &tensor in def.inputs.iter().chain(def.outputs.iter()) {
                if tensor >= count {
                    return Err(ModelError::DanglingTensor { op, tensor, count });
                }
            }
        }
        for t in &self.tensors {
            if t.checked_byte_len().is_none() {
                return Err(ModelError::ShapeOverflow { name: t.name.clone() });
            }
            let Some(data) = &t.data else { continue };
            if data.len() != t.element_count() {
                return Err(ModelError::DataLength {
                    name: t.name.clone(),
                    declared: t.element_count(),
                    actual: data.len(),
                });
            }
            let (lo, hi) = t.dtype.range();
            if let Some(&bad) = data.iter().find(|&&v| (v as i64) < lo || (v as i64) > hi) {
                return Err(ModelError::DataRange { name: t.name.clone(), value: bad as i64 });
            }
        }
        Ok(())
    }
}
