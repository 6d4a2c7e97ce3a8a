pub mod infer;

pub use infer::{infer, infer_with_workspace, run_model, TENSOR_ARENA_SIZE};
