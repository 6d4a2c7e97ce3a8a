pub mod quant;
pub mod decision;
pub mod model;
pub mod kernels;
pub mod engine;
pub mod pipeline;
pub mod harness;
pub mod io_loop;
pub mod error;

// Convenience re-exports
pub use quant::codec::{decode, encode, QuantParams};
pub use decision::threshold::classify;
pub use model::model::{Model, SCHEMA_VERSION};
pub use kernels::registry::OpRegistry;
pub use engine::interpreter::Interpreter;
pub use engine::workspace::Workspace;
pub use pipeline::infer::{infer, infer_with_workspace, TENSOR_ARENA_SIZE};
pub use harness::gate_test::{run_gate_test, test_gates};
pub use harness::golden::{Gate, GoldenVector};
pub use harness::report::TestReport;
pub use io_loop::loop_config::LoopConfig;
pub use io_loop::loop_fn::run_io_loop;
pub use error::InferenceError;
