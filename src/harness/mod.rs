pub mod golden;
pub mod report;

pub use gate_test::{run_gate_test, test_gates, GateOutcome};
pub use golden::{Gate, GoldenVector, CANONICAL_INPUTS};
pub use report::{TestReport, VectorRecord};
