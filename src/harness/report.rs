use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one golden vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub inputs: (f32, f32),
    pub expected: u8,
    pub predicted_probability: f32,
    pub predicted_label: u8,
    pub passed: bool,
}

/// Renders as `|[0.0, 1.0]|[1]| -> 0.992188 -> Pass`.
impl fmt::Display for VectorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "|[{:.1}, {:.1}]|[{}]| -> {:.6} -> {}",
            self.inputs.0,
            self.inputs.1,
            self.expected,
            self.predicted_probability,
            if self.passed { "Pass" } else { "Fail" }
        )
    }
}

/// Per-vector results of one gate test plus the aggregate pass count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub records: Vec<VectorRecord>,
    pub passed: usize,
}

impl TestReport {
    pub fn push(&mut self, record: VectorRecord) {
        if record.passed {
            self.passed += 1;
        }
        self.records.push(record);
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total()
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{record}")?;
        }
        write!(f, "{}/{} passed", self.passed, self.total())
    }
}
