use serde::{Deserialize, Serialize};

/// Per-cycle record emitted by `run_io_loop`.
///
/// When a `progress_tx` channel is configured in `LoopConfig`, one value is
/// sent at the end of every cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleStats {
    /// 1-based cycle number.
    pub cycle: u64,
    /// Pin levels sampled this cycle.
    pub inputs: (bool, bool),
    /// Model output, or `None` if inference failed.
    pub probability: Option<f32>,
    /// Level written to the output pin, or `None` if actuation was skipped.
    pub output: Option<bool>,
    /// Wall-clock duration of the inference call in microseconds.
    pub elapsed_us: u64,
}

/// Totals returned when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopSummary {
    pub cycles: u64,
    pub actuations: u64,
    pub failures: u64,
}
