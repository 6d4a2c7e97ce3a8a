use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};
use std::time::Duration;

use crate::io_loop::cycle_stats::CycleStats;
use crate::io_loop::gpio::{PinId, Port, Pull};

/// Sampling period of the actuation loop.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(50);

/// Button inputs: PB8 and PB9.
pub const DEFAULT_INPUT_PINS: [PinId; 2] = [PinId::new(Port::B, 8), PinId::new(Port::B, 9)];

/// LED output: PC5.
pub const DEFAULT_OUTPUT_PIN: PinId = PinId::new(Port::C, 5);

/// Configuration for a `run_io_loop` run.
///
/// # Fields
/// - `input_pins`: the two pins sampled as model inputs (x0, x1)
/// - `input_pull`: pull resistor applied to both inputs
/// - `output_pin`: push-pull pin driven from the predicted class
/// - `period`: delay after every cycle
/// - `max_cycles`: stop after this many cycles; `None` runs forever
/// - `stop_flag`: optional atomic flag; when set the loop exits before
///   starting its next cycle
/// - `progress_tx`: optional channel; one `CycleStats` per cycle. If the
///   receiver is dropped the loop stops.
pub struct LoopConfig {
    pub input_pins: [PinId; 2],
    pub input_pull: Pull,
    pub output_pin: PinId,
    pub period: Duration,
    pub max_cycles: Option<u64>,
    pub stop_flag: Option<Arc<AtomicBool>>,
    pub progress_tx: Option<mpsc::Sender<CycleStats>>,
}

impl LoopConfig {
    /// Board defaults: PB8/PB9 pulled down, PC5 output, 50 ms period, no
    /// stop condition.
    pub fn new() -> Self {
        LoopConfig {
            input_pins: DEFAULT_INPUT_PINS,
            input_pull: Pull::Down,
            output_pin: DEFAULT_OUTPUT_PIN,
            period: DEFAULT_PERIOD,
            max_cycles: None,
            stop_flag: None,
            progress_tx: None,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<CycleStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig::new()
    }
}
