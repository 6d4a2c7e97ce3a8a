pub mod cycle_stats;
pub mod gpio;
pub mod loop_config;
pub mod loop_fn;
pub mod sim;

pub use cycle_stats::{CycleStats, LoopSummary};
pub use gpio::{Delay, Direction, GpioPort, NoDelay, PinId, Port, Pull, StdDelay};
pub use loop_config::{LoopConfig, DEFAULT_INPUT_PINS, DEFAULT_OUTPUT_PIN, DEFAULT_PERIOD};
pub use loop_fn::run_io_loop;
pub use sim::SimulatedBoard;
