use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::io_loop::gpio::{Direction, GpioPort, PinId, Pull};

/// In-memory board used by the demo binary and the tests.
///
/// Input levels are whatever was last set with [`SimulatedBoard::set_input`];
/// an unconfigured or never-set input reads according to its pull resistor.
/// With [`SimulatedBoard::with_button_presses`], every read toggles the
/// pin with the given probability, like a user pressing buttons at random.
#[derive(Debug)]
pub struct SimulatedBoard {
    levels: HashMap<PinId, bool>,
    config: HashMap<PinId, (Direction, Pull)>,
    writes: u64,
    rng: Option<(StdRng, f64)>,
}

impl SimulatedBoard {
    pub fn new() -> Self {
        SimulatedBoard { levels: HashMap::new(), config: HashMap::new(), writes: 0, rng: None }
    }

    /// Board whose inputs toggle with probability `toggle_probability` on
    /// each read. Seeded, so runs are reproducible. The probability is
    /// clamped to [0, 1]; NaN means inputs never toggle.
    pub fn with_button_presses(seed: u64, toggle_probability: f64) -> Self {
        let p = if toggle_probability.is_nan() { 0.0 } else { toggle_probability.clamp(0.0, 1.0) };
        SimulatedBoard {
            rng: Some((StdRng::seed_from_u64(seed), p)),
            ..SimulatedBoard::new()
        }
    }

    pub fn set_input(&mut self, pin: PinId, high: bool) {
        self.levels.insert(pin, high);
    }

    /// Current level of any pin, inputs and outputs alike.
    pub fn level(&self, pin: PinId) -> Option<bool> {
        self.levels.get(&pin).copied()
    }

    pub fn configuration(&self, pin: PinId) -> Option<(Direction, Pull)> {
        self.config.get(&pin).copied()
    }

    /// Number of `write_pin` calls so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl Default for SimulatedBoard {
    fn default() -> Self {
        SimulatedBoard::new()
    }
}

impl GpioPort for SimulatedBoard {
    fn configure_pin(&mut self, pin: PinId, direction: Direction, pull: Pull) {
        self.config.insert(pin, (direction, pull));
    }

    fn read_pin(&mut self, pin: PinId) -> bool {
        let resting = matches!(self.configuration(pin), Some((_, Pull::Up)));
        let mut high = self.levels.get(&pin).copied().unwrap_or(resting);
        if let Some((rng, p)) = self.rng.as_mut() {
            if rng.gen_bool(*p) {
                high = !high;
                self.levels.insert(pin, high);
            }
        }
        high
    }

    fn write_pin(&mut self, pin: PinId, high: bool) {
        self.writes += 1;
        self.levels.insert(pin, high);
    }
}
