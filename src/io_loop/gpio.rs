use std::fmt;
use std::time::Duration;

/// GPIO bank letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Port {
    A,
    B,
    C,
    D,
}

/// A single pin, e.g. `PB8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId {
    pub port: Port,
    pub number: u8,
}

impl PinId {
    pub const fn new(port: Port, number: u8) -> PinId {
        PinId { port, number }
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:?}{}", self.port, self.number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    /// Push-pull output.
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Digital I/O as the board support layer exposes it. Calls are synchronous
/// and infallible.
pub trait GpioPort {
    fn configure_pin(&mut self, pin: PinId, direction: Direction, pull: Pull);
    fn read_pin(&mut self, pin: PinId) -> bool;
    fn write_pin(&mut self, pin: PinId, high: bool);
}

/// Blocking delay between loop iterations.
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Returns immediately; for tests and simulations that should not wait.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay(&mut self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_names_read_like_datasheet_labels() {
        assert_eq!(PinId::new(Port::B, 8).to_string(), "PB8");
        assert_eq!(PinId::new(Port::C, 5).to_string(), "PC5");
    }
}
