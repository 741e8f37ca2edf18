//! Host clock adapter.
//!
//! Implements [`ClockPort`] with `std::time::Instant` for the monotonic
//! time base and `std::thread::sleep` for delays.

use std::time::{Duration, Instant};

use crate::app::ports::ClockPort;

/// Wall-clock implementation of [`ClockPort`].
pub struct StdClock {
    start: Instant,
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl ClockPort for StdClock {
    /// Milliseconds since construction (monotonic).
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
