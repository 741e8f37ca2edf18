//! Shared mutable context threaded through every menu handler.
//!
//! `MenuContext` is the single struct that state handlers read from and
//! write to: the main-menu cursor, the cached sensor data shown on the
//! menu and info screens, the operation awaiting confirmation, and a
//! redraw request for the controller.

use crate::calibration::{OffsetPair, Operation, SensorReading, UniqueId};

/// The shared context passed to every state handler function.
#[derive(Debug, Clone, Default)]
pub struct MenuContext {
    // -- Navigation --
    /// Highlighted main-menu item.
    pub selection: usize,
    /// Operation chosen on a confirmation screen, consumed by the
    /// controller when the menu enters `RunningOperation`.
    pub pending: Option<Operation>,
    /// Set by handlers when the current screen must be redrawn now
    /// rather than on the next refresh tick.
    pub redraw: bool,

    // -- Cached sensor data --
    /// Latest idle-loop reading.  `None` until the first successful read.
    pub reading: Option<SensorReading>,
    /// Offsets last read back from the sensor.  `None` means unknown:
    /// never assumed after a write, only replaced by a fresh read.
    pub offsets: Option<OffsetPair>,
    pub unique_id: Option<UniqueId>,
}

impl MenuContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the redraw request, clearing it.
    pub fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }
}
