//! Station adapter: bundles the four driven adapters into one value.
//!
//! The core takes a single `hw: &mut H` that satisfies every port it
//! needs, so the calibration engine and the menu controller never hold
//! two mutable borrows at once.  [`Station`] is that `H`: it owns one
//! sensor, one display, one input source and one clock, and forwards
//! each port trait to the matching field.

use crate::app::ports::{
    ButtonLevels, ClockPort, DisplayPort, InputSource, SensorPort, StartupScreen,
};
use crate::calibration::{
    CalibrationOutcome, HeaterPower, Measurement, OffsetPair, Operation, ProgressFrame,
    SensorReading, UniqueId,
};
use crate::error::SensorError;

/// Concrete adapter that combines all peripherals behind the port traits.
pub struct Station<S, D, I, C> {
    pub sensor: S,
    pub display: D,
    pub input: I,
    pub clock: C,
}

impl<S, D, I, C> Station<S, D, I, C> {
    pub fn new(sensor: S, display: D, input: I, clock: C) -> Self {
        Self {
            sensor,
            display,
            input,
            clock,
        }
    }
}

// ── SensorPort ────────────────────────────────────────────────

impl<S: SensorPort, D, I, C> SensorPort for Station<S, D, I, C> {
    fn read(&mut self) -> Result<Measurement, SensorError> {
        self.sensor.read()
    }

    fn set_heater(&mut self, power: HeaterPower) -> Result<(), SensorError> {
        self.sensor.set_heater(power)
    }

    fn read_offsets(&mut self) -> Result<OffsetPair, SensorError> {
        self.sensor.read_offsets()
    }

    fn write_offsets(&mut self, offsets: OffsetPair) -> Result<(), SensorError> {
        self.sensor.write_offsets(offsets)
    }

    fn read_unique_id(&mut self) -> Result<UniqueId, SensorError> {
        self.sensor.read_unique_id()
    }
}

// ── DisplayPort ───────────────────────────────────────────────

impl<S, D: DisplayPort, I, C> DisplayPort for Station<S, D, I, C> {
    fn show_startup(&mut self, screen: StartupScreen) {
        self.display.show_startup(screen);
    }

    fn show_menu(&mut self, selection: usize, footer: Option<&SensorReading>) {
        self.display.show_menu(selection, footer);
    }

    fn show_sensor_info(
        &mut self,
        reading: Option<&SensorReading>,
        offsets: Option<OffsetPair>,
        unique_id: Option<UniqueId>,
    ) {
        self.display.show_sensor_info(reading, offsets, unique_id);
    }

    fn show_confirmation(&mut self, operation: Operation) {
        self.display.show_confirmation(operation);
    }

    fn show_progress(&mut self, frame: &ProgressFrame) {
        self.display.show_progress(frame);
    }

    fn show_result(&mut self, operation: Operation, outcome: &CalibrationOutcome) {
        self.display.show_result(operation, outcome);
    }
}

// ── InputSource / ClockPort ───────────────────────────────────

impl<S, D, I: InputSource, C> InputSource for Station<S, D, I, C> {
    fn read_levels(&mut self) -> ButtonLevels {
        self.input.read_levels()
    }
}

impl<S, D, I, C: ClockPort> ClockPort for Station<S, D, I, C> {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
    }
}
