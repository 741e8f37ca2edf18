//! Mock hardware adapter for integration tests.
//!
//! Implements every port at once.  Sensor calls and screens are recorded
//! so tests can assert on the full history; time only moves when the
//! code under test calls `delay_ms` (or a test calls [`MockHardware::advance`]).

use std::collections::VecDeque;

use hdc_maint::app::ports::{
    ButtonLevels, ClockPort, DisplayPort, InputSource, SensorPort, StartupScreen,
};
use hdc_maint::calibration::{
    CalibrationOutcome, HeaterPower, Measurement, OffsetPair, Operation, ProgressFrame,
    SensorReading, UniqueId,
};
use hdc_maint::error::SensorError;

// ── Records ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorCall {
    Read,
    SetHeater(HeaterPower),
    ReadOffsets,
    WriteOffsets(OffsetPair),
    ReadUniqueId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Startup(StartupScreen),
    Menu {
        selection: usize,
        footer: Option<SensorReading>,
    },
    SensorInfo {
        offsets: Option<OffsetPair>,
    },
    Confirmation(Operation),
    Progress(ProgressFrame),
    Result(Operation, CalibrationOutcome),
}

pub const A: ButtonLevels = ButtonLevels {
    a: true,
    b: false,
    c: false,
};
pub const B: ButtonLevels = ButtonLevels {
    a: false,
    b: true,
    c: false,
};
pub const C: ButtonLevels = ButtonLevels {
    a: false,
    b: false,
    c: true,
};
pub const UP: ButtonLevels = ButtonLevels::RELEASED;

/// Stop a runaway acknowledge wait instead of hanging the test run.
const MAX_IDLE_LEVEL_READS: u32 = 1_000_000;

pub fn m(temperature_c: f32, humidity_pct: f32) -> Measurement {
    Measurement {
        temperature_c,
        humidity_pct,
    }
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub now_ms: u64,
    pub calls: Vec<SensorCall>,
    pub screens: Vec<Screen>,
    pub delays: Vec<u32>,

    /// Scripted read results, consumed in order.
    pub reads: VecDeque<Result<Measurement, SensorError>>,
    /// Returned once `reads` is empty.
    pub default_read: Result<Measurement, SensorError>,

    pub heater_on_result: Result<(), SensorError>,
    pub heater_off_result: Result<(), SensorError>,
    pub write_offsets_result: Result<(), SensorError>,
    pub fail_offset_reads: bool,
    pub stored_offsets: OffsetPair,
    pub unique_id: Result<UniqueId, SensorError>,

    /// Scripted button levels, consumed in order; released once empty.
    pub levels: VecDeque<ButtonLevels>,
    idle_level_reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            calls: Vec::new(),
            screens: Vec::new(),
            delays: Vec::new(),
            reads: VecDeque::new(),
            default_read: Ok(m(22.0, 50.0)),
            heater_on_result: Ok(()),
            heater_off_result: Ok(()),
            write_offsets_result: Ok(()),
            fail_offset_reads: false,
            stored_offsets: OffsetPair::ZERO,
            unique_id: Ok(UniqueId::new(0x0123_4567_89AB)),
            levels: VecDeque::new(),
            idle_level_reads: 0,
        }
    }

    pub fn script_reads(&mut self, readings: impl IntoIterator<Item = Measurement>) {
        self.reads.extend(readings.into_iter().map(Ok));
    }

    pub fn push_levels(&mut self, levels: ButtonLevels) {
        self.levels.push_back(levels);
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    pub fn heater_calls(&self) -> Vec<HeaterPower> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SensorCall::SetHeater(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn heater_off_count(&self) -> usize {
        self.heater_calls()
            .iter()
            .filter(|p| **p == HeaterPower::Off)
            .count()
    }

    pub fn offset_writes(&self) -> Vec<OffsetPair> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SensorCall::WriteOffsets(o) => Some(*o),
                _ => None,
            })
            .collect()
    }

    pub fn read_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == SensorCall::Read)
            .count()
    }

    pub fn progress_frames(&self) -> Vec<&ProgressFrame> {
        self.screens
            .iter()
            .filter_map(|s| match s {
                Screen::Progress(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn last_screen(&self) -> Option<&Screen> {
        self.screens.last()
    }

    pub fn clear_records(&mut self) {
        self.calls.clear();
        self.screens.clear();
        self.delays.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read(&mut self) -> Result<Measurement, SensorError> {
        self.calls.push(SensorCall::Read);
        self.reads.pop_front().unwrap_or(self.default_read)
    }

    fn set_heater(&mut self, power: HeaterPower) -> Result<(), SensorError> {
        self.calls.push(SensorCall::SetHeater(power));
        if power == HeaterPower::Off {
            self.heater_off_result
        } else {
            self.heater_on_result
        }
    }

    fn read_offsets(&mut self) -> Result<OffsetPair, SensorError> {
        self.calls.push(SensorCall::ReadOffsets);
        if self.fail_offset_reads {
            Err(SensorError::Bus)
        } else {
            Ok(self.stored_offsets)
        }
    }

    fn write_offsets(&mut self, offsets: OffsetPair) -> Result<(), SensorError> {
        self.calls.push(SensorCall::WriteOffsets(offsets));
        self.write_offsets_result?;
        self.stored_offsets = offsets;
        Ok(())
    }

    fn read_unique_id(&mut self) -> Result<UniqueId, SensorError> {
        self.calls.push(SensorCall::ReadUniqueId);
        self.unique_id
    }
}

impl DisplayPort for MockHardware {
    fn show_startup(&mut self, screen: StartupScreen) {
        self.screens.push(Screen::Startup(screen));
    }

    fn show_menu(&mut self, selection: usize, footer: Option<&SensorReading>) {
        self.screens.push(Screen::Menu {
            selection,
            footer: footer.copied(),
        });
    }

    fn show_sensor_info(
        &mut self,
        _reading: Option<&SensorReading>,
        offsets: Option<OffsetPair>,
        _unique_id: Option<UniqueId>,
    ) {
        self.screens.push(Screen::SensorInfo { offsets });
    }

    fn show_confirmation(&mut self, operation: Operation) {
        self.screens.push(Screen::Confirmation(operation));
    }

    fn show_progress(&mut self, frame: &ProgressFrame) {
        self.screens.push(Screen::Progress(frame.clone()));
    }

    fn show_result(&mut self, operation: Operation, outcome: &CalibrationOutcome) {
        self.screens.push(Screen::Result(operation, *outcome));
    }
}

impl InputSource for MockHardware {
    fn read_levels(&mut self) -> ButtonLevels {
        match self.levels.pop_front() {
            Some(l) => {
                self.idle_level_reads = 0;
                l
            }
            None => {
                self.idle_level_reads += 1;
                assert!(
                    self.idle_level_reads < MAX_IDLE_LEVEL_READS,
                    "waiting for a button press that was never scripted"
                );
                ButtonLevels::RELEASED
            }
        }
    }
}

impl ClockPort for MockHardware {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.now_ms += u64::from(ms);
    }
}
