//! Calibration engine: the timed, heater-driven maintenance procedures.
//!
//! Each procedure is a blocking algorithm over [`SensorPort`],
//! [`DisplayPort`] and [`ClockPort`] that runs to completion and returns
//! exactly one [`CalibrationOutcome`]:
//!
//! ```text
//!  read initial ─▶ heater on ─▶ ┌ delay ─▶ read ─▶ progress ┐ ─▶ heater off ─▶ cooldown ─▶ outcome
//!                               └──────── until done / timeout ┘
//! ```
//!
//! Errors never escape a procedure.  A failed sample inside the heating
//! loop is skipped; a refused heater or offset command ends the procedure
//! with [`CalibrationOutcome::Failure`].

pub mod condensation;
pub mod lut;
pub mod offset;
pub mod reset;

use core::fmt;

use heapless::String;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{ClockPort, DisplayPort, SensorPort};
use crate::config::MaintenanceConfig;
use crate::error::SensorError;

// ---------------------------------------------------------------------------
// Sensor data
// ---------------------------------------------------------------------------

/// Raw measurement as returned by the sensor transport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// A measurement stamped with the time it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    /// [`ClockPort::now_ms`] at the moment of the read.
    pub timestamp_ms: u64,
}

impl SensorReading {
    pub fn new(m: Measurement, timestamp_ms: u64) -> Self {
        Self {
            temperature_c: m.temperature_c,
            humidity_pct: m.humidity_pct,
            timestamp_ms,
        }
    }
}

/// Offset correction stored in sensor EEPROM.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OffsetPair {
    pub temperature_offset_c: f32,
    pub humidity_offset_pct: f32,
}

impl OffsetPair {
    pub const ZERO: Self = Self {
        temperature_offset_c: 0.0,
        humidity_offset_pct: 0.0,
    };
}

/// Factory-programmed 48-bit NIST identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniqueId(u64);

impl UniqueId {
    const MASK: u64 = 0xFFFF_FFFF_FFFF;

    pub fn new(raw: u64) -> Self {
        Self(raw & Self::MASK)
    }

    /// Big-endian byte order, as the sensor returns it.
    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:012X}", self.0)
    }
}

/// Heater drive level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaterPower {
    Off,
    Quarter,
    Half,
    Full,
}

// ---------------------------------------------------------------------------
// Operations and outcomes
// ---------------------------------------------------------------------------

/// The three confirmable maintenance actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CondensationRemoval,
    OffsetCorrection,
    ResetOffsets,
}

impl Operation {
    /// Name shown on the confirmation prompt and result screen.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CondensationRemoval => "CONDENSATION\nREMOVAL",
            Self::OffsetCorrection => "OFFSET ERROR\nCORRECTION",
            Self::ResetOffsets => "RESET OFFSETS\nTO ZERO",
        }
    }

    /// Short title for progress frames.
    pub const fn progress_title(self) -> &'static str {
        match self {
            Self::CondensationRemoval => "CONDENSATION",
            Self::OffsetCorrection => "OFFSET CORR.",
            Self::ResetOffsets => "RESET OFFSETS",
        }
    }
}

/// Why a procedure gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    InitialReadFailed(SensorError),
    HeaterRejected(SensorError),
    HeaterOffRejected(SensorError),
    OffsetWriteRejected(SensorError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialReadFailed(e) => write!(f, "initial read failed: {e}"),
            Self::HeaterRejected(e) => write!(f, "heater enable rejected: {e}"),
            Self::HeaterOffRejected(e) => write!(f, "heater disable rejected: {e}"),
            Self::OffsetWriteRejected(e) => write!(f, "offset write rejected: {e}"),
        }
    }
}

/// Procedure-specific detail attached to a successful outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutcomeMetrics {
    Condensation {
        initial: SensorReading,
        peak_rise_c: f32,
        elapsed_secs: u32,
        samples: u32,
    },
    OffsetCorrection {
        initial: SensorReading,
        target_rise_c: f32,
        achieved_rise_c: f32,
        /// `false` when heating stopped on the time limit instead.
        target_reached: bool,
        /// Humidity deficit measured at the end of heating (%RH).
        humidity_offset_pct: f32,
        /// The pair actually programmed into the sensor.
        written: OffsetPair,
        /// Read-back after the write; `None` if it could not be read.
        verified: Option<OffsetPair>,
    },
    OffsetReset {
        /// Read-back after writing zero; `None` means unverified.
        verified: Option<OffsetPair>,
    },
}

/// Terminal result of one procedure invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationOutcome {
    Success {
        /// `None` only for operations that take no measurement.
        final_reading: Option<SensorReading>,
        metrics: OutcomeMetrics,
    },
    Timeout {
        last_reading: SensorReading,
    },
    Failure {
        reason: FailureReason,
    },
}

impl CalibrationOutcome {
    pub(crate) fn failure(reason: FailureReason) -> Self {
        error!("Procedure failed: {}", reason);
        Self::Failure { reason }
    }
}

// ---------------------------------------------------------------------------
// Progress frames
// ---------------------------------------------------------------------------

/// Fixed-capacity status line ("Heating...", "Target:+42C", ...).
pub type StatusText = String<24>;

/// One live progress update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressFrame {
    pub title: &'static str,
    pub status: StatusText,
    pub reading: SensorReading,
    /// Temperature rise over the initial reading; 0 when not applicable.
    pub rise_c: f32,
    /// Whole seconds since the heater was enabled; 0 when not applicable.
    pub elapsed_secs: u32,
}

/// Keeps whatever fits in a [`StatusText`] and drops the rest.
struct Truncating<'a>(&'a mut StatusText);

impl fmt::Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.0.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Format a status line, truncated at capacity.
pub(crate) fn status_fmt(args: fmt::Arguments<'_>) -> StatusText {
    let mut out = StatusText::new();
    if fmt::write(&mut Truncating(&mut out), args).is_err() {
        warn!("status text formatting failed");
    }
    out
}

pub(crate) fn status_text(s: &str) -> StatusText {
    status_fmt(format_args!("{s}"))
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Result of one heating loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeatingSummary {
    /// Last successfully read sample (or the initial reading if none).
    pub last: SensorReading,
    pub samples: u32,
    pub elapsed_secs: u32,
    pub peak_rise_c: f32,
    /// The stop condition fired before the time limit.
    pub reached: bool,
}

/// Runs maintenance procedures against a piece of hardware.
///
/// `hw` satisfies all three ports at once, so the engine holds a single
/// mutable borrow for the whole procedure.
pub struct CalibrationEngine<'a, H> {
    hw: &'a mut H,
    config: &'a MaintenanceConfig,
}

impl<'a, H> CalibrationEngine<'a, H>
where
    H: SensorPort + DisplayPort + ClockPort,
{
    pub fn new(hw: &'a mut H, config: &'a MaintenanceConfig) -> Self {
        Self { hw, config }
    }

    /// Run `operation` to completion.
    pub fn run(&mut self, operation: Operation) -> CalibrationOutcome {
        info!("=== Starting {:?} ===", operation);
        match operation {
            Operation::CondensationRemoval => self.remove_condensation(),
            Operation::OffsetCorrection => self.correct_offset_error(),
            Operation::ResetOffsets => self.reset_offsets(),
        }
    }

    // ── Shared steps ──────────────────────────────────────────

    /// Read the sensor and stamp the result with the current time.
    fn sample(&mut self) -> Result<SensorReading, SensorError> {
        let m = self.hw.read()?;
        Ok(SensorReading::new(m, self.hw.now_ms()))
    }

    fn progress(
        &mut self,
        title: &'static str,
        status: StatusText,
        reading: SensorReading,
        rise_c: f32,
        elapsed_secs: u32,
    ) {
        let frame = ProgressFrame {
            title,
            status,
            reading,
            rise_c,
            elapsed_secs,
        };
        self.hw.show_progress(&frame);
    }

    /// Sample every `interval_ms` until `done` fires or `timeout_ms` has
    /// passed since entry.  Failed samples are skipped without touching
    /// the timeout clock.
    pub(crate) fn heat_until(
        &mut self,
        title: &'static str,
        initial: SensorReading,
        interval_ms: u32,
        timeout_ms: u32,
        status: impl Fn(&SensorReading) -> StatusText,
        done: impl Fn(&SensorReading, f32) -> bool,
    ) -> HeatingSummary {
        let start = self.hw.now_ms();
        let mut summary = HeatingSummary {
            last: initial,
            samples: 0,
            elapsed_secs: 0,
            peak_rise_c: 0.0,
            reached: false,
        };

        while self.hw.now_ms().saturating_sub(start) < u64::from(timeout_ms) {
            self.hw.delay_ms(interval_ms);

            let reading = match self.sample() {
                Ok(r) => r,
                Err(e) => {
                    warn!("Failed to read sensor during heating: {}", e);
                    continue;
                }
            };

            let rise = reading.temperature_c - initial.temperature_c;
            let elapsed_secs = (self.hw.now_ms().saturating_sub(start) / 1000) as u32;
            summary.last = reading;
            summary.samples += 1;
            summary.elapsed_secs = elapsed_secs;
            summary.peak_rise_c = summary.peak_rise_c.max(rise);

            info!(
                "T={:.2}\u{00b0}C (+{:.2}) RH={:.2}% t={}s",
                reading.temperature_c, rise, reading.humidity_pct, elapsed_secs
            );
            self.progress(title, status(&reading), reading, rise, elapsed_secs);

            if done(&reading, rise) {
                summary.reached = true;
                break;
            }
        }

        summary
    }

    fn heater_on(&mut self, power: HeaterPower) -> Result<(), SensorError> {
        self.hw.set_heater(power)?;
        info!("Heater enabled at {:?} power", power);
        Ok(())
    }

    fn heater_off(&mut self) -> Result<(), SensorError> {
        match self.hw.set_heater(HeaterPower::Off) {
            Ok(()) => {
                info!("Heater disabled");
                Ok(())
            }
            Err(e) => {
                error!("Heater disable rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Show a cooling frame and hold for `cooldown_ms`.
    fn cool_down(&mut self, title: &'static str, last: SensorReading, cooldown_ms: u32) {
        info!("Cooling down for {} ms", cooldown_ms);
        self.progress(title, status_text("Cooling..."), last, 0.0, 0);
        self.hw.delay_ms(cooldown_ms);
    }
}
