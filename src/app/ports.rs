//! Port traits: the hexagonal boundary between the maintenance core and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MenuController / CalibrationEngine
//! ```
//!
//! Driven adapters (sensor transport, display, buttons, clock, config
//! storage) implement these traits.  The core consumes them via generics,
//! so it never touches the I2C bus, GPIO or a framebuffer directly.

use crate::calibration::{
    CalibrationOutcome, HeaterPower, Measurement, OffsetPair, Operation, ProgressFrame,
    SensorReading, UniqueId,
};
use crate::config::MaintenanceConfig;
use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: HDC302x ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Everything the procedures need from the humidity sensor.
pub trait SensorPort {
    /// Trigger an on-demand measurement and return it.
    fn read(&mut self) -> Result<Measurement, SensorError>;

    /// Switch the built-in heater.  `HeaterPower::Off` disables it.
    fn set_heater(&mut self, power: HeaterPower) -> Result<(), SensorError>;

    /// Read the offset correction currently stored in sensor EEPROM.
    fn read_offsets(&mut self) -> Result<OffsetPair, SensorError>;

    /// Program a new offset correction into sensor EEPROM.
    fn write_offsets(&mut self, offsets: OffsetPair) -> Result<(), SensorError>;

    /// Read the factory-programmed 48-bit NIST identifier.
    fn read_unique_id(&mut self) -> Result<UniqueId, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → screen)
// ───────────────────────────────────────────────────────────────

/// Boot-time screens shown before the menu takes over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartupScreen {
    /// Splash while peripherals come up.
    Initializing,
    /// Sensor answered; show its identity.
    Ready { unique_id: Option<UniqueId> },
    /// No sensor answered the probe; the utility halts here.
    SensorMissing,
}

/// Renders status frames.  Implementations own layout entirely; the core
/// only says *what* to show.
pub trait DisplayPort {
    fn show_startup(&mut self, screen: StartupScreen);

    /// Main menu with `selection` highlighted and the latest reading in
    /// the footer (if one has been taken yet).
    fn show_menu(&mut self, selection: usize, footer: Option<&SensorReading>);

    fn show_sensor_info(
        &mut self,
        reading: Option<&SensorReading>,
        offsets: Option<OffsetPair>,
        unique_id: Option<UniqueId>,
    );

    /// Ask the user to confirm a long-running or destructive operation.
    fn show_confirmation(&mut self, operation: Operation);

    /// Live progress while a procedure runs.
    fn show_progress(&mut self, frame: &ProgressFrame);

    /// Terminal result of a procedure; stays up until acknowledged.
    fn show_result(&mut self, operation: Operation, outcome: &CalibrationOutcome);
}

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: buttons → domain)
// ───────────────────────────────────────────────────────────────

/// Raw pressed/released level of each of the three buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonLevels {
    /// Button A: "previous" in the menu, "confirm" on prompts.
    pub a: bool,
    /// Button B: "select".
    pub b: bool,
    /// Button C: "next" in the menu, "cancel" / "back" elsewhere.
    pub c: bool,
}

impl ButtonLevels {
    pub const RELEASED: Self = Self {
        a: false,
        b: false,
        c: false,
    };

    pub fn any(self) -> bool {
        self.a || self.b || self.c
    }
}

/// Samples the button panel.  Debounce and edge detection live in the
/// core ([`EdgeDetector`](crate::drivers::button::EdgeDetector)).
pub trait InputSource {
    fn read_levels(&mut self) -> ButtonLevels;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time and blocking delay.
///
/// Every wait in the procedures goes through `delay_ms`, so a simulated
/// clock can run a five-minute heating cycle instantly.
pub trait ClockPort {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    /// Block for `ms` milliseconds.  Nothing else runs meanwhile.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`MaintenanceConfig`].
///
/// Implementations MUST validate before persisting and reject invalid
/// ranges with [`ConfigError::ValidationFailed`] rather than clamping.
pub trait ConfigPort {
    /// Load configuration.  Returns [`ConfigError::NotFound`] if nothing
    /// is stored yet.
    fn load(&self) -> Result<MaintenanceConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &MaintenanceConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first run).
    NotFound,
    /// Stored config failed to deserialize.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}
