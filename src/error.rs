//! Error types for the maintenance utility.
//!
//! `Error` is what the controller's lifecycle returns; `SensorError` is
//! what every [`SensorPort`](crate::app::ports::SensorPort) call reports.
//! Both are `Copy` so they can be carried inside a
//! [`CalibrationOutcome`](crate::calibration::CalibrationOutcome) without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation outside a calibration procedure funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No sensor answered the startup probe; carries the probe's failure.
    SensorNotDetected(SensorError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorNotDetected(e) => write!(f, "no HDC302x sensor detected: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Failures reported by a [`SensorPort`](crate::app::ports::SensorPort).
///
/// Procedures classify these by *where* they occur: a failed sample inside
/// a heating loop is transient and skipped, while a refused heater or
/// offset command ends the procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The bus transaction itself failed (NACK, arbitration loss, ...).
    Bus,
    /// Data arrived but its CRC did not match.
    Crc,
    /// The device did not accept a command.
    CommandRejected,
    /// No measurement was ready when read back.
    NotReady,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "bus transaction failed"),
            Self::Crc => write!(f, "CRC mismatch"),
            Self::CommandRejected => write!(f, "command rejected"),
            Self::NotReady => write!(f, "measurement not ready"),
        }
    }
}

impl core::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
