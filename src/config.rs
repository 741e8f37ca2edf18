//! Maintenance utility configuration
//!
//! All tunable timings and thresholds for the menu loop and the two heater
//! procedures.  Defaults reproduce the field-proven maintenance cycle; a
//! JSON file can override any of them (see [`crate::adapters::config_file`]).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::calibration::HeaterPower;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// 7-bit I2C address of the sensor (0x44..=0x47 on HDC302x).
    pub i2c_address: u8,

    // --- Idle loop ---
    /// Background sensor read interval while idle in the menu (milliseconds)
    pub sensor_read_interval_ms: u32,
    /// Menu / info screen refresh interval (milliseconds)
    pub display_refresh_ms: u32,
    /// How long the startup splash stays up (milliseconds)
    pub splash_hold_ms: u32,
    /// How long the "sensor found" screen stays up (milliseconds)
    pub ready_hold_ms: u32,

    pub input: InputConfig,
    pub condensation: CondensationConfig,
    pub offset_correction: OffsetCorrectionConfig,

    /// Settling delay between writing zero offsets and reading them back
    pub reset_verify_delay_ms: u32,
}

/// Button handling timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Shared debounce window across all three buttons (milliseconds)
    pub debounce_ms: u32,
    /// Raw-level poll period while a result screen waits for acknowledge
    pub ack_poll_ms: u32,
    /// Hold after the acknowledging press so its release is not seen as input
    pub ack_release_ms: u32,
}

/// Condensation removal procedure parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CondensationConfig {
    pub heater_power: HeaterPower,
    /// Time between samples while heating (milliseconds)
    pub sample_interval_ms: u32,
    /// Give up after this long with the heater on (milliseconds)
    pub timeout_ms: u32,
    /// Humidity below which the element counts as dry (%RH)
    pub dry_threshold_pct: f32,
    /// Humidity below which the progress screen says "Almost done!" (%RH)
    pub almost_done_pct: f32,
    /// Heater-off settling time before the final reading (milliseconds)
    pub cooldown_ms: u32,
}

/// Offset error correction procedure parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetCorrectionConfig {
    pub heater_power: HeaterPower,
    /// Time between samples while heating (milliseconds)
    pub sample_interval_ms: u32,
    /// Stop heating after this long even if the target rise was not reached
    pub timeout_ms: u32,
    /// Heater-off settling time before the confirmatory reading (milliseconds)
    pub cooldown_ms: u32,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            i2c_address: 0x44,

            sensor_read_interval_ms: 1000, // 1 Hz
            display_refresh_ms: 500,       // 2 Hz
            splash_hold_ms: 1500,
            ready_hold_ms: 2000,

            input: InputConfig::default(),
            condensation: CondensationConfig::default(),
            offset_correction: OffsetCorrectionConfig::default(),

            reset_verify_delay_ms: 100,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            ack_poll_ms: 10,
            ack_release_ms: 300,
        }
    }
}

impl Default for CondensationConfig {
    fn default() -> Self {
        Self {
            heater_power: HeaterPower::Half,
            sample_interval_ms: 5_000,
            timeout_ms: 300_000, // 5 min
            dry_threshold_pct: 1.0,
            almost_done_pct: 10.0,
            cooldown_ms: 10_000,
        }
    }
}

impl Default for OffsetCorrectionConfig {
    fn default() -> Self {
        Self {
            heater_power: HeaterPower::Full,
            sample_interval_ms: 2_000,
            timeout_ms: 120_000, // 2 min
            cooldown_ms: 10_000,
        }
    }
}

impl MaintenanceConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0x44..=0x47).contains(&self.i2c_address) {
            return Err(ConfigError::ValidationFailed(
                "i2c_address must be 0x44..=0x47",
            ));
        }
        if self.sensor_read_interval_ms == 0 || self.display_refresh_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "idle loop intervals must be > 0",
            ));
        }
        if self.input.debounce_ms == 0 || self.input.ack_poll_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "debounce_ms and ack_poll_ms must be > 0",
            ));
        }

        let c = &self.condensation;
        let o = &self.offset_correction;
        if c.heater_power == HeaterPower::Off || o.heater_power == HeaterPower::Off {
            return Err(ConfigError::ValidationFailed(
                "procedure heater_power must not be Off",
            ));
        }
        if c.sample_interval_ms == 0 || c.sample_interval_ms > c.timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "condensation sample interval must be within (0, timeout]",
            ));
        }
        if !(c.dry_threshold_pct > 0.0 && c.dry_threshold_pct < c.almost_done_pct) {
            return Err(ConfigError::ValidationFailed(
                "condensation thresholds must satisfy 0 < dry < almost_done",
            ));
        }

        if o.sample_interval_ms == 0 || o.sample_interval_ms > o.timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "offset sample interval must be within (0, timeout]",
            ));
        }
        Ok(())
    }
}
