//! Simulated HDC302x for host runs.
//!
//! A lumped thermal model of the sensing element: the heater pulls the
//! element towards `ambient + rise(power)` with a first-order lag, the
//! relative humidity seen by the element falls as it warms (Magnus
//! saturation curve), and an optional water film pins the reading at
//! 100 %RH until the heat has evaporated it.  Stored offsets round-trip
//! through the same sign/magnitude encoding as the real register.

use std::time::Instant;

use log::debug;

use crate::app::ports::SensorPort;
use crate::calibration::{HeaterPower, Measurement, OffsetPair, UniqueId};
use crate::drivers::hdc302x::{decode_offset, encode_offset, RH_OFFSET_LSB_PCT, T_OFFSET_LSB_C};
use crate::error::SensorError;

/// Thermal time constant of the element (seconds).
const TAU_SECS: f32 = 20.0;
/// Film evaporation per second per degree above ambient.
const EVAPORATION_RATE: f32 = 0.002;

fn steady_rise(power: HeaterPower) -> f32 {
    match power {
        HeaterPower::Off => 0.0,
        HeaterPower::Quarter => 15.0,
        HeaterPower::Half => 35.0,
        HeaterPower::Full => 65.0,
    }
}

/// Saturation vapour pressure (hPa), Magnus form.
fn saturation_hpa(t_c: f32) -> f32 {
    6.112 * ((17.62 * t_c) / (243.12 + t_c)).exp()
}

/// In-memory sensor model implementing [`SensorPort`].
pub struct SimulatedSensor {
    ambient_c: f32,
    ambient_rh: f32,
    element_c: f32,
    /// Remaining surface water, 0.0..=1.0.
    film: f32,
    /// Built-in RH error the offset correction is meant to cancel.
    drift_pct: f32,
    heater: HeaterPower,
    stored: [u8; 2],
    id: UniqueId,
    last_step: Option<Instant>,
}

impl SimulatedSensor {
    pub fn new(ambient_c: f32, ambient_rh: f32) -> Self {
        Self {
            ambient_c,
            ambient_rh,
            element_c: ambient_c,
            film: 0.0,
            drift_pct: 0.0,
            heater: HeaterPower::Off,
            stored: [0, 0],
            id: UniqueId::new(0x5EED_0000_3022),
            last_step: None,
        }
    }

    /// Start with a water film on the element (0.0..=1.0).
    pub fn with_condensation(mut self, film: f32) -> Self {
        self.film = film.clamp(0.0, 1.0);
        self
    }

    /// Add a constant RH reading error.
    pub fn with_drift(mut self, drift_pct: f32) -> Self {
        self.drift_pct = drift_pct;
        self
    }

    /// Advance the model by `dt_secs`.
    pub fn step(&mut self, dt_secs: f32) {
        let target = self.ambient_c + steady_rise(self.heater);
        let alpha = 1.0 - (-dt_secs / TAU_SECS).exp();
        self.element_c += (target - self.element_c) * alpha;

        let excess = (self.element_c - self.ambient_c).max(0.0);
        self.film = (self.film - EVAPORATION_RATE * excess * dt_secs).max(0.0);
    }

    fn stored_offsets(&self) -> OffsetPair {
        OffsetPair {
            temperature_offset_c: decode_offset(self.stored[1], T_OFFSET_LSB_C),
            humidity_offset_pct: decode_offset(self.stored[0], RH_OFFSET_LSB_PCT),
        }
    }

    /// What the element reads right now, before any time passes.
    pub fn measure(&self) -> Measurement {
        let offsets = self.stored_offsets();
        let true_rh = if self.film > 0.0 {
            100.0
        } else {
            self.ambient_rh * saturation_hpa(self.ambient_c) / saturation_hpa(self.element_c)
        };
        Measurement {
            temperature_c: self.element_c + offsets.temperature_offset_c,
            humidity_pct: (true_rh + self.drift_pct + offsets.humidity_offset_pct)
                .clamp(0.0, 100.0),
        }
    }
}

impl SensorPort for SimulatedSensor {
    fn read(&mut self) -> Result<Measurement, SensorError> {
        let now = Instant::now();
        if let Some(prev) = self.last_step {
            self.step(now.duration_since(prev).as_secs_f32());
        }
        self.last_step = Some(now);

        let m = self.measure();
        debug!(
            "SIM | element={:.2}\u{00b0}C film={:.3} heater={:?}",
            self.element_c, self.film, self.heater
        );
        Ok(m)
    }

    fn set_heater(&mut self, power: HeaterPower) -> Result<(), SensorError> {
        self.heater = power;
        Ok(())
    }

    fn read_offsets(&mut self) -> Result<OffsetPair, SensorError> {
        Ok(self.stored_offsets())
    }

    fn write_offsets(&mut self, offsets: OffsetPair) -> Result<(), SensorError> {
        self.stored = [
            encode_offset(offsets.humidity_offset_pct, RH_OFFSET_LSB_PCT),
            encode_offset(offsets.temperature_offset_c, T_OFFSET_LSB_C),
        ];
        Ok(())
    }

    fn read_unique_id(&mut self) -> Result<UniqueId, SensorError> {
        Ok(self.id)
    }
}
