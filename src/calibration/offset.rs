//! Offset error correction.
//!
//! Full-power heating drives the true relative humidity at the sensing
//! element towards zero.  Once the temperature has risen by the amount
//! the [`lut`](super::lut) predicts for the starting conditions, whatever
//! humidity the sensor still reports is its offset error, which is then
//! programmed back as a negative RH correction.
//!
//! Reaching the time limit before the target rise is not a failure: the
//! last observed humidity is written as the correction all the same.

use log::{info, warn};

use super::{
    lut, status_fmt, status_text, CalibrationEngine, CalibrationOutcome, FailureReason, OffsetPair,
    Operation, OutcomeMetrics, StatusText,
};
use crate::app::ports::{ClockPort, DisplayPort, SensorPort};

const TITLE: &str = Operation::OffsetCorrection.progress_title();

fn target_status(target_rise_c: f32) -> StatusText {
    status_fmt(format_args!("Target:+{:.0}C", target_rise_c))
}

impl<H> CalibrationEngine<'_, H>
where
    H: SensorPort + DisplayPort + ClockPort,
{
    /// Measure the humidity offset error and write the correction to the sensor.
    pub fn correct_offset_error(&mut self) -> CalibrationOutcome {
        let cfg = self.config.offset_correction.clone();

        let initial = match self.sample() {
            Ok(r) => r,
            Err(e) => return CalibrationOutcome::failure(FailureReason::InitialReadFailed(e)),
        };
        info!(
            "Initial T={:.2}\u{00b0}C RH={:.2}%",
            initial.temperature_c, initial.humidity_pct
        );

        let target = lut::target_rise(initial.humidity_pct, initial.temperature_c);
        info!(
            "Target temperature rise: {:.2}\u{00b0}C (row {}, col {})",
            target,
            lut::humidity_row(initial.humidity_pct),
            lut::temperature_col(initial.temperature_c)
        );

        if let Err(e) = self.heater_on(cfg.heater_power) {
            return CalibrationOutcome::failure(FailureReason::HeaterRejected(e));
        }

        self.progress(TITLE, status_text("Heating..."), initial, 0.0, 0);

        let heating = self.heat_until(
            TITLE,
            initial,
            cfg.sample_interval_ms,
            cfg.timeout_ms,
            |_| target_status(target),
            |_, rise| rise >= target,
        );

        if let Err(e) = self.heater_off() {
            return CalibrationOutcome::failure(FailureReason::HeaterOffRejected(e));
        }

        let achieved = heating.last.temperature_c - initial.temperature_c;
        if heating.reached {
            info!("Target temperature reached (+{:.2}\u{00b0}C)", achieved);
        } else {
            warn!(
                "Time limit reached at +{:.2}\u{00b0}C of +{:.2}\u{00b0}C; using last humidity anyway",
                achieved, target
            );
        }

        let humidity_offset = heating.last.humidity_pct;
        let written = OffsetPair {
            temperature_offset_c: 0.0,
            humidity_offset_pct: -humidity_offset,
        };
        info!("Calculated humidity offset: {:.2}% RH", humidity_offset);

        if let Err(e) = self.hw.write_offsets(written) {
            return CalibrationOutcome::failure(FailureReason::OffsetWriteRejected(e));
        }
        info!("Offsets written to sensor");

        let verified = match self.hw.read_offsets() {
            Ok(v) => {
                info!(
                    "Verified offsets: T={:.2}\u{00b0}C RH={:.2}%",
                    v.temperature_offset_c, v.humidity_offset_pct
                );
                Some(v)
            }
            Err(e) => {
                warn!("Offset verification unavailable: {}", e);
                None
            }
        };

        self.cool_down(TITLE, heating.last, cfg.cooldown_ms);

        let confirmatory = match self.sample() {
            Ok(r) => {
                info!(
                    "Corrected reading: T={:.2}\u{00b0}C RH={:.2}%",
                    r.temperature_c, r.humidity_pct
                );
                Some(r)
            }
            Err(e) => {
                warn!("Confirmatory read failed: {}", e);
                None
            }
        };

        CalibrationOutcome::Success {
            final_reading: Some(confirmatory.unwrap_or(heating.last)),
            metrics: OutcomeMetrics::OffsetCorrection {
                initial,
                target_rise_c: target,
                achieved_rise_c: achieved,
                target_reached: heating.reached,
                humidity_offset_pct: humidity_offset,
                written,
                verified,
            },
        }
    }
}
