//! Condensation removal.
//!
//! Heats the sensing element at moderate power until the humidity reading
//! drops below the dry threshold or the time limit expires, then lets the
//! element cool before a final measurement.

use log::{info, warn};

use super::{
    status_text, CalibrationEngine, CalibrationOutcome, FailureReason, Operation, OutcomeMetrics,
};
use crate::app::ports::{ClockPort, DisplayPort, SensorPort};

const TITLE: &str = Operation::CondensationRemoval.progress_title();

impl<H> CalibrationEngine<'_, H>
where
    H: SensorPort + DisplayPort + ClockPort,
{
    /// Drive surface moisture off the sensing element.
    ///
    /// The heater is switched off exactly once on every path that switched
    /// it on, whether the element dried out or the time limit expired.
    pub fn remove_condensation(&mut self) -> CalibrationOutcome {
        let cfg = self.config.condensation.clone();

        let initial = match self.sample() {
            Ok(r) => r,
            Err(e) => return CalibrationOutcome::failure(FailureReason::InitialReadFailed(e)),
        };
        info!(
            "Initial T={:.2}\u{00b0}C RH={:.2}%",
            initial.temperature_c, initial.humidity_pct
        );

        if let Err(e) = self.heater_on(cfg.heater_power) {
            return CalibrationOutcome::failure(FailureReason::HeaterRejected(e));
        }

        self.progress(TITLE, status_text("Heating..."), initial, 0.0, 0);

        let almost_done = cfg.almost_done_pct;
        let dry = cfg.dry_threshold_pct;
        let heating = self.heat_until(
            TITLE,
            initial,
            cfg.sample_interval_ms,
            cfg.timeout_ms,
            |r| {
                if r.humidity_pct < almost_done {
                    status_text("Almost done!")
                } else {
                    status_text("Heating...")
                }
            },
            |r, _| r.humidity_pct < dry,
        );

        let heater_off = self.heater_off();

        if heating.reached {
            info!("Condensation removed after {}s", heating.elapsed_secs);
        } else {
            warn!("Timeout reached: humidity did not fall below {:.1}%", dry);
        }

        self.cool_down(TITLE, heating.last, cfg.cooldown_ms);

        let final_reading = match self.sample() {
            Ok(r) => r,
            Err(e) => {
                warn!("Final read failed ({}), keeping last sample", e);
                heating.last
            }
        };
        info!(
            "Final T={:.2}\u{00b0}C RH={:.2}%",
            final_reading.temperature_c, final_reading.humidity_pct
        );

        if let Err(e) = heater_off {
            return CalibrationOutcome::failure(FailureReason::HeaterOffRejected(e));
        }

        if heating.reached {
            CalibrationOutcome::Success {
                final_reading: Some(final_reading),
                metrics: OutcomeMetrics::Condensation {
                    initial,
                    peak_rise_c: heating.peak_rise_c,
                    elapsed_secs: heating.elapsed_secs,
                    samples: heating.samples,
                },
            }
        } else {
            CalibrationOutcome::Timeout {
                last_reading: final_reading,
            }
        }
    }
}
