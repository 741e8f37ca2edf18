//! Offset reset: program a zero correction and read it back.

use log::{info, warn};

use super::{CalibrationEngine, CalibrationOutcome, FailureReason, OffsetPair, OutcomeMetrics};
use crate::app::ports::{ClockPort, DisplayPort, SensorPort};

impl<H> CalibrationEngine<'_, H>
where
    H: SensorPort + DisplayPort + ClockPort,
{
    /// Write `{0, 0}` to the sensor's offset register.
    ///
    /// A failed read-back still reports success for the write, with
    /// `verified: None` so the caller can show it as unconfirmed.
    pub fn reset_offsets(&mut self) -> CalibrationOutcome {
        info!("Writing zero offsets to sensor EEPROM");
        if let Err(e) = self.hw.write_offsets(OffsetPair::ZERO) {
            return CalibrationOutcome::failure(FailureReason::OffsetWriteRejected(e));
        }

        self.hw.delay_ms(self.config.reset_verify_delay_ms);

        let verified = match self.hw.read_offsets() {
            Ok(v) => {
                info!(
                    "Offsets reset; verified T={:.2}\u{00b0}C RH={:.2}%",
                    v.temperature_offset_c, v.humidity_offset_pct
                );
                Some(v)
            }
            Err(e) => {
                warn!("Offsets written but read-back failed: {}", e);
                None
            }
        };

        CalibrationOutcome::Success {
            final_reading: None,
            metrics: OutcomeMetrics::OffsetReset { verified },
        }
    }
}
