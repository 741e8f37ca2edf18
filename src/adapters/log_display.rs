//! Log-based display adapter.
//!
//! Implements [`DisplayPort`] by writing each screen as one structured
//! log line.  Used by the host binary; an OLED adapter would implement
//! the same trait on target.

use log::info;

use crate::app::ports::{DisplayPort, StartupScreen};
use crate::calibration::{
    CalibrationOutcome, OffsetPair, Operation, OutcomeMetrics, ProgressFrame, SensorReading,
    UniqueId,
};
use crate::fsm::states::MAIN_MENU_ITEMS;

/// Adapter that logs every screen to the console.
#[derive(Debug, Default)]
pub struct LogDisplay {
    frames: u64,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of screens drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

fn one_line(name: &str) -> impl core::fmt::Display + '_ {
    struct Flat<'a>(&'a str);
    impl core::fmt::Display for Flat<'_> {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            for (i, part) in self.0.split('\n').enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                f.write_str(part)?;
            }
            Ok(())
        }
    }
    Flat(name)
}

impl DisplayPort for LogDisplay {
    fn show_startup(&mut self, screen: StartupScreen) {
        self.frames += 1;
        match screen {
            StartupScreen::Initializing => info!("SCREEN | HDC302x MAINTENANCE | Initializing..."),
            StartupScreen::Ready { unique_id } => match unique_id {
                Some(id) => info!("SCREEN | Sensor found | ID {} | Ready!", id),
                None => info!("SCREEN | Sensor found | ID unavailable | Ready!"),
            },
            StartupScreen::SensorMissing => {
                info!("SCREEN | ERROR: HDC302x not found | Check wiring")
            }
        }
    }

    fn show_menu(&mut self, selection: usize, footer: Option<&SensorReading>) {
        self.frames += 1;
        let item = MAIN_MENU_ITEMS.get(selection).copied().unwrap_or("?");
        match footer {
            Some(r) => info!(
                "MENU | > {} ({}/{}) | {:.1}\u{00b0}C {:.1}%",
                item,
                selection + 1,
                MAIN_MENU_ITEMS.len(),
                r.temperature_c,
                r.humidity_pct
            ),
            None => info!(
                "MENU | > {} ({}/{}) | --",
                item,
                selection + 1,
                MAIN_MENU_ITEMS.len()
            ),
        }
    }

    fn show_sensor_info(
        &mut self,
        reading: Option<&SensorReading>,
        offsets: Option<OffsetPair>,
        unique_id: Option<UniqueId>,
    ) {
        self.frames += 1;
        match reading {
            Some(r) => info!(
                "INFO | T={:.2}\u{00b0}C RH={:.2}%",
                r.temperature_c, r.humidity_pct
            ),
            None => info!("INFO | no reading yet"),
        }
        match offsets {
            Some(o) => info!(
                "INFO | offsets T={:.2}\u{00b0}C RH={:.2}%",
                o.temperature_offset_c, o.humidity_offset_pct
            ),
            None => info!("INFO | offsets unknown"),
        }
        if let Some(id) = unique_id {
            info!("INFO | ID {}", id);
        }
        info!("INFO | [C] back");
    }

    fn show_confirmation(&mut self, operation: Operation) {
        self.frames += 1;
        info!(
            "CONFIRM | {} | [A] yes  [C] no",
            one_line(operation.name())
        );
    }

    fn show_progress(&mut self, frame: &ProgressFrame) {
        self.frames += 1;
        info!(
            "PROGRESS | {} | {} | T={:.1}\u{00b0}C (+{:.1}) RH={:.1}% | {}s",
            frame.title,
            frame.status,
            frame.reading.temperature_c,
            frame.rise_c,
            frame.reading.humidity_pct,
            frame.elapsed_secs
        );
    }

    fn show_result(&mut self, operation: Operation, outcome: &CalibrationOutcome) {
        self.frames += 1;
        let name = one_line(operation.name());
        match outcome {
            CalibrationOutcome::Success {
                final_reading,
                metrics,
            } => {
                info!("RESULT | {} | SUCCESS", name);
                if let Some(r) = final_reading {
                    info!(
                        "RESULT | final T={:.2}\u{00b0}C RH={:.2}%",
                        r.temperature_c, r.humidity_pct
                    );
                }
                match metrics {
                    OutcomeMetrics::Condensation {
                        elapsed_secs,
                        samples,
                        ..
                    } => info!("RESULT | dry after {}s ({} samples)", elapsed_secs, samples),
                    OutcomeMetrics::OffsetCorrection {
                        written,
                        verified,
                        target_reached,
                        ..
                    } => {
                        info!(
                            "RESULT | RH offset {:.2}%{}",
                            written.humidity_offset_pct,
                            if *target_reached { "" } else { " (time limit)" }
                        );
                        if verified.is_none() {
                            info!("RESULT | offsets saved, not verified");
                        }
                    }
                    OutcomeMetrics::OffsetReset { verified } => match verified {
                        Some(v) => info!(
                            "RESULT | offsets now T={:.2}\u{00b0}C RH={:.2}%",
                            v.temperature_offset_c, v.humidity_offset_pct
                        ),
                        None => info!("RESULT | write OK, unverified"),
                    },
                }
            }
            CalibrationOutcome::Timeout { last_reading } => info!(
                "RESULT | {} | TIMEOUT | RH still {:.1}%",
                name, last_reading.humidity_pct
            ),
            CalibrationOutcome::Failure { reason } => {
                info!("RESULT | {} | FAILED | {}", name, reason)
            }
        }
        info!("RESULT | press any button");
    }
}
