//! Application service: the hexagonal core of the maintenance utility.
//!
//! [`MenuController`] owns the menu state machine, the shared context and
//! the button edge detector.  It exposes a hardware-agnostic API; all I/O
//! flows through port traits passed in at call sites, so the whole loop
//! is testable with mock adapters.
//!
//! ```text
//!  InputSource ──▶ ┌──────────────────────────┐ ──▶ DisplayPort
//!                  │      MenuController       │
//!   SensorPort ◀──▶│  Menu · Debounce · Engine │
//!                  └──────────────────────────┘
//!                         ▲ ClockPort
//! ```

use log::{error, info, warn};

use crate::calibration::{
    CalibrationEngine, CalibrationOutcome, OffsetPair, Operation, OutcomeMetrics, SensorReading,
    UniqueId,
};
use crate::config::MaintenanceConfig;
use crate::drivers::button::EdgeDetector;
use crate::error::{Error, Result};
use crate::fsm::context::MenuContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{InputResponse, Menu, MenuState};

use super::ports::{ClockPort, DisplayPort, InputSource, SensorPort, StartupScreen};

// ───────────────────────────────────────────────────────────────
// MenuController
// ───────────────────────────────────────────────────────────────

/// Drives the three-button menu and dispatches maintenance procedures.
pub struct MenuController {
    menu: Menu,
    ctx: MenuContext,
    edges: EdgeDetector,
    config: MaintenanceConfig,
    last_read_ms: Option<u64>,
    last_refresh_ms: Option<u64>,
    last_outcome: Option<(Operation, CalibrationOutcome)>,
}

impl MenuController {
    /// Construct the controller from configuration.
    ///
    /// Does **not** touch hardware. Call [`start`](Self::start) next.
    pub fn new(config: MaintenanceConfig) -> Self {
        let menu = Menu::new(build_state_table(), MenuState::Main);
        let edges = EdgeDetector::new(config.input.debounce_ms);
        Self {
            menu,
            ctx: MenuContext::new(),
            edges,
            config,
            last_read_ms: None,
            last_refresh_ms: None,
            last_outcome: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot sequence: splash, sensor probe, identity and offsets, ready
    /// screen, then the main menu.
    ///
    /// Returns [`Error::SensorNotDetected`] with the probe's failure (after
    /// showing the "sensor missing" screen) when the probe read fails.
    pub fn start<H>(&mut self, hw: &mut H) -> Result<()>
    where
        H: SensorPort + DisplayPort + ClockPort,
    {
        hw.show_startup(StartupScreen::Initializing);
        hw.delay_ms(self.config.splash_hold_ms);

        match hw.read() {
            Ok(m) => {
                let now = hw.now_ms();
                let reading = SensorReading::new(m, now);
                info!(
                    "Sensor detected at 0x{:02X}: T={:.2}\u{00b0}C RH={:.2}%",
                    self.config.i2c_address, reading.temperature_c, reading.humidity_pct
                );
                self.ctx.reading = Some(reading);
                self.last_read_ms = Some(now);
            }
            Err(e) => {
                error!("No sensor at 0x{:02X}: {}", self.config.i2c_address, e);
                hw.show_startup(StartupScreen::SensorMissing);
                return Err(Error::SensorNotDetected(e));
            }
        }

        self.ctx.unique_id = match hw.read_unique_id() {
            Ok(id) => {
                info!("Sensor ID: {}", id);
                Some(id)
            }
            Err(e) => {
                warn!("Could not read sensor ID: {}", e);
                None
            }
        };
        self.refresh_offsets(hw);

        hw.show_startup(StartupScreen::Ready {
            unique_id: self.ctx.unique_id,
        });
        hw.delay_ms(self.config.ready_hold_ms);

        self.menu.start(&mut self.ctx);
        self.render(hw);
        info!("MenuController started in {:?}", self.menu.current_state());
        Ok(())
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// Run one pass of the idle loop: periodic read, input, screen refresh.
    ///
    /// Confirming an operation runs it to completion inside this call,
    /// including the acknowledge wait on the result screen.
    pub fn poll<H>(&mut self, hw: &mut H)
    where
        H: SensorPort + DisplayPort + InputSource + ClockPort,
    {
        let now = hw.now_ms();

        // 1. Background sensor read
        if elapsed(self.last_read_ms, now, self.config.sensor_read_interval_ms) {
            self.last_read_ms = Some(now);
            match hw.read() {
                Ok(m) => self.ctx.reading = Some(SensorReading::new(m, now)),
                Err(e) => warn!("Background read failed: {}", e),
            }
        }

        // 2. Input: at most one action per pass
        let levels = hw.read_levels();
        let edges = self.edges.poll(levels, now);
        if edges.any() {
            let response = self.menu.handle_input(&mut self.ctx, edges);
            if response.consumed() {
                self.edges.accept(now);
            }
            if response == InputResponse::Goto(MenuState::RunningOperation) {
                self.run_pending(hw);
            }
        }

        // 3. Screen
        self.render(hw);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current menu state.
    pub fn state(&self) -> MenuState {
        self.menu.current_state()
    }

    /// Highlighted main-menu item.
    pub fn selection(&self) -> usize {
        self.ctx.selection
    }

    /// Latest cached reading.
    pub fn reading(&self) -> Option<SensorReading> {
        self.ctx.reading
    }

    /// Offsets as last read back from the sensor; `None` means unknown.
    pub fn offsets(&self) -> Option<OffsetPair> {
        self.ctx.offsets
    }

    pub fn unique_id(&self) -> Option<UniqueId> {
        self.ctx.unique_id
    }

    /// The most recent procedure and its outcome.
    pub fn last_outcome(&self) -> Option<&(Operation, CalibrationOutcome)> {
        self.last_outcome.as_ref()
    }

    pub fn config(&self) -> &MaintenanceConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Run the confirmed operation, show its result, wait for acknowledge
    /// and return to the main menu.
    fn run_pending<H>(&mut self, hw: &mut H)
    where
        H: SensorPort + DisplayPort + InputSource + ClockPort,
    {
        let Some(operation) = self.ctx.pending else {
            warn!("RunningOperation entered without a pending operation");
            self.menu.force_transition(MenuState::Main, &mut self.ctx);
            return;
        };

        let outcome = CalibrationEngine::new(hw, &self.config).run(operation);
        info!("=== {:?} finished: {:?} ===", operation, outcome);

        match &outcome {
            CalibrationOutcome::Success {
                final_reading: Some(r),
                ..
            } => self.ctx.reading = Some(*r),
            CalibrationOutcome::Timeout { last_reading } => self.ctx.reading = Some(*last_reading),
            _ => {}
        }

        // Any offset operation may have touched the EEPROM, so the cached
        // pair is replaced by what the sensor reports now (or unknown).
        match (operation, &outcome) {
            (
                Operation::ResetOffsets,
                CalibrationOutcome::Success {
                    metrics: OutcomeMetrics::OffsetReset { verified },
                    ..
                },
            ) => self.ctx.offsets = *verified,
            (Operation::OffsetCorrection | Operation::ResetOffsets, _) => {
                self.refresh_offsets(hw);
            }
            _ => {}
        }

        hw.show_result(operation, &outcome);
        self.await_acknowledge(hw);

        self.last_outcome = Some((operation, outcome));
        self.menu.force_transition(MenuState::Main, &mut self.ctx);
    }

    /// Block until a fresh press, then hold so its release is not read as
    /// menu input.
    ///
    /// A button still held from the confirm press must be released first;
    /// otherwise a short procedure would dismiss its own result screen.
    fn await_acknowledge<H>(&mut self, hw: &mut H)
    where
        H: InputSource + ClockPort,
    {
        info!("Waiting for acknowledge");
        while hw.read_levels().any() {
            hw.delay_ms(self.config.input.ack_poll_ms);
        }
        while !hw.read_levels().any() {
            hw.delay_ms(self.config.input.ack_poll_ms);
        }
        hw.delay_ms(self.config.input.ack_release_ms);

        let levels = hw.read_levels();
        self.edges.resync(levels);
        self.edges.accept(hw.now_ms());
    }

    fn refresh_offsets(&mut self, hw: &mut impl SensorPort) {
        self.ctx.offsets = match hw.read_offsets() {
            Ok(o) => {
                info!(
                    "Stored offsets: T={:.2}\u{00b0}C RH={:.2}%",
                    o.temperature_offset_c, o.humidity_offset_pct
                );
                Some(o)
            }
            Err(e) => {
                warn!("Could not read stored offsets: {}", e);
                None
            }
        };
    }

    /// Draw the current screen when a handler asked for it or the refresh
    /// interval has passed.  Confirmation prompts are only drawn on request.
    fn render<H>(&mut self, hw: &mut H)
    where
        H: DisplayPort + ClockPort,
    {
        let now = hw.now_ms();
        let forced = self.ctx.take_redraw();
        let due = elapsed(self.last_refresh_ms, now, self.config.display_refresh_ms);

        let state = self.menu.current_state();
        match state {
            MenuState::Main if forced || due => {
                hw.show_menu(self.ctx.selection, self.ctx.reading.as_ref());
            }
            MenuState::SensorInfo if forced || due => {
                hw.show_sensor_info(
                    self.ctx.reading.as_ref(),
                    self.ctx.offsets,
                    self.ctx.unique_id,
                );
            }
            _ if forced => {
                if let Some(op) = state.confirms() {
                    hw.show_confirmation(op);
                }
            }
            _ => {}
        }

        if forced || due {
            self.last_refresh_ms = Some(now);
        }
    }
}

/// `true` when `interval_ms` has passed since `last`, or nothing happened yet.
fn elapsed(last: Option<u64>, now: u64, interval_ms: u32) -> bool {
    last.is_none_or(|t| now.saturating_sub(t) >= u64::from(interval_ms))
}
