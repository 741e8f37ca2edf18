//! HDC302x maintenance utility: host entry point.
//!
//! Runs the menu against a simulated sensor.  Screens go to the log;
//! type `a`, `b` or `c` followed by Enter to press a button.
//!
//! ```text
//! hdc-maint [config.json]
//! ```

use anyhow::{Context, Result};
use log::{info, warn};

use hdc_maint::adapters::config_file::JsonConfigFile;
use hdc_maint::adapters::log_display::LogDisplay;
use hdc_maint::adapters::sim::SimulatedSensor;
use hdc_maint::adapters::station::Station;
use hdc_maint::adapters::stdin_input::StdinButtons;
use hdc_maint::adapters::time::StdClock;
use hdc_maint::app::ports::{ClockPort, ConfigError, ConfigPort};
use hdc_maint::app::service::MenuController;
use hdc_maint::config::MaintenanceConfig;

/// Idle loop period between input passes.
const LOOP_PERIOD_MS: u32 = 10;

fn load_config(path: Option<String>) -> Result<MaintenanceConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        return Ok(MaintenanceConfig::default());
    };

    let store = JsonConfigFile::new(&path);
    match store.load() {
        Ok(cfg) => Ok(cfg),
        Err(ConfigError::NotFound) => {
            warn!("{} not found, writing defaults", path);
            let cfg = MaintenanceConfig::default();
            store
                .save(&cfg)
                .with_context(|| format!("writing default config to {}", path))?;
            Ok(cfg)
        }
        Err(e) => Err(e).with_context(|| format!("loading config from {}", path)),
    }
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  HDC302x maintenance v{}          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    info!("Keys: a=prev/confirm  b=select  c=next/back");

    // ── 2. Config ─────────────────────────────────────────────
    let config = load_config(std::env::args().nth(1))?;

    // ── 3. Peripherals ────────────────────────────────────────
    let sensor = SimulatedSensor::new(22.0, 55.0)
        .with_condensation(0.3)
        .with_drift(3.0);
    let input = StdinButtons::spawn().context("spawning stdin reader")?;
    let mut station = Station::new(sensor, LogDisplay::new(), input, StdClock::new());

    // ── 4. Boot ───────────────────────────────────────────────
    let mut controller = MenuController::new(config);
    controller.start(&mut station).context("sensor startup")?;

    // ── 5. Idle loop ──────────────────────────────────────────
    info!("System ready. Entering menu loop.");
    loop {
        controller.poll(&mut station);
        station.delay_ms(LOOP_PERIOD_MS);
    }
}
