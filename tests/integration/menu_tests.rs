//! Integration tests for the MenuController → Menu → procedures pipeline.
//!
//! Button presses are scripted as raw levels on [`MockHardware`]; the
//! controller sees them through the same edge detector and debounce
//! window it uses on hardware.

use hdc_maint::app::ports::{ButtonLevels, StartupScreen};
use hdc_maint::app::service::MenuController;
use hdc_maint::calibration::{CalibrationOutcome, FailureReason, OffsetPair, Operation, UniqueId};
use hdc_maint::config::MaintenanceConfig;
use hdc_maint::error::{Error, SensorError};
use hdc_maint::fsm::MenuState;

use crate::mock_hw::{m, MockHardware, Screen, SensorCall, A, B, C, UP};

fn started() -> (MenuController, MockHardware) {
    let mut ctl = MenuController::new(MaintenanceConfig::default());
    let mut hw = MockHardware::new();
    ctl.start(&mut hw).expect("sensor present");
    (ctl, hw)
}

/// Press and release one button, well outside the debounce window.
fn tap(ctl: &mut MenuController, hw: &mut MockHardware, levels: ButtonLevels) {
    hw.advance(250);
    hw.push_levels(levels);
    ctl.poll(hw);
    hw.advance(10);
    hw.push_levels(UP);
    ctl.poll(hw);
}

/// Let the background read fire so the next passes do not consume
/// scripted readings.
fn settle(ctl: &mut MenuController, hw: &mut MockHardware) {
    hw.advance(1_000);
    ctl.poll(hw);
}

/// Press confirm, release, then press again to acknowledge the result.
fn confirm_and_ack(ctl: &mut MenuController, hw: &mut MockHardware) {
    hw.advance(250);
    hw.push_levels(A);
    hw.push_levels(UP);
    hw.push_levels(A);
    ctl.poll(hw);
}

fn go_to(ctl: &mut MenuController, hw: &mut MockHardware, item: usize) {
    for _ in 0..item {
        tap(ctl, hw, C);
    }
    assert_eq!(ctl.selection(), item);
    tap(ctl, hw, B);
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_shows_splash_then_ready_then_menu() {
    let (ctl, hw) = started();

    assert_eq!(
        hw.screens[0],
        Screen::Startup(StartupScreen::Initializing)
    );
    assert_eq!(
        hw.screens[1],
        Screen::Startup(StartupScreen::Ready {
            unique_id: Some(UniqueId::new(0x0123_4567_89AB))
        })
    );
    assert!(matches!(hw.screens[2], Screen::Menu { selection: 0, footer: Some(_) }));
    assert_eq!(hw.delays, vec![1_500, 2_000]);
    assert_eq!(ctl.state(), MenuState::Main);
    assert_eq!(ctl.offsets(), Some(OffsetPair::ZERO));
}

#[test]
fn startup_without_sensor_halts_on_missing_screen() {
    let mut ctl = MenuController::new(MaintenanceConfig::default());
    let mut hw = MockHardware::new();
    hw.default_read = Err(SensorError::Bus);

    assert_eq!(ctl.start(&mut hw), Err(Error::SensorNotDetected(SensorError::Bus)));
    assert_eq!(
        hw.last_screen(),
        Some(&Screen::Startup(StartupScreen::SensorMissing))
    );
}

#[test]
fn startup_tolerates_missing_id_and_offsets() {
    let mut ctl = MenuController::new(MaintenanceConfig::default());
    let mut hw = MockHardware::new();
    hw.unique_id = Err(SensorError::Crc);
    hw.fail_offset_reads = true;

    ctl.start(&mut hw).expect("probe read succeeds");

    assert_eq!(ctl.unique_id(), None);
    assert_eq!(ctl.offsets(), None);
    assert!(hw
        .screens
        .contains(&Screen::Startup(StartupScreen::Ready { unique_id: None })));
}

// ── Navigation ────────────────────────────────────────────────

#[test]
fn selection_clamps_at_both_ends() {
    let (mut ctl, mut hw) = started();

    tap(&mut ctl, &mut hw, A);
    assert_eq!(ctl.selection(), 0);
    for _ in 0..6 {
        tap(&mut ctl, &mut hw, C);
    }
    assert_eq!(ctl.selection(), 3);
    tap(&mut ctl, &mut hw, A);
    assert_eq!(ctl.selection(), 2);
}

#[test]
fn sensor_info_and_back() {
    let (mut ctl, mut hw) = started();

    go_to(&mut ctl, &mut hw, 0);
    assert_eq!(ctl.state(), MenuState::SensorInfo);
    assert!(matches!(hw.last_screen(), Some(Screen::SensorInfo { .. })));

    tap(&mut ctl, &mut hw, A);
    tap(&mut ctl, &mut hw, B);
    assert_eq!(ctl.state(), MenuState::SensorInfo);

    tap(&mut ctl, &mut hw, C);
    assert_eq!(ctl.state(), MenuState::Main);
    assert_eq!(ctl.selection(), 0);
}

#[test]
fn two_edges_within_window_take_one_action() {
    let (mut ctl, mut hw) = started();

    hw.advance(1_000);
    hw.push_levels(C);
    ctl.poll(&mut hw);
    hw.advance(50);
    hw.push_levels(UP);
    ctl.poll(&mut hw);
    hw.advance(50);
    hw.push_levels(C);
    ctl.poll(&mut hw);

    assert_eq!(ctl.selection(), 1, "second edge 100 ms later is dropped");

    hw.advance(50);
    hw.push_levels(UP);
    ctl.poll(&mut hw);
    hw.advance(100);
    hw.push_levels(C);
    ctl.poll(&mut hw);
    assert_eq!(ctl.selection(), 2, "edge after the window is accepted");
}

#[test]
fn ignored_edge_does_not_open_window() {
    let (mut ctl, mut hw) = started();
    go_to(&mut ctl, &mut hw, 0);

    hw.advance(250);
    hw.push_levels(A);
    ctl.poll(&mut hw);
    hw.advance(20);
    hw.push_levels(UP);
    ctl.poll(&mut hw);
    hw.advance(20);
    hw.push_levels(C);
    ctl.poll(&mut hw);

    assert_eq!(ctl.state(), MenuState::Main);
}

// ── Screens ───────────────────────────────────────────────────

#[test]
fn main_menu_refreshes_every_half_second() {
    let (mut ctl, mut hw) = started();
    hw.clear_records();

    hw.advance(500);
    ctl.poll(&mut hw);
    assert_eq!(hw.screens.len(), 1);

    hw.advance(100);
    ctl.poll(&mut hw);
    assert_eq!(hw.screens.len(), 1);

    hw.advance(400);
    ctl.poll(&mut hw);
    assert_eq!(hw.screens.len(), 2);
}

#[test]
fn confirmation_is_drawn_once_and_cancel_returns() {
    let (mut ctl, mut hw) = started();

    go_to(&mut ctl, &mut hw, 1);
    assert_eq!(ctl.state(), MenuState::ConfirmCondensation);
    assert_eq!(
        hw.last_screen(),
        Some(&Screen::Confirmation(Operation::CondensationRemoval))
    );

    let drawn = hw.screens.len();
    hw.advance(2_000);
    ctl.poll(&mut hw);
    assert_eq!(hw.screens.len(), drawn, "prompt is not overdrawn");

    tap(&mut ctl, &mut hw, C);
    assert_eq!(ctl.state(), MenuState::Main);
    assert_eq!(ctl.selection(), 1);
    assert!(hw.offset_writes().is_empty());
    assert!(hw.heater_calls().is_empty());
}

// ── Procedures through the menu ───────────────────────────────

#[test]
fn reset_runs_to_result_and_returns_to_main() {
    let (mut ctl, mut hw) = started();
    hw.stored_offsets = OffsetPair {
        temperature_offset_c: 0.0,
        humidity_offset_pct: -2.5,
    };

    go_to(&mut ctl, &mut hw, 3);
    assert_eq!(ctl.state(), MenuState::ConfirmResetOffsets);
    confirm_and_ack(&mut ctl, &mut hw);

    assert_eq!(ctl.state(), MenuState::Main);
    assert_eq!(ctl.offsets(), Some(OffsetPair::ZERO));
    assert!(matches!(
        ctl.last_outcome(),
        Some((Operation::ResetOffsets, CalibrationOutcome::Success { .. }))
    ));
    assert!(hw.screens.iter().any(|s| matches!(
        s,
        Screen::Result(Operation::ResetOffsets, CalibrationOutcome::Success { .. })
    )));
    assert!(matches!(hw.last_screen(), Some(Screen::Menu { selection: 3, .. })));
    assert!(hw.delays.contains(&300), "release hold after acknowledge");
}

#[test]
fn reset_with_unverified_read_back_clears_cached_offsets() {
    let (mut ctl, mut hw) = started();
    assert!(ctl.offsets().is_some());
    hw.fail_offset_reads = true;

    go_to(&mut ctl, &mut hw, 3);
    confirm_and_ack(&mut ctl, &mut hw);

    assert!(matches!(
        ctl.last_outcome(),
        Some((Operation::ResetOffsets, CalibrationOutcome::Success { .. }))
    ));
    assert_eq!(ctl.offsets(), None);
}

#[test]
fn acknowledge_press_does_not_leak_into_menu() {
    let (mut ctl, mut hw) = started();
    go_to(&mut ctl, &mut hw, 3);

    // confirm, release, acknowledge, and still held when the hold expires
    hw.advance(250);
    hw.push_levels(A);
    hw.push_levels(UP);
    hw.push_levels(A);
    hw.push_levels(A);
    ctl.poll(&mut hw);
    assert_eq!(ctl.state(), MenuState::Main);

    hw.advance(250);
    hw.push_levels(A);
    ctl.poll(&mut hw);
    assert_eq!(ctl.selection(), 3, "held button must not act as a new press");
}

#[test]
fn held_confirm_button_does_not_dismiss_result() {
    let (mut ctl, mut hw) = started();
    go_to(&mut ctl, &mut hw, 3);

    hw.advance(250);
    hw.push_levels(A);
    // still held after the short reset finishes
    hw.push_levels(A);
    hw.push_levels(A);
    hw.push_levels(UP);
    hw.push_levels(B);
    ctl.poll(&mut hw);

    assert_eq!(ctl.state(), MenuState::Main);
    assert!(hw.levels.is_empty(), "the result screen waits for release and a fresh press");
}

#[test]
fn rejected_offset_write_drops_cached_offsets_when_read_back_fails() {
    let (mut ctl, mut hw) = started();
    assert_eq!(ctl.offsets(), Some(OffsetPair::ZERO));
    go_to(&mut ctl, &mut hw, 2);

    settle(&mut ctl, &mut hw);
    hw.script_reads([m(20.0, 25.0), m(70.0, 2.0)]);
    hw.write_offsets_result = Err(SensorError::CommandRejected);
    hw.fail_offset_reads = true;
    hw.clear_records();
    confirm_and_ack(&mut ctl, &mut hw);

    assert!(matches!(
        ctl.last_outcome(),
        Some((
            Operation::OffsetCorrection,
            CalibrationOutcome::Failure {
                reason: FailureReason::OffsetWriteRejected(SensorError::CommandRejected)
            }
        ))
    ));
    let write = hw
        .calls
        .iter()
        .position(|c| matches!(c, SensorCall::WriteOffsets(_)))
        .expect("write attempted");
    assert!(hw.calls[write..].contains(&SensorCall::ReadOffsets));
    assert_eq!(ctl.offsets(), None);
}

#[test]
fn rejected_reset_rereads_stored_offsets() {
    let (mut ctl, mut hw) = started();
    assert_eq!(ctl.offsets(), Some(OffsetPair::ZERO));
    let stored = OffsetPair {
        temperature_offset_c: 0.0,
        humidity_offset_pct: -2.0,
    };
    hw.stored_offsets = stored;
    hw.write_offsets_result = Err(SensorError::CommandRejected);

    go_to(&mut ctl, &mut hw, 3);
    confirm_and_ack(&mut ctl, &mut hw);

    assert!(matches!(
        ctl.last_outcome(),
        Some((Operation::ResetOffsets, CalibrationOutcome::Failure { .. }))
    ));
    assert_eq!(ctl.offsets(), Some(stored));
}

#[test]
fn offset_correction_refreshes_cached_offsets() {
    let (mut ctl, mut hw) = started();
    go_to(&mut ctl, &mut hw, 2);
    assert_eq!(ctl.state(), MenuState::ConfirmOffsetCorrection);

    settle(&mut ctl, &mut hw);
    hw.script_reads([m(20.0, 25.0), m(70.0, 2.0), m(23.0, 40.0)]);
    confirm_and_ack(&mut ctl, &mut hw);

    assert_eq!(ctl.state(), MenuState::Main);
    assert_eq!(
        ctl.offsets(),
        Some(OffsetPair {
            temperature_offset_c: 0.0,
            humidity_offset_pct: -2.0,
        })
    );
    assert_eq!(ctl.reading().map(|r| r.humidity_pct), Some(40.0));
}

#[test]
fn condensation_timeout_still_returns_to_main() {
    let (mut ctl, mut hw) = started();
    go_to(&mut ctl, &mut hw, 1);

    hw.default_read = Ok(m(30.0, 60.0));
    confirm_and_ack(&mut ctl, &mut hw);

    assert_eq!(ctl.state(), MenuState::Main);
    assert!(matches!(
        ctl.last_outcome(),
        Some((Operation::CondensationRemoval, CalibrationOutcome::Timeout { .. }))
    ));
    assert_eq!(hw.heater_off_count(), 1);
}
