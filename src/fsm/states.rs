//! Concrete state handler functions and table builder.
//!
//! ```text
//!          ┌──[select 0]──▶ SENSOR_INFO ──[back]──┐
//!          │                                      ▼
//!  MAIN ◀──┴──────────────────────────────────── MAIN
//!    │
//!    ├──[select 1..3]──▶ CONFIRM_* ──[cancel]──▶ MAIN
//!    │                      │
//!    │                  [confirm]
//!    │                      ▼
//!    └◀──[outcome acked]── RUNNING_OPERATION
//! ```

use super::context::MenuContext;
use super::{InputResponse, MenuState, StateDescriptor};
use crate::calibration::Operation;
use crate::drivers::button::ButtonEdges;
use log::info;

/// Main menu labels, in selection order.
pub const MAIN_MENU_ITEMS: [&str; 4] = [
    "1.View Sensor Info",
    "2.Condensation Rem.",
    "3.Offset Correction",
    "4.Reset Offsets",
];

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; MenuState::COUNT] {
    [
        // Index 0: Main
        StateDescriptor {
            id: MenuState::Main,
            name: "Main",
            on_enter: Some(main_enter),
            on_exit: None,
            on_input: main_input,
        },
        // Index 1: SensorInfo
        StateDescriptor {
            id: MenuState::SensorInfo,
            name: "SensorInfo",
            on_enter: Some(request_redraw),
            on_exit: None,
            on_input: sensor_info_input,
        },
        // Index 2: ConfirmCondensation
        StateDescriptor {
            id: MenuState::ConfirmCondensation,
            name: "ConfirmCondensation",
            on_enter: Some(confirm_condensation_enter),
            on_exit: None,
            on_input: confirm_input,
        },
        // Index 3: ConfirmOffsetCorrection
        StateDescriptor {
            id: MenuState::ConfirmOffsetCorrection,
            name: "ConfirmOffsetCorrection",
            on_enter: Some(confirm_offset_enter),
            on_exit: None,
            on_input: confirm_input,
        },
        // Index 4: ConfirmResetOffsets
        StateDescriptor {
            id: MenuState::ConfirmResetOffsets,
            name: "ConfirmResetOffsets",
            on_enter: Some(confirm_reset_enter),
            on_exit: None,
            on_input: confirm_input,
        },
        // Index 5: RunningOperation
        StateDescriptor {
            id: MenuState::RunningOperation,
            name: "RunningOperation",
            on_enter: Some(running_enter),
            on_exit: Some(running_exit),
            on_input: running_input,
        },
    ]
}

fn request_redraw(ctx: &mut MenuContext) {
    ctx.redraw = true;
}

// ═══════════════════════════════════════════════════════════════════════════
//  MAIN
// ═══════════════════════════════════════════════════════════════════════════

fn main_enter(ctx: &mut MenuContext) {
    ctx.pending = None;
    ctx.redraw = true;
}

/// previous → next → select; the first edge present wins.
fn main_input(ctx: &mut MenuContext, edges: ButtonEdges) -> InputResponse {
    if edges.previous {
        ctx.selection = ctx.selection.saturating_sub(1);
        ctx.redraw = true;
        return InputResponse::Handled;
    }

    if edges.next {
        if ctx.selection < MAIN_MENU_ITEMS.len() - 1 {
            ctx.selection += 1;
        }
        ctx.redraw = true;
        return InputResponse::Handled;
    }

    if edges.select {
        let next = match ctx.selection {
            0 => MenuState::SensorInfo,
            1 => MenuState::ConfirmCondensation,
            2 => MenuState::ConfirmOffsetCorrection,
            _ => MenuState::ConfirmResetOffsets,
        };
        return InputResponse::Goto(next);
    }

    InputResponse::Ignored
}

// ═══════════════════════════════════════════════════════════════════════════
//  SENSOR INFO
// ═══════════════════════════════════════════════════════════════════════════

fn sensor_info_input(_ctx: &mut MenuContext, edges: ButtonEdges) -> InputResponse {
    if edges.back() {
        return InputResponse::Goto(MenuState::Main);
    }
    InputResponse::Ignored
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONFIRM_* (one handler; the pending operation tells them apart)
// ═══════════════════════════════════════════════════════════════════════════

fn confirm_enter(ctx: &mut MenuContext, op: Operation) {
    ctx.pending = Some(op);
    ctx.redraw = true;
    info!("CONFIRM: awaiting confirmation for {:?}", op);
}

fn confirm_condensation_enter(ctx: &mut MenuContext) {
    confirm_enter(ctx, Operation::CondensationRemoval);
}

fn confirm_offset_enter(ctx: &mut MenuContext) {
    confirm_enter(ctx, Operation::OffsetCorrection);
}

fn confirm_reset_enter(ctx: &mut MenuContext) {
    confirm_enter(ctx, Operation::ResetOffsets);
}

/// confirm → cancel.
fn confirm_input(_ctx: &mut MenuContext, edges: ButtonEdges) -> InputResponse {
    if edges.confirm() {
        return InputResponse::Goto(MenuState::RunningOperation);
    }
    if edges.cancel() {
        info!("CONFIRM: cancelled");
        return InputResponse::Goto(MenuState::Main);
    }
    InputResponse::Ignored
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING OPERATION (the controller drives the procedure)
// ═══════════════════════════════════════════════════════════════════════════

fn running_enter(ctx: &mut MenuContext) {
    if let Some(op) = ctx.pending {
        info!("RUNNING: {:?}", op);
    }
}

fn running_exit(ctx: &mut MenuContext) {
    ctx.pending = None;
}

fn running_input(_ctx: &mut MenuContext, _edges: ButtonEdges) -> InputResponse {
    InputResponse::Ignored
}
