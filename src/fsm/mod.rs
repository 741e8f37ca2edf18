//! Function-pointer menu state machine.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                     │
//! │  ┌──────────────────────┬───────────┬──────────┬─────────────┐  │
//! │  │ MenuState            │ on_enter  │ on_exit  │ on_input    │  │
//! │  ├──────────────────────┼───────────┼──────────┼─────────────┤  │
//! │  │ Main                 │ fn(ctx)   │ -        │ fn(ctx, e)  │  │
//! │  │ SensorInfo           │ fn(ctx)   │ -        │ fn(ctx, e)  │  │
//! │  │ ConfirmCondensation  │ fn(ctx)   │ -        │ fn(ctx, e)  │  │
//! │  │ ConfirmOffsetCorr.   │ fn(ctx)   │ -        │ fn(ctx, e)  │  │
//! │  │ ConfirmResetOffsets  │ fn(ctx)   │ -        │ fn(ctx, e)  │  │
//! │  │ RunningOperation     │ fn(ctx)   │ fn(ctx)  │ fn(ctx, e)  │  │
//! │  └──────────────────────┴───────────┴──────────┴─────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each input pass the engine calls `on_input` for the **current** state
//! with the debounced edges.  The handler reports whether it consumed an
//! edge and, optionally, the next state; the engine then runs `on_exit`
//! for the current state and `on_enter` for the next.  All functions
//! receive `&mut MenuContext`, which holds the selection, the cached
//! sensor data and the pending operation.

pub mod context;
pub mod states;

use context::MenuContext;
use log::info;

use crate::calibration::Operation;
use crate::drivers::button::ButtonEdges;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all menu screens.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MenuState {
    Main = 0,
    SensorInfo = 1,
    ConfirmCondensation = 2,
    ConfirmOffsetCorrection = 3,
    ConfirmResetOffsets = 4,
    RunningOperation = 5,
}

impl MenuState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 6;

    /// Convert a table index back to `MenuState`.  Panics on out-of-range
    /// in debug builds; returns `Main` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Main,
            1 => Self::SensorInfo,
            2 => Self::ConfirmCondensation,
            3 => Self::ConfirmOffsetCorrection,
            4 => Self::ConfirmResetOffsets,
            5 => Self::RunningOperation,
            _ => {
                debug_assert!(false, "invalid menu state index: {idx}");
                Self::Main
            }
        }
    }

    /// The operation a confirmation screen is asking about.
    pub fn confirms(self) -> Option<Operation> {
        match self {
            Self::ConfirmCondensation => Some(Operation::CondensationRemoval),
            Self::ConfirmOffsetCorrection => Some(Operation::OffsetCorrection),
            Self::ConfirmResetOffsets => Some(Operation::ResetOffsets),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Handler signatures
// ---------------------------------------------------------------------------

/// What an input handler did with the edges it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResponse {
    /// No edge had an effect in this state.
    Ignored,
    /// An edge was consumed without leaving the state (e.g. selection moved).
    Handled,
    /// An edge was consumed and the menu moves to another state.
    Goto(MenuState),
}

impl InputResponse {
    /// Whether an edge was consumed (and the debounce window restarts).
    pub fn consumed(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut MenuContext);

/// Signature for the per-pass input handler.
pub type InputHandlerFn = fn(&mut MenuContext, ButtonEdges) -> InputResponse;

/// Static descriptor for a single menu state.
pub struct StateDescriptor {
    pub id: MenuState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_input: InputHandlerFn,
}

// ---------------------------------------------------------------------------
// Menu engine
// ---------------------------------------------------------------------------

/// The menu state machine engine.
pub struct Menu {
    /// Fixed-size table indexed by `MenuState as usize`.
    table: [StateDescriptor; MenuState::COUNT],
    /// Index of the currently active state.
    current: usize,
    transitions: u64,
}

impl Menu {
    /// Construct the menu with the given table, starting in `initial`.
    pub fn new(table: [StateDescriptor; MenuState::COUNT], initial: MenuState) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter`.  Call once before the first input pass.
    pub fn start(&mut self, ctx: &mut MenuContext) {
        info!("Menu starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Offer one pass of debounced edges to the current state.
    ///
    /// At most one action is taken per pass; the handler's fixed
    /// evaluation order decides which edge wins when several coincide.
    pub fn handle_input(&mut self, ctx: &mut MenuContext, edges: ButtonEdges) -> InputResponse {
        let response = (self.table[self.current].on_input)(ctx, edges);
        if let InputResponse::Goto(next) = response {
            self.transition(next, ctx);
        }
        response
    }

    /// Jump to `next` regardless of input (used when a procedure finishes).
    pub fn force_transition(&mut self, next: MenuState, ctx: &mut MenuContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> MenuState {
        MenuState::from_index(self.current)
    }

    /// Number of transitions taken since construction.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    fn transition(&mut self, next: MenuState, ctx: &mut MenuContext) {
        let next_idx = next as usize;

        info!(
            "Menu transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.transitions += 1;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
