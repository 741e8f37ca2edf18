//! Three-button panel: raw sampling, edge detection and shared debounce.
//!
//! ## Hardware
//!
//! Three active-low momentary switches (A, B, C) with pull-ups.  The
//! [`ButtonPanel`] adapter samples them through `embedded-hal`
//! [`InputPin`]s; the [`EdgeDetector`] turns successive samples into
//! rising edges.
//!
//! ## Debounce
//!
//! | Rule                | Behaviour                                           |
//! |---------------------|-----------------------------------------------------|
//! | Edge                | released → pressed between two samples, per button  |
//! | Window              | one 200 ms window shared by all three buttons       |
//! | Inside the window   | edges are dropped, levels are still recorded        |
//! | Window restart      | only when the menu actually consumes an edge        |

use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::{ButtonLevels, InputSource};

/// Rising edges seen in one poll, by menu role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonEdges {
    /// Button A.
    pub previous: bool,
    /// Button B.
    pub select: bool,
    /// Button C.
    pub next: bool,
}

impl ButtonEdges {
    pub const NONE: Self = Self {
        previous: false,
        select: false,
        next: false,
    };

    /// Confirm on a prompt (button A).
    pub fn confirm(self) -> bool {
        self.previous
    }

    /// Cancel on a prompt (button C).
    pub fn cancel(self) -> bool {
        self.next
    }

    /// Leave an info screen (button C).
    pub fn back(self) -> bool {
        self.next
    }

    pub fn any(self) -> bool {
        self.previous || self.select || self.next
    }
}

/// Edge detector with a single debounce window shared across buttons.
pub struct EdgeDetector {
    window_ms: u32,
    last: ButtonLevels,
    last_accepted_ms: Option<u64>,
}

impl EdgeDetector {
    pub fn new(window_ms: u32) -> Self {
        Self {
            window_ms,
            last: ButtonLevels::RELEASED,
            last_accepted_ms: None,
        }
    }

    /// Feed one raw sample taken at `now_ms` and return its edges.
    ///
    /// Levels are recorded even while the window suppresses edges, so a
    /// button held through the window does not fire once it expires.
    pub fn poll(&mut self, levels: ButtonLevels, now_ms: u64) -> ButtonEdges {
        let edges = ButtonEdges {
            previous: levels.a && !self.last.a,
            select: levels.b && !self.last.b,
            next: levels.c && !self.last.c,
        };
        self.last = levels;

        if self.in_window(now_ms) {
            ButtonEdges::NONE
        } else {
            edges
        }
    }

    /// Restart the shared window: an edge was consumed at `now_ms`.
    pub fn accept(&mut self, now_ms: u64) {
        self.last_accepted_ms = Some(now_ms);
    }

    /// Overwrite the level history without producing edges (used after a
    /// blocking screen consumed presses outside the normal poll path).
    pub fn resync(&mut self, levels: ButtonLevels) {
        self.last = levels;
    }

    fn in_window(&self, now_ms: u64) -> bool {
        self.last_accepted_ms
            .is_some_and(|t| now_ms.saturating_sub(t) < u64::from(self.window_ms))
    }
}

/// Active-low GPIO button panel.
pub struct ButtonPanel<A, B, C> {
    a: A,
    b: B,
    c: C,
}

impl<A, B, C> ButtonPanel<A, B, C>
where
    A: InputPin,
    B: InputPin,
    C: InputPin,
{
    pub fn new(a: A, b: B, c: C) -> Self {
        Self { a, b, c }
    }

    fn pressed(pin: &mut impl InputPin, label: &str) -> bool {
        pin.is_low().unwrap_or_else(|e| {
            warn!("Button {} read failed: {:?}", label, e);
            false
        })
    }
}

impl<A, B, C> InputSource for ButtonPanel<A, B, C>
where
    A: InputPin,
    B: InputPin,
    C: InputPin,
{
    fn read_levels(&mut self) -> ButtonLevels {
        ButtonLevels {
            a: Self::pressed(&mut self.a, "A"),
            b: Self::pressed(&mut self.b, "B"),
            c: Self::pressed(&mut self.c, "C"),
        }
    }
}
