//! Keyboard stand-in for the button panel.
//!
//! A helper thread reads stdin lines and forwards each `a`, `b` or `c`
//! character as a press over an `mpsc` channel.  [`StdinButtons`] turns
//! every press into a single pressed sample followed by a released one,
//! so the core's edge detector sees one rising edge per key.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{debug, warn};

use crate::app::ports::{ButtonLevels, InputSource};

fn parse_key(ch: char) -> Option<ButtonLevels> {
    match ch.to_ascii_lowercase() {
        'a' => Some(ButtonLevels {
            a: true,
            ..ButtonLevels::RELEASED
        }),
        'b' => Some(ButtonLevels {
            b: true,
            ..ButtonLevels::RELEASED
        }),
        'c' => Some(ButtonLevels {
            c: true,
            ..ButtonLevels::RELEASED
        }),
        _ => None,
    }
}

/// [`InputSource`] fed from a channel of key presses.
pub struct StdinButtons {
    rx: Receiver<ButtonLevels>,
    /// The previous sample was a press; the next one must be a release.
    pressed_last: bool,
}

impl StdinButtons {
    /// Spawn the stdin reader thread.
    pub fn spawn() -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-buttons".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let line = match line {
                        Ok(l) => l,
                        Err(e) => {
                            warn!("stdin read failed: {}", e);
                            break;
                        }
                    };
                    for levels in line.chars().filter_map(parse_key) {
                        if tx.send(levels).is_err() {
                            return;
                        }
                    }
                }
                debug!("stdin closed");
            })?;
        Ok(Self::from_receiver(rx))
    }

    /// Build from an existing channel (tests, scripted input).
    pub fn from_receiver(rx: Receiver<ButtonLevels>) -> Self {
        Self {
            rx,
            pressed_last: false,
        }
    }
}

impl InputSource for StdinButtons {
    fn read_levels(&mut self) -> ButtonLevels {
        if self.pressed_last {
            self.pressed_last = false;
            return ButtonLevels::RELEASED;
        }
        match self.rx.try_recv() {
            Ok(levels) => {
                self.pressed_last = true;
                levels
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => ButtonLevels::RELEASED,
        }
    }
}
