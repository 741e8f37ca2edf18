//! Peripheral drivers: the sensor and the button panel.

pub mod button;
pub mod hdc302x;
