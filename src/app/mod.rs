//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the menu controller that ties the button panel,
//! the menu state machine and the calibration procedures together.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod ports;
pub mod service;
