//! HDC302x maintenance utility library.
//!
//! Exposes the menu controller, the calibration procedures and the port
//! adapters for integration testing and for the host binary.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod calibration;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
