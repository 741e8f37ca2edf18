//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                  |
//! |----------------|--------------------|------------------------------|
//! | `config_file`  | ConfigPort         | JSON file on the host        |
//! | `log_display`  | DisplayPort        | Log output                   |
//! | `sim`          | SensorPort         | Thermal/humidity model       |
//! | `station`      | all four ports     | Forwards to owned adapters   |
//! | `stdin_input`  | InputSource        | Keys `a`/`b`/`c` on stdin    |
//! | `time`         | ClockPort          | `std::time::Instant`, sleep  |
//!
//! The on-target adapters live in [`crate::drivers`]: `Hdc302x` for the
//! sensor over `embedded-hal` I2C and `ButtonPanel` for the GPIO buttons.

pub mod config_file;
pub mod log_display;
pub mod sim;
pub mod station;
pub mod stdin_input;
pub mod time;
