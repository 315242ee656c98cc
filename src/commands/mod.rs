//! Application command handlers for micpulse.
//!
//! # Commands
//! - `run`: The microphone visualizer (default)
//! - `config`: Open the configuration file in the user's preferred editor
//! - `list_devices`: List available audio input devices

pub mod config;
pub mod list_devices;
pub mod run;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use run::{handle_run, RunOverrides};
