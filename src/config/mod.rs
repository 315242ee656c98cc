//! Configuration management for micpulse.
//!
//! Loads the TOML configuration file and turns it into the options the
//! capture, analysis and rendering layers consume.

pub mod file;

pub use file::{get_config_path, MicpulseConfig};
