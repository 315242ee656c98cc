//! Terminal screens: the visualizer surface, the microphone fallback and
//! the startup error display.

pub mod error;
pub mod fallback;
pub mod terminal;

pub use error::ErrorScreen;
pub use terminal::{PulseTui, UserCommand};
