//! Audio analysis: per-frame byte spectrum and its scalar loudness.

pub mod amplitude;
pub mod spectrum;

pub use amplitude::reduce;
pub use spectrum::{AnalyzerOptions, SpectrumAnalyzer, FFT_SIZE};
