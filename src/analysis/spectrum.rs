//! Byte frequency spectrum using FFT.
//!
//! Produces one unsigned byte per frequency bin, scaled between a decibel
//! floor and ceiling, with exponential smoothing across successive snapshots.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::capture::{CaptureSession, SampleTap};

/// Transform size used for every snapshot.
pub const FFT_SIZE: usize = 256;

/// Number of frequency bins produced per snapshot.
pub const FREQUENCY_BIN_COUNT: usize = FFT_SIZE / 2;

/// Tuning for the byte spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerOptions {
    /// Weight of the previous snapshot in [0, 1); 0 disables smoothing
    pub smoothing: f32,
    /// Level mapped to byte 0
    pub min_decibels: f32,
    /// Level mapped to byte 255
    pub max_decibels: f32,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            smoothing: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

/// Frequency-analysis node fed by a capture session's sample tap.
///
/// All buffers are allocated once in [`SpectrumAnalyzer::from_tap`]; sampling
/// overwrites them in place.
pub struct SpectrumAnalyzer {
    source: Option<SampleTap>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    time_domain: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
    options: AnalyzerOptions,
}

impl SpectrumAnalyzer {
    /// Connects an analyzer to the session's audio source.
    pub fn create(session: &CaptureSession, options: AnalyzerOptions) -> Self {
        tracing::debug!(
            "Analyzer connected to session {} (fft size {}, {} bins)",
            session.id(),
            FFT_SIZE,
            FREQUENCY_BIN_COUNT
        );
        Self::from_tap(session.tap().clone(), options)
    }

    /// Creates an analyzer reading directly from a sample tap.
    pub fn from_tap(tap: SampleTap, options: AnalyzerOptions) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(FFT_SIZE);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        let options = AnalyzerOptions {
            smoothing: options.smoothing.clamp(0.0, 0.999),
            ..options
        };

        Self {
            source: Some(tap),
            fft,
            window: blackman_window(FFT_SIZE),
            time_domain: vec![0.0; FFT_SIZE],
            spectrum: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            scratch,
            smoothed: vec![0.0; FREQUENCY_BIN_COUNT],
            bytes: vec![0; FREQUENCY_BIN_COUNT],
            options,
        }
    }

    pub fn fft_size(&self) -> usize {
        FFT_SIZE
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.bytes.len()
    }

    /// Overwrites the byte buffer with the current spectrum.
    pub fn sample(&mut self) {
        let Some(tap) = &self.source else {
            self.bytes.fill(0);
            return;
        };
        tap.copy_latest(&mut self.time_domain);

        for ((slot, &sample), &weight) in self
            .spectrum
            .iter_mut()
            .zip(self.time_domain.iter())
            .zip(self.window.iter())
        {
            *slot = Complex::new(sample * weight, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        let scale = 1.0 / FFT_SIZE as f32;
        let tau = self.options.smoothing;
        for ((smoothed, byte), bin) in self
            .smoothed
            .iter_mut()
            .zip(self.bytes.iter_mut())
            .zip(self.spectrum.iter())
        {
            let magnitude = bin.norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
            *byte = decibels_to_byte(
                magnitude_to_decibels(*smoothed),
                self.options.min_decibels,
                self.options.max_decibels,
            );
        }
    }

    /// The most recent byte spectrum, one value per bin.
    pub fn buffer(&self) -> &[u8] {
        &self.bytes
    }

    /// Detaches the analyzer from its source. Later samples are silent.
    pub fn disconnect(&mut self) {
        if self.source.take().is_some() {
            tracing::debug!("Analyzer disconnected");
        }
        self.smoothed.fill(0.0);
        self.bytes.fill(0);
    }

    pub fn is_connected(&self) -> bool {
        self.source.is_some()
    }
}

/// Blackman window with α = 0.16 over `size` points.
fn blackman_window(size: usize) -> Vec<f32> {
    let a0 = 0.42;
    let a1 = 0.5;
    let a2 = 0.08;
    (0..size)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos()
        })
        .collect()
}

fn magnitude_to_decibels(magnitude: f32) -> f32 {
    if magnitude > 0.0 {
        20.0 * magnitude.log10()
    } else {
        f32::NEG_INFINITY
    }
}

fn decibels_to_byte(db: f32, min_db: f32, max_db: f32) -> u8 {
    let range = (max_db - min_db).max(f32::EPSILON);
    let scaled = 255.0 * (db - min_db) / range;
    scaled.clamp(0.0, 255.0) as u8
}
