//! Shared ring of recent mono samples.
//!
//! The audio callback thread writes into the tap and the analyzer reads the
//! newest window from it once per frame.

use cpal::{FromSample, Sample, SizedSample};
use std::sync::{Arc, Mutex, MutexGuard};

/// Fixed-capacity ring of the most recent mono `f32` samples.
///
/// Cloning a tap shares the same ring.
#[derive(Debug, Clone)]
pub struct SampleTap {
    ring: Arc<Mutex<SampleRing>>,
}

#[derive(Debug)]
struct SampleRing {
    samples: Vec<f32>,
    /// Index the next sample is written to
    write: usize,
    /// Number of valid samples, saturates at capacity
    filled: usize,
}

impl SampleTap {
    /// Creates an empty tap holding at most `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: Arc::new(Mutex::new(SampleRing {
                samples: vec![0.0; capacity.max(1)],
                write: 0,
                filled: 0,
            })),
        }
    }

    pub fn capacity(&self) -> usize {
        self.lock().samples.len()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.lock().filled
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends mono samples, overwriting the oldest once full.
    pub fn extend<I>(&self, samples: I)
    where
        I: IntoIterator<Item = f32>,
    {
        let mut ring = self.lock();
        let capacity = ring.samples.len();
        for sample in samples {
            let write = ring.write;
            ring.samples[write] = sample;
            ring.write = (write + 1) % capacity;
            ring.filled = (ring.filled + 1).min(capacity);
        }
    }

    /// Appends interleaved frames of any device sample format, averaging all
    /// channels down to mono `f32`.
    pub fn push_interleaved<T>(&self, data: &[T], channels: usize)
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let channels = channels.max(1);
        self.extend(data.chunks_exact(channels).map(|frame| {
            frame.iter().map(|&s| f32::from_sample(s)).sum::<f32>() / channels as f32
        }));
    }

    /// Copies the newest samples into `out` in chronological order.
    ///
    /// When fewer samples than `out.len()` have arrived, the front of `out`
    /// is zero-filled so the newest sample is always last.
    pub fn copy_latest(&self, out: &mut [f32]) {
        let ring = self.lock();
        let capacity = ring.samples.len();
        let available = ring.filled.min(out.len());
        let padding = out.len() - available;

        out[..padding].fill(0.0);

        let start = (ring.write + capacity - available) % capacity;
        for (offset, slot) in out[padding..].iter_mut().enumerate() {
            *slot = ring.samples[(start + offset) % capacity];
        }
    }

    /// Drops all held samples.
    pub fn clear(&self) {
        let mut ring = self.lock();
        ring.samples.fill(0.0);
        ring.write = 0;
        ring.filled = 0;
    }

    fn lock(&self) -> MutexGuard<'_, SampleRing> {
        // A panicking audio callback leaves plain sample data behind, which is still usable.
        match self.ring.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
