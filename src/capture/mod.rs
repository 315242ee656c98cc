//! Microphone capture for micpulse.
//!
//! The capture manager opens exactly one audio-only input stream per session
//! through an [`InputBackend`] and hands the caller a [`CaptureSession`] that
//! owns the live stream. Releasing a session closes the stream; releasing it
//! again does nothing.

pub mod backend;
mod stderr;
pub mod tap;

use std::any::Any;

pub use backend::{list_input_devices, CpalBackend, InputDeviceInfo};
pub use tap::SampleTap;

/// Reasons a microphone stream could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// The user or the OS declined microphone access
    #[error("Microphone access denied: {0}")]
    PermissionDenied(String),
    /// No input device, or the device failed while opening
    #[error("Audio input device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// A stream opened by a backend, still owned by nobody.
pub struct OpenStream {
    pub device_name: String,
    pub sample_rate: u32,
    /// Keeps the backend stream alive; dropping it stops capture
    pub guard: Box<dyn Any>,
}

/// Host media-capture facility.
pub trait InputBackend {
    /// Opens one audio-only input stream that writes mono samples into `tap`.
    ///
    /// On error the backend must not leave any stream running.
    fn open(&mut self, tap: SampleTap) -> Result<OpenStream, CaptureError>;
}

/// Handle to an open microphone stream.
pub struct CaptureSession {
    id: u64,
    device_name: String,
    sample_rate: u32,
    tap: SampleTap,
    stream: Option<Box<dyn Any>>,
}

impl CaptureSession {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The sample tap the stream writes into.
    pub fn tap(&self) -> &SampleTap {
        &self.tap
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Drops the stream guard. Returns whether anything was closed.
    fn close(&mut self) -> bool {
        match self.stream.take() {
            Some(stream) => {
                drop(stream);
                self.tap.clear();
                true
            }
            None => false,
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if self.close() {
            tracing::debug!("Capture session {} closed on drop", self.id);
        }
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("id", &self.id)
            .field("device_name", &self.device_name)
            .field("sample_rate", &self.sample_rate)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Acquires and releases microphone sessions through a backend.
pub struct CaptureManager<B> {
    backend: B,
    tap_capacity: usize,
    next_id: u64,
    acquired: u64,
    released: u64,
}

impl<B: InputBackend> CaptureManager<B> {
    /// Creates a manager whose sessions buffer `tap_capacity` recent samples.
    pub fn new(backend: B, tap_capacity: usize) -> Self {
        Self {
            backend,
            tap_capacity,
            next_id: 1,
            acquired: 0,
            released: 0,
        }
    }

    /// Requests one audio-only stream from the backend.
    ///
    /// # Errors
    /// - `PermissionDenied` if microphone access was refused
    /// - `DeviceUnavailable` if no usable input device could be opened
    pub fn acquire(&mut self) -> Result<CaptureSession, CaptureError> {
        let tap = SampleTap::with_capacity(self.tap_capacity);
        let stream = self.backend.open(tap.clone())?;

        let id = self.next_id;
        self.next_id += 1;
        self.acquired += 1;

        tracing::info!(
            "Microphone acquired: session {} on '{}' at {}Hz",
            id,
            stream.device_name,
            stream.sample_rate
        );

        Ok(CaptureSession {
            id,
            device_name: stream.device_name,
            sample_rate: stream.sample_rate,
            tap,
            stream: Some(stream.guard),
        })
    }

    /// Closes the session's stream. Safe to call on an already-released session.
    pub fn release(&mut self, session: &mut CaptureSession) {
        if session.close() {
            self.released += 1;
            tracing::info!(
                "Microphone released: session {} ({} of {} sessions closed)",
                session.id,
                self.released,
                self.acquired
            );
        } else {
            tracing::debug!("Session {} already released", session.id);
        }
    }

    /// Total sessions acquired by this manager.
    #[cfg(test)]
    pub fn acquired_count(&self) -> u64 {
        self.acquired
    }

    /// Total sessions closed through [`CaptureManager::release`].
    #[cfg(test)]
    pub fn released_count(&self) -> u64 {
        self.released
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeBackend;
    use super::*;

    #[test]
    fn test_acquire_opens_one_stream() {
        let backend = FakeBackend::default();
        let mut manager = CaptureManager::new(backend.clone(), 256);

        let session = manager.acquire().unwrap();

        assert!(session.is_open());
        assert_eq!(session.tap().capacity(), 256);
        assert_eq!(backend.opens.get(), 1);
        assert_eq!(backend.live.get(), 1);
    }

    #[test]
    fn test_release_is_idempotent() {
        let backend = FakeBackend::default();
        let mut manager = CaptureManager::new(backend.clone(), 256);
        let mut session = manager.acquire().unwrap();

        manager.release(&mut session);
        manager.release(&mut session);

        assert!(!session.is_open());
        assert_eq!(backend.live.get(), 0);
        assert_eq!(manager.released_count(), 1);
    }

    #[test]
    fn test_failed_acquire_leaves_nothing_open() {
        let backend =
            FakeBackend::failing(CaptureError::PermissionDenied("declined".to_string()));
        let mut manager = CaptureManager::new(backend.clone(), 256);

        let err = manager.acquire().unwrap_err();

        assert!(matches!(err, CaptureError::PermissionDenied(_)));
        assert_eq!(backend.live.get(), 0);
        assert_eq!(manager.acquired_count(), 0);
    }

    #[test]
    fn test_dropping_session_closes_stream() {
        let backend = FakeBackend::default();
        let mut manager = CaptureManager::new(backend.clone(), 256);

        {
            let _session = manager.acquire().unwrap();
            assert_eq!(backend.live.get(), 1);
        }

        assert_eq!(backend.live.get(), 0);
    }
}
