//! Cancellable next-frame scheduling.
//!
//! A [`FrameLoop`] hands out one pending [`LoopHandle`] at a time. The host
//! frame clock asks for the due handle once per tick; the frame body then
//! schedules the next one. After [`FrameLoop::cancel`] nothing is ever due
//! again and nothing can be scheduled.

/// Identifier of a pending next-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopHandle(u64);

#[derive(Debug, Default)]
pub struct FrameLoop {
    next_id: u64,
    pending: Option<LoopHandle>,
    cancelled: bool,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules the next frame, replacing any pending one.
    ///
    /// Returns `None` once the loop has been cancelled.
    pub fn schedule(&mut self) -> Option<LoopHandle> {
        if self.cancelled {
            return None;
        }
        self.next_id += 1;
        let handle = LoopHandle(self.next_id);
        self.pending = Some(handle);
        Some(handle)
    }

    /// Takes the pending handle if one is due on this tick.
    pub fn take_due(&mut self) -> Option<LoopHandle> {
        if self.cancelled {
            return None;
        }
        self.pending.take()
    }

    /// Cancels the pending frame and stops the loop for good.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            tracing::trace!("Cancelled pending frame {}", handle.0);
        }
        self.cancelled = true;
    }

    #[cfg(test)]
    pub fn pending(&self) -> Option<LoopHandle> {
        self.pending
    }

    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Frames scheduled over the loop's lifetime.
    #[cfg(test)]
    pub fn scheduled_count(&self) -> u64 {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_then_take_once() {
        let mut frames = FrameLoop::new();
        let handle = frames.schedule().unwrap();

        assert_eq!(frames.take_due(), Some(handle));
        assert_eq!(frames.take_due(), None);
    }

    #[test]
    fn test_handles_are_distinct() {
        let mut frames = FrameLoop::new();
        let first = frames.schedule().unwrap();
        frames.take_due();
        let second = frames.schedule().unwrap();

        assert_ne!(first, second);
        assert_eq!(frames.scheduled_count(), 2);
    }

    #[test]
    fn test_cancel_is_final() {
        let mut frames = FrameLoop::new();
        frames.schedule();
        frames.cancel();

        assert!(frames.is_cancelled());
        assert_eq!(frames.pending(), None);
        assert_eq!(frames.take_due(), None);
        assert_eq!(frames.schedule(), None);

        frames.cancel();
        assert_eq!(frames.take_due(), None);
    }
}
