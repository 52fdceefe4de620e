//! Cooperative cancellation for the playback worker.
//!
//! The pipeline never interrupts its thread. A `StopSignal` is a shared
//! atomic flag the worker checks at the top of every loop iteration and
//! between pacing slices, so a stop request is observed within one
//! bounded wait.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag. Cloning yields another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the pipeline to stop. Idempotent.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_starts_clear() {
        let signal = StopSignal::new();
        assert!(!signal.is_requested());
    }

    #[test]
    fn test_request_is_idempotent() {
        let signal = StopSignal::new();
        signal.request_stop();
        signal.request_stop();
        assert!(signal.is_requested());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let signal = StopSignal::new();
        let other = signal.clone();

        other.request_stop();
        assert!(signal.is_requested());
    }

    #[test]
    fn test_visible_across_threads() {
        let signal = StopSignal::new();
        let remote = signal.clone();

        let handle = std::thread::spawn(move || {
            remote.request_stop();
        });
        handle.join().unwrap();

        assert!(signal.is_requested());
    }
}
