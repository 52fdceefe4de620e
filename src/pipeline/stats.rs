//! Pipeline counters.
//!
//! Lock-free counters shared between the playback thread and the host.
//! A summary is logged once at teardown.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PipelineStats {
    samples_fed: AtomicU64,
    bytes_fed: AtomicU64,
    frames_rendered: AtomicU64,
    frames_dropped: AtomicU64,
    read_failures: AtomicU64,
    format_changes: AtomicU64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sample(&self, bytes: usize) {
        self.samples_fed.fetch_add(1, Ordering::Relaxed);
        self.bytes_fed.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_rendered(&self) {
        self.frames_rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read_failure(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_format_change(&self) {
        self.format_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn samples_fed(&self) -> u64 {
        self.samples_fed.load(Ordering::Relaxed)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered.load(Ordering::Relaxed)
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            samples_fed: self.samples_fed.load(Ordering::Relaxed),
            bytes_fed: self.bytes_fed.load(Ordering::Relaxed),
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            format_changes: self.format_changes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSummary {
    pub samples_fed: u64,
    pub bytes_fed: u64,
    pub frames_rendered: u64,
    pub frames_dropped: u64,
    pub read_failures: u64,
    pub format_changes: u64,
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "samples={} ({} bytes), rendered={}, dropped={}, read_failures={}, format_changes={}",
            self.samples_fed,
            self.bytes_fed,
            self.frames_rendered,
            self.frames_dropped,
            self.read_failures,
            self.format_changes
        )
    }
}
