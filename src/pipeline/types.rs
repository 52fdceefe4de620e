//! Core timing types for the playback pipeline.

use std::time::{Duration, Instant};

/// Presentation timestamp in microseconds since pipeline start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    micros: i64,
}

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp { micros: 0 };

    /// Create a timestamp from microseconds.
    pub fn from_micros(micros: i64) -> Self {
        Self { micros }
    }

    /// Create a timestamp from an instant relative to a base instant.
    pub fn from_instant(instant: Instant, base: Instant) -> Self {
        let elapsed = instant.saturating_duration_since(base);
        Self {
            micros: elapsed.as_micros() as i64,
        }
    }

    /// Raw microsecond value.
    pub fn micros(&self) -> i64 {
        self.micros
    }

    /// Time remaining until `self`, seen from `other`. Zero if already past.
    pub fn saturating_since(&self, other: Timestamp) -> Duration {
        Duration::from_micros((self.micros - other.micros).max(0) as u64)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}µs", self.micros)
    }
}
