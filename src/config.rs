//! Playback configuration.

use std::time::Duration;

/// Tunables for the playback pipeline. `Default` matches the values the
/// pipeline was calibrated with; hosts override individual fields.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// How long slot acquisition may block before reporting Busy.
    pub acquire_timeout: Duration,
    /// Upper bound on a single pacing sleep. Stop requests are observed
    /// at most one slice late.
    pub pacing_slice: Duration,
    /// Number of reusable input slot buffers.
    pub input_slots: usize,
    /// Number of output slot handles.
    pub output_slots: usize,
    /// Initial capacity of each input slot buffer.
    pub input_buffer_capacity: usize,
    /// Consecutive container read failures tolerated before the pipeline
    /// gives up with `ReadStalled`.
    pub max_read_failures: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            acquire_timeout: Duration::from_millis(5),
            pacing_slice: Duration::from_millis(10),
            input_slots: 4,
            output_slots: 4,
            input_buffer_capacity: 256 * 1024,
            max_read_failures: 32,
        }
    }
}
