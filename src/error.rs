//! Error taxonomy for the playback pipeline.
//!
//! Fatal conditions are typed variants and propagate with `?`. Transient
//! conditions (a busy slot pool, an interrupted pacing wait) are control
//! flow, not errors, and never appear here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlaybackError>;

#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The container could not be opened or probed.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// The container holds no video track.
    #[error("no video track in source")]
    NoVideoTrack,

    /// A track index outside the container's track list was selected.
    #[error("invalid track index {0}")]
    InvalidTrack(usize),

    /// A sample was requested before any track was selected.
    #[error("no track selected")]
    NoTrackSelected,

    /// No decoder exists for the track's format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The decoder rejected a packet for a reason other than back-pressure.
    #[error("decode error: {0}")]
    Decode(String),

    /// A single container read failed. Retried by the driver.
    #[error("sample read failed: {0}")]
    SampleRead(String),

    /// Consecutive container reads kept failing past the configured cap.
    #[error("source stalled after {count} consecutive read failures: {last}")]
    ReadStalled { count: u32, last: String },

    /// A session operation was attempted in a state that does not allow it.
    #[error("invalid session transition: {from} -> {to}")]
    SessionTransition {
        from: &'static str,
        to: &'static str,
    },

    /// A session operation requires an active (running or draining) session.
    #[error("session not active: {0}")]
    SessionInactive(&'static str),

    /// An output slot was released without a bound frame.
    #[error("output slot {0} has no bound frame")]
    SlotUnbound(usize),

    /// The playback thread could not be spawned or joined.
    #[error("worker error: {0}")]
    Worker(String),
}
