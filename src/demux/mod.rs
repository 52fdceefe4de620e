//! Container demultiplexing.
//!
//! `SampleSource` is the pipeline's view of a container: enumerate
//! tracks, select one, then pull that track's compressed samples in
//! decode order until the end-of-stream sentinel.

pub mod ffmpeg;

pub use ffmpeg::FfmpegSource;

use crate::error::{PlaybackError, Result};
use crate::pipeline::types::Timestamp;

/// One track of the container, as seen before selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub index: usize,
    /// MIME-like type tag, e.g. `"video/h264"`.
    pub media_type: String,
    pub width: u32,
    pub height: u32,
}

impl TrackInfo {
    pub fn is_video(&self) -> bool {
        self.media_type.starts_with("video/")
    }
}

/// Metadata for one compressed sample copied into a slot buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleInfo {
    /// Number of bytes written into the buffer.
    pub size: usize,
    /// Presentation timestamp of the sample.
    pub pts: Timestamp,
}

/// Result of one read from the active track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRead {
    Sample(SampleInfo),
    /// The active track has no more samples. Terminal for the source.
    EndOfStream,
}

pub trait SampleSource {
    fn tracks(&self) -> &[TrackInfo];

    /// Restrict reads to one track. Samples of other tracks are skipped.
    fn select_track(&mut self, index: usize) -> Result<()>;

    /// Copy the next sample of the selected track into `buf`, replacing
    /// its contents. Read failures are transient from the source's point
    /// of view; the caller decides how many to tolerate.
    fn next_sample(&mut self, buf: &mut Vec<u8>) -> Result<SampleRead>;
}

/// Pick the first video track, mirroring how players bind to a single
/// stream of a local file.
pub fn select_video_track(tracks: &[TrackInfo]) -> Result<usize> {
    tracks
        .iter()
        .find(|t| t.is_video())
        .map(|t| t.index)
        .ok_or(PlaybackError::NoVideoTrack)
}
