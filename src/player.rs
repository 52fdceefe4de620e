//! Host-facing entry point.

use crate::config::PlayerConfig;
use crate::decode::{FfmpegSession, SessionLimits};
use crate::demux::{self, FfmpegSource, SampleSource};
use crate::display::RenderTarget;
use crate::error::Result;
use crate::pipeline::driver::PipelineDriver;
use crate::pipeline::worker::PlaybackWorker;
use std::path::Path;
use std::sync::Arc;

/// Play the first video track of a local file into `target`.
///
/// Opens and probes the container, binds a decoder, and hands the
/// pipeline to its own thread. Anything that makes playback impossible
/// (`SourceUnavailable`, `NoVideoTrack`, `UnsupportedFormat`) fails
/// here, before the loop starts; the returned worker controls the rest.
pub fn start<P: AsRef<Path>>(
    path: P,
    target: Arc<dyn RenderTarget>,
    config: PlayerConfig,
) -> Result<PlaybackWorker> {
    let mut source = FfmpegSource::open(path)?;

    let track = demux::select_video_track(source.tracks())?;
    source.select_track(track)?;
    let params = source.codec_parameters(track)?;

    let mut session = FfmpegSession::new(
        target,
        SessionLimits {
            input_slots: config.input_slots,
            output_slots: config.output_slots,
            input_buffer_capacity: config.input_buffer_capacity,
        },
    );
    session.configure(&params)?;

    let driver = PipelineDriver::new(source, session, config);
    PlaybackWorker::spawn(driver)
}
