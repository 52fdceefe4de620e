//! ac-ffmpeg container adapter.

use crate::demux::{SampleInfo, SampleRead, SampleSource, TrackInfo};
use crate::error::{PlaybackError, Result};
use crate::pipeline::types::Timestamp;
use ac_ffmpeg::codec::CodecParameters;
use ac_ffmpeg::format::demuxer::{Demuxer, DemuxerWithStreamInfo};
use ac_ffmpeg::format::io::IO;
use std::fs::File;
use std::path::Path;

/// Demuxer over a local file. Tracks are enumerated at open time; one
/// track is selected and its packets are copied out in decode order.
pub struct FfmpegSource {
    demuxer: DemuxerWithStreamInfo<File>,
    tracks: Vec<TrackInfo>,
    parameters: Vec<CodecParameters>,
    active: Option<usize>,
}

// The demuxer is moved onto the playback thread and never shared.
unsafe impl Send for FfmpegSource {}

impl FfmpegSource {
    /// Open and probe a container. Any failure here means the source is
    /// unusable, so everything maps to `SourceUnavailable`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path)
            .map_err(|e| PlaybackError::SourceUnavailable(format!("{}: {e}", path.display())))?;
        let io = IO::from_seekable_read_stream(file);

        let demuxer = Demuxer::builder()
            .build(io)
            .map_err(|e| PlaybackError::SourceUnavailable(format!("{}: {e}", path.display())))?
            .find_stream_info(None)
            .map_err(|(_, e)| {
                PlaybackError::SourceUnavailable(format!("{}: {e}", path.display()))
            })?;

        let mut tracks = Vec::new();
        let mut parameters = Vec::new();
        for (index, stream) in demuxer.streams().iter().enumerate() {
            let params = stream.codec_parameters();
            tracks.push(TrackInfo {
                index,
                media_type: media_type_of(&params),
                width: params
                    .as_video_codec_parameters()
                    .map(|v| v.width() as u32)
                    .unwrap_or(0),
                height: params
                    .as_video_codec_parameters()
                    .map(|v| v.height() as u32)
                    .unwrap_or(0),
            });
            parameters.push(params);
        }

        log::info!(
            "Source: opened {} with {} track(s)",
            path.display(),
            tracks.len()
        );

        Ok(Self {
            demuxer,
            tracks,
            parameters,
            active: None,
        })
    }

    /// Decoder configuration for one track. Stays out of `TrackInfo` so
    /// the shared types never carry backend handles.
    pub fn codec_parameters(&self, index: usize) -> Result<CodecParameters> {
        self.parameters
            .get(index)
            .cloned()
            .ok_or(PlaybackError::InvalidTrack(index))
    }
}

impl SampleSource for FfmpegSource {
    fn tracks(&self) -> &[TrackInfo] {
        &self.tracks
    }

    fn select_track(&mut self, index: usize) -> Result<()> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::InvalidTrack(index));
        }
        log::info!(
            "Source: selected track {index} ({})",
            self.tracks[index].media_type
        );
        self.active = Some(index);
        Ok(())
    }

    fn next_sample(&mut self, buf: &mut Vec<u8>) -> Result<SampleRead> {
        let active = self.active.ok_or(PlaybackError::NoTrackSelected)?;

        loop {
            let packet = self
                .demuxer
                .take()
                .map_err(|e| PlaybackError::SampleRead(e.to_string()))?;

            match packet {
                Some(packet) if packet.stream_index() == active => {
                    buf.clear();
                    buf.extend_from_slice(packet.data());

                    let pts = packet.pts().as_micros().unwrap_or_default();
                    return Ok(SampleRead::Sample(SampleInfo {
                        size: buf.len(),
                        pts: Timestamp::from_micros(pts),
                    }));
                }
                // Another track's packet, not ours to deliver.
                Some(_) => continue,
                None => return Ok(SampleRead::EndOfStream),
            }
        }
    }
}

fn media_type_of(params: &CodecParameters) -> String {
    let codec = params.decoder_name().unwrap_or("unknown");
    if params.is_video_codec() {
        format!("video/{codec}")
    } else if params.is_audio_codec() {
        format!("audio/{codec}")
    } else {
        format!("application/{codec}")
    }
}
