//! ac-ffmpeg decoder behind the slot protocol.
//!
//! The ffmpeg decoder is a synchronous push/pull codec, so the slot
//! protocol is layered on top of it: a bounded pool of reusable input
//! buffers, a pending packet queue that absorbs the decoder's "again"
//! back-pressure, and a handle-addressed table binding decoded frames
//! to output slots until the driver releases them.

use crate::decode::session::{
    DecoderSession, InputPoll, InputSlot, OutputMeta, OutputPoll, OutputSlot,
};
use crate::decode::state::SessionState;
use crate::display::{DecodedFrame, RenderSchedule, RenderTarget};
use crate::error::{PlaybackError, Result};
use crate::pipeline::types::Timestamp;
use ac_ffmpeg::codec::video::frame::{self, PixelFormat};
use ac_ffmpeg::codec::video::{VideoDecoder, VideoFrame};
use ac_ffmpeg::codec::{CodecParameters, Decoder};
use ac_ffmpeg::packet::{Packet, PacketMut};
use ac_ffmpeg::time::Timestamp as FfTimestamp;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Pool sizes and buffer capacity for a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub input_slots: usize,
    pub output_slots: usize,
    pub input_buffer_capacity: usize,
}

pub struct FfmpegSession {
    state: SessionState,
    decoder: Option<VideoDecoder>,
    target: Arc<dyn RenderTarget>,
    limits: SessionLimits,

    input_buffers: Vec<Vec<u8>>,
    free_inputs: VecDeque<usize>,
    /// Packets accepted from the driver but not yet taken by the decoder.
    pending: VecDeque<Packet>,
    /// Decoded frames waiting for an output slot.
    ready: VecDeque<VideoFrame>,
    /// Frames bound to acquired output slots, addressed by slot index.
    output_frames: Vec<Option<VideoFrame>>,
    free_outputs: VecDeque<usize>,

    /// Dimensions the driver has been told about.
    adopted: Option<(u32, u32)>,
    flushed: bool,
    drained: bool,
}

// The session lives on the playback thread; the ffmpeg handles inside
// are never shared.
unsafe impl Send for FfmpegSession {}

impl FfmpegSession {
    pub fn new(target: Arc<dyn RenderTarget>, limits: SessionLimits) -> Self {
        Self {
            state: SessionState::Unconfigured,
            decoder: None,
            target,
            limits,
            input_buffers: Vec::new(),
            free_inputs: VecDeque::new(),
            pending: VecDeque::new(),
            ready: VecDeque::new(),
            output_frames: Vec::new(),
            free_outputs: VecDeque::new(),
            adopted: None,
            flushed: false,
            drained: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Bind a decoder for the track's format.
    pub fn configure(&mut self, params: &CodecParameters) -> Result<()> {
        if !self.state.can_transition_to(SessionState::Configured) {
            return Err(PlaybackError::SessionTransition {
                from: self.state.name(),
                to: SessionState::Configured.name(),
            });
        }

        let video = params.as_video_codec_parameters().ok_or_else(|| {
            PlaybackError::UnsupportedFormat(
                params.decoder_name().unwrap_or("unknown").to_string(),
            )
        })?;

        let decoder = VideoDecoder::from_codec_parameters(video)
            .map_err(|e| PlaybackError::UnsupportedFormat(e.to_string()))?
            .build()
            .map_err(|e| PlaybackError::UnsupportedFormat(e.to_string()))?;

        log::info!(
            "Session: configured {} decoder, {}x{}",
            params.decoder_name().unwrap_or("unknown"),
            video.width(),
            video.height()
        );

        self.decoder = Some(decoder);
        // The container's dimensions are adopted up front; a frame at a
        // different size later is a format change.
        self.adopted = Some((video.width() as u32, video.height() as u32));
        self.transition(SessionState::Configured)
    }

    fn transition(&mut self, next: SessionState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(PlaybackError::SessionTransition {
                from: self.state.name(),
                to: next.name(),
            });
        }
        log::debug!("Session: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn require_active(&self, op: &'static str) -> Result<()> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(PlaybackError::SessionInactive(op))
        }
    }

    /// Move packets into the decoder and frames out of it, as far as the
    /// codec allows right now.
    fn pump(&mut self) -> Result<()> {
        let Some(decoder) = self.decoder.as_mut() else {
            return Ok(());
        };

        while let Some(packet) = self.pending.front() {
            match decoder.try_push(packet.clone()) {
                Ok(()) => {
                    self.pending.pop_front();
                }
                Err(e) if e.is_again() => break,
                Err(e) => return Err(PlaybackError::Decode(e.to_string())),
            }
        }

        if self.state == SessionState::Draining && self.pending.is_empty() && !self.flushed {
            decoder
                .flush()
                .map_err(|e| PlaybackError::Decode(e.to_string()))?;
            self.flushed = true;
            log::debug!("Session: decoder flushed");
        }

        loop {
            match decoder.take() {
                Ok(Some(frame)) => self.ready.push_back(frame),
                Ok(None) => {
                    if self.flushed {
                        self.drained = true;
                    }
                    break;
                }
                Err(e) => return Err(PlaybackError::Decode(e.to_string())),
            }
        }

        Ok(())
    }

    fn poll_input(&mut self) -> Option<InputPoll> {
        // A saturated pending queue counts as busy even when a buffer is
        // free, so the driver backs off instead of growing the queue.
        if self.pending.len() >= self.limits.input_slots {
            return None;
        }
        let index = self.free_inputs.pop_front()?;
        Some(InputPoll::Slot(InputSlot { index }))
    }

    fn poll_output(&mut self) -> Option<OutputPoll> {
        if let Some(frame) = self.ready.front() {
            let dims = (frame.width() as u32, frame.height() as u32);
            if self.adopted != Some(dims) {
                self.adopted = Some(dims);
                return Some(OutputPoll::FormatChanged {
                    width: dims.0,
                    height: dims.1,
                });
            }

            let index = self.free_outputs.pop_front()?;
            let frame = self.ready.pop_front()?;
            let meta = OutputMeta {
                pts: Timestamp::from_micros(frame.pts().as_micros().unwrap_or_default()),
                size: packed_size(frame.width(), frame.height()),
                offset: 0,
                end_of_stream: false,
            };
            self.output_frames[index] = Some(frame);
            return Some(OutputPoll::Frame(OutputSlot { index }, meta));
        }

        if self.drained {
            return Some(OutputPoll::EndOfStream);
        }

        None
    }
}

impl DecoderSession for FfmpegSession {
    fn start(&mut self) -> Result<()> {
        self.transition(SessionState::Running)?;

        self.input_buffers = (0..self.limits.input_slots)
            .map(|_| Vec::with_capacity(self.limits.input_buffer_capacity))
            .collect();
        self.free_inputs = (0..self.limits.input_slots).collect();
        self.output_frames = (0..self.limits.output_slots).map(|_| None).collect();
        self.free_outputs = (0..self.limits.output_slots).collect();

        log::info!(
            "Session: started with {} input / {} output slots",
            self.limits.input_slots,
            self.limits.output_slots
        );
        Ok(())
    }

    fn acquire_input_slot(&mut self, timeout: Duration) -> Result<InputPoll> {
        self.require_active("acquire_input_slot")?;

        if let Some(poll) = self.poll_input() {
            return Ok(poll);
        }
        self.pump()?;
        if let Some(poll) = self.poll_input() {
            return Ok(poll);
        }

        thread::sleep(timeout);
        self.pump()?;
        Ok(self.poll_input().unwrap_or(InputPoll::Busy))
    }

    fn input_buffer(&mut self, slot: &InputSlot) -> &mut Vec<u8> {
        &mut self.input_buffers[slot.index]
    }

    fn submit_input(
        &mut self,
        slot: InputSlot,
        len: usize,
        pts: Timestamp,
        end_of_stream: bool,
    ) -> Result<()> {
        if self.state != SessionState::Running {
            return Err(PlaybackError::SessionInactive("submit_input"));
        }

        if end_of_stream {
            self.free_inputs.push_back(slot.index);
            self.transition(SessionState::Draining)?;
            return self.pump();
        }

        let packet = PacketMut::from(&self.input_buffers[slot.index][..len])
            .with_pts(FfTimestamp::from_micros(pts.micros()))
            .freeze();
        self.pending.push_back(packet);
        self.free_inputs.push_back(slot.index);
        self.pump()
    }

    fn acquire_output_slot(&mut self, timeout: Duration) -> Result<OutputPoll> {
        self.require_active("acquire_output_slot")?;

        self.pump()?;
        if let Some(poll) = self.poll_output() {
            return Ok(poll);
        }

        thread::sleep(timeout);
        self.pump()?;
        Ok(self.poll_output().unwrap_or(OutputPoll::Busy))
    }

    fn release_output_slot(
        &mut self,
        slot: OutputSlot,
        render: bool,
        schedule: RenderSchedule,
    ) -> Result<()> {
        self.require_active("release_output_slot")?;

        let frame = self.output_frames[slot.index]
            .take()
            .ok_or(PlaybackError::SlotUnbound(slot.index))?;
        self.free_outputs.push_back(slot.index);

        if render {
            let (data, width, height) = pack_frame(&frame)?;
            self.target.present(
                DecodedFrame {
                    data,
                    width,
                    height,
                    pts: Timestamp::from_micros(frame.pts().as_micros().unwrap_or_default()),
                },
                schedule,
            );
        }

        Ok(())
    }

    fn stop(&mut self) {
        if self.state == SessionState::Stopped {
            return;
        }
        log::info!("Session: stopping from {}", self.state);
        self.state = SessionState::Stopped;

        self.decoder = None;
        self.pending.clear();
        self.ready.clear();
        self.output_frames.clear();
        self.free_outputs.clear();
        self.input_buffers.clear();
        self.free_inputs.clear();
    }
}

impl Drop for FfmpegSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn packed_size(width: usize, height: usize) -> usize {
    width * height + (width / 2) * (height / 2) * 2
}

/// Formats the packer handles: three separate 8-bit planes, chroma at
/// quarter resolution. Anything else (fewer planes, wider samples,
/// other subsamplings) must be rejected before the planes are indexed.
fn is_packable(format: PixelFormat) -> bool {
    format == frame::get_pixel_format("yuv420p") || format == frame::get_pixel_format("yuvj420p")
}

/// Pack a decoded frame's YUV420 planes contiguously, stride padding
/// stripped: Y (w*h), then U and V (w/2 * h/2 each).
fn pack_frame(frame: &VideoFrame) -> Result<(Bytes, u32, u32)> {
    if !is_packable(frame.pixel_format()) {
        return Err(PlaybackError::UnsupportedFormat(
            "decoder output is not 8-bit 4:2:0 planar".to_string(),
        ));
    }

    let width = frame.width();
    let height = frame.height();
    let (uw, uh) = (width / 2, height / 2);

    let planes = frame.planes();
    let mut packed = vec![0u8; packed_size(width, height)];

    let y_size = width * height;
    let u_size = uw * uh;
    extract_plane(
        &mut packed[..y_size],
        planes[0].data(),
        planes[0].line_size(),
        width,
        height,
    );
    extract_plane(
        &mut packed[y_size..y_size + u_size],
        planes[1].data(),
        planes[1].line_size(),
        uw,
        uh,
    );
    extract_plane(
        &mut packed[y_size + u_size..],
        planes[2].data(),
        planes[2].line_size(),
        uw,
        uh,
    );

    Ok((Bytes::from(packed), width as u32, height as u32))
}

/// Copy one plane from padded source rows to a contiguous destination.
#[inline]
fn extract_plane(dst: &mut [u8], src: &[u8], stride: usize, width: usize, height: usize) {
    // Fast path: no stride padding
    if stride == width && src.len() >= width * height {
        dst.copy_from_slice(&src[..width * height]);
        return;
    }

    for r in 0..height {
        let src_start = r * stride;
        let dst_start = r * width;
        if src_start + width > src.len() || dst_start + width > dst.len() {
            break;
        }
        dst[dst_start..dst_start + width].copy_from_slice(&src[src_start..src_start + width]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::FrameSurface;

    fn session() -> FfmpegSession {
        FfmpegSession::new(
            Arc::new(FrameSurface::new()),
            SessionLimits {
                input_slots: 2,
                output_slots: 2,
                input_buffer_capacity: 64,
            },
        )
    }

    #[test]
    fn test_new_session_is_unconfigured() {
        assert_eq!(session().state(), SessionState::Unconfigured);
    }

    #[test]
    fn test_start_requires_configuration() {
        let mut s = session();
        assert!(matches!(
            s.start(),
            Err(PlaybackError::SessionTransition { .. })
        ));
    }

    #[test]
    fn test_slots_require_an_active_session() {
        let mut s = session();
        assert!(matches!(
            s.acquire_input_slot(Duration::from_millis(1)),
            Err(PlaybackError::SessionInactive(_))
        ));
        assert!(matches!(
            s.acquire_output_slot(Duration::from_millis(1)),
            Err(PlaybackError::SessionInactive(_))
        ));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut s = session();
        s.stop();
        s.stop();
        assert_eq!(s.state(), SessionState::Stopped);
    }

    #[test]
    fn test_extract_plane_strips_padding() {
        // 2x2 plane with stride 4
        let src = [1, 2, 9, 9, 3, 4, 9, 9];
        let mut dst = [0u8; 4];
        extract_plane(&mut dst, &src, 4, 2, 2);
        assert_eq!(dst, [1, 2, 3, 4]);
    }

    #[test]
    fn test_extract_plane_fast_path() {
        let src = [1, 2, 3, 4];
        let mut dst = [0u8; 4];
        extract_plane(&mut dst, &src, 2, 2, 2);
        assert_eq!(dst, [1, 2, 3, 4]);
    }

    #[test]
    fn test_packed_size_is_yuv420() {
        assert_eq!(packed_size(4, 4), 16 + 4 + 4);
        assert_eq!(packed_size(1920, 1080), 1920 * 1080 * 3 / 2);
    }

    #[test]
    fn test_pack_frame_accepts_yuv420() {
        let f = ac_ffmpeg::codec::video::VideoFrameMut::black(
            frame::get_pixel_format("yuv420p"),
            4,
            4,
        )
        .freeze();

        let (data, width, height) = pack_frame(&f).unwrap();
        assert_eq!((width, height), (4, 4));
        assert_eq!(data.len(), packed_size(4, 4));
    }

    #[test]
    fn test_pack_frame_rejects_other_decoder_outputs() {
        // Single-plane, two-plane, and 10-bit outputs are all valid
        // decoder results for real files; none of them may be packed.
        for name in ["gray", "nv12", "yuv420p10le", "yuv422p"] {
            let f = ac_ffmpeg::codec::video::VideoFrameMut::black(
                frame::get_pixel_format(name),
                4,
                4,
            )
            .freeze();

            assert!(
                matches!(pack_frame(&f), Err(PlaybackError::UnsupportedFormat(_))),
                "{name} must be rejected"
            );
        }
    }
}
