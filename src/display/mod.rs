//! Presentation types.
//!
//! The pipeline hands decoded frames to a `RenderTarget` owned by the
//! host. The library ships one implementation, `FrameSurface`, a
//! lock-free latest-frame buffer a UI thread can poll.

pub mod surface;

pub use surface::FrameSurface;

use crate::pipeline::types::Timestamp;
use bytes::Bytes;

/// One decoded frame, planes packed contiguously (YUV420). `Bytes`
/// payload, so handing a frame across the surface boundary is a cheap
/// reference-counted clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub pts: Timestamp,
}

/// When a released frame should appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSchedule {
    /// Present as soon as possible.
    Immediate,
    /// Present at the given stream time. The pipeline paces releases so
    /// this is "now" by the time it is issued.
    At(Timestamp),
}

/// Externally-owned drawable the pipeline presents into.
pub trait RenderTarget: Send + Sync {
    fn present(&self, frame: DecodedFrame, schedule: RenderSchedule);
}
