//! framecast: single-stream video playback pipeline.
//!
//! Demultiplexes a local container, decodes its first video track, and
//! presents frames at their timestamps on a dedicated thread:
//!
//! ```ignore
//! use framecast::{FrameSurface, PlayerConfig};
//! use std::sync::Arc;
//!
//! let surface = Arc::new(FrameSurface::new());
//! let worker = framecast::start("movie.mp4", surface.clone(), PlayerConfig::default())?;
//!
//! // Render loop polls the surface for the latest frame.
//! while !worker.is_finished() {
//!     if let Some(frame) = surface.latest() {
//!         // upload frame.data to a texture
//!     }
//! }
//! worker.join()?;
//! ```
//!
//! The decoder is driven through a slot protocol with bounded polling
//! on both queues, so feeding and draining never block each other, and
//! a stop request takes effect within one bounded wait.

pub mod config;
pub mod decode;
pub mod demux;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod player;

pub use config::PlayerConfig;
pub use display::{DecodedFrame, FrameSurface, RenderTarget};
pub use error::{PlaybackError, Result};
pub use pipeline::{PipelineStats, PlaybackWorker, StopSignal, Timestamp};
pub use player::start;
