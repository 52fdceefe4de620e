//! Decoder sessions.

pub mod ffmpeg;
pub mod session;
pub mod state;

pub use ffmpeg::{FfmpegSession, SessionLimits};
pub use session::{DecoderSession, InputPoll, InputSlot, OutputMeta, OutputPoll, OutputSlot};
pub use state::SessionState;
