//! The slot-exchange protocol between the driver and a decoder.
//!
//! Both decoder queues are polled with a short timeout. A busy pool is
//! reported as a poll outcome, never as an error, so the driver can
//! interleave feeding and draining without blocking on either side.

use crate::display::RenderSchedule;
use crate::error::Result;
use crate::pipeline::types::Timestamp;
use std::time::Duration;

/// Handle to one input slot. Held by the driver between acquisition and
/// submission, at most one at a time.
#[derive(Debug, PartialEq, Eq)]
pub struct InputSlot {
    pub(crate) index: usize,
}

/// Handle to one decoded output slot. Owned by the caller until released.
#[derive(Debug, PartialEq, Eq)]
pub struct OutputSlot {
    pub(crate) index: usize,
}

/// Metadata of the frame bound to an output slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputMeta {
    pub pts: Timestamp,
    pub size: usize,
    pub offset: usize,
    pub end_of_stream: bool,
}

/// Outcome of polling the input pool.
#[derive(Debug, PartialEq, Eq)]
pub enum InputPoll {
    Slot(InputSlot),
    /// All slots in flight. Back-pressure, retry later.
    Busy,
}

/// Outcome of polling the output pool.
#[derive(Debug, PartialEq, Eq)]
pub enum OutputPoll {
    Frame(OutputSlot, OutputMeta),
    /// No frame ready yet.
    Busy,
    /// The stream's dimensions changed. No frame is consumed; the next
    /// poll may return one at the new size.
    FormatChanged { width: u32, height: u32 },
    /// The output pool was reallocated; previously returned handles
    /// stay valid. Informational.
    LayoutChanged,
    /// All frames drained after end-of-stream. Terminal.
    EndOfStream,
}

pub trait DecoderSession {
    /// Allocate the slot pools and begin accepting input.
    fn start(&mut self) -> Result<()>;

    /// Poll the input pool, blocking at most `timeout`.
    fn acquire_input_slot(&mut self, timeout: Duration) -> Result<InputPoll>;

    /// The buffer backing an input slot. One accessor for every slot,
    /// with no per-platform variants.
    fn input_buffer(&mut self, slot: &InputSlot) -> &mut Vec<u8>;

    /// Queue `len` bytes of the slot's buffer for decoding. The slot
    /// returns to the pool. `end_of_stream` with `len == 0` is the
    /// one-shot end marker and moves the session to Draining.
    fn submit_input(
        &mut self,
        slot: InputSlot,
        len: usize,
        pts: Timestamp,
        end_of_stream: bool,
    ) -> Result<()>;

    /// Poll the output pool, blocking at most `timeout`.
    fn acquire_output_slot(&mut self, timeout: Duration) -> Result<OutputPoll>;

    /// Give an acquired slot back, exactly once. `render` sends the
    /// frame to the render target on `schedule`; otherwise it is
    /// dropped.
    fn release_output_slot(
        &mut self,
        slot: OutputSlot,
        render: bool,
        schedule: RenderSchedule,
    ) -> Result<()>;

    /// Tear the session down. Idempotent.
    fn stop(&mut self);
}
