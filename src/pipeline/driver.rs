//! The feed/drain/pace loop.
//!
//! One loop iteration feeds at most one sample into the decoder and
//! drains at most one decoded frame out of it. Both stages poll with a
//! short timeout, so neither a full input pool nor an empty output pool
//! can stall the other side, and a stop request is observed within one
//! bounded wait.

use crate::config::PlayerConfig;
use crate::decode::{DecoderSession, InputPoll, InputSlot, OutputPoll};
use crate::demux::{SampleRead, SampleSource};
use crate::display::RenderSchedule;
use crate::error::{PlaybackError, Result};
use crate::pipeline::cancel::StopSignal;
use crate::pipeline::clock::PlaybackClock;
use crate::pipeline::stats::PipelineStats;
use crate::pipeline::types::Timestamp;
use std::sync::Arc;

enum DrainOutcome {
    Continue,
    /// End-of-stream drained through the decoder.
    Finished,
    /// Stop requested while pacing; the frame was dropped.
    Cancelled,
}

pub struct PipelineDriver<S: SampleSource, D: DecoderSession> {
    source: S,
    session: D,
    config: PlayerConfig,
    stop: StopSignal,
    stats: Arc<PipelineStats>,
    clock: PlaybackClock,
    /// Flips true exactly once, when the source's end-of-stream sentinel
    /// has been forwarded to the decoder. Never resets.
    input_exhausted: bool,
    /// Slot kept across a failed read, so the retry reuses it instead of
    /// acquiring a second one.
    held_input: Option<InputSlot>,
    consecutive_read_failures: u32,
}

impl<S: SampleSource, D: DecoderSession> PipelineDriver<S, D> {
    pub fn new(source: S, session: D, config: PlayerConfig) -> Self {
        Self {
            source,
            session,
            config,
            stop: StopSignal::new(),
            stats: Arc::new(PipelineStats::new()),
            clock: PlaybackClock::new(),
            input_exhausted: false,
            held_input: None,
            consecutive_read_failures: 0,
        }
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// Run playback to completion, cancellation, or a fatal error. The
    /// session is torn down on every exit path.
    pub fn run(mut self) -> Result<()> {
        let result = self.run_loop();
        self.session.stop();
        log::info!("Pipeline: done, {}", self.stats.summary());
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        self.session.start()?;
        self.clock.start();

        while !self.stop.is_requested() {
            if !self.input_exhausted {
                self.feed()?;
            }
            match self.drain()? {
                DrainOutcome::Continue => {}
                DrainOutcome::Finished => {
                    log::info!("Pipeline: end of stream reached");
                    return Ok(());
                }
                DrainOutcome::Cancelled => return Ok(()),
            }
        }

        log::info!("Pipeline: stop requested");
        Ok(())
    }

    /// Feed one sample, or the end-of-stream marker, into the decoder.
    /// A busy input pool skips the stage for this iteration.
    fn feed(&mut self) -> Result<()> {
        let slot = match self.held_input.take() {
            Some(slot) => slot,
            None => match self.session.acquire_input_slot(self.config.acquire_timeout)? {
                InputPoll::Slot(slot) => slot,
                InputPoll::Busy => return Ok(()),
            },
        };

        let read = self.source.next_sample(self.session.input_buffer(&slot));
        match read {
            Ok(SampleRead::Sample(info)) => {
                self.consecutive_read_failures = 0;
                self.session.submit_input(slot, info.size, info.pts, false)?;
                self.stats.record_sample(info.size);
            }
            Ok(SampleRead::EndOfStream) => {
                log::info!("Pipeline: input exhausted, submitting end of stream");
                self.session.submit_input(slot, 0, Timestamp::ZERO, true)?;
                self.input_exhausted = true;
            }
            Err(e) => {
                self.consecutive_read_failures += 1;
                self.stats.record_read_failure();
                log::warn!(
                    "Pipeline: sample read failed ({}/{}): {e}",
                    self.consecutive_read_failures,
                    self.config.max_read_failures
                );
                if self.consecutive_read_failures >= self.config.max_read_failures {
                    return Err(PlaybackError::ReadStalled {
                        count: self.consecutive_read_failures,
                        last: e.to_string(),
                    });
                }
                self.held_input = Some(slot);
            }
        }
        Ok(())
    }

    /// Drain one decoded frame and present it at its timestamp.
    fn drain(&mut self) -> Result<DrainOutcome> {
        match self.session.acquire_output_slot(self.config.acquire_timeout)? {
            OutputPoll::Busy => Ok(DrainOutcome::Continue),
            OutputPoll::FormatChanged { width, height } => {
                log::info!("Pipeline: output format changed to {width}x{height}");
                self.stats.record_format_change();
                Ok(DrainOutcome::Continue)
            }
            OutputPoll::LayoutChanged => {
                log::debug!("Pipeline: output slot layout changed");
                Ok(DrainOutcome::Continue)
            }
            OutputPoll::EndOfStream => Ok(DrainOutcome::Finished),
            OutputPoll::Frame(slot, meta) => {
                if self
                    .clock
                    .pace_until(meta.pts, self.config.pacing_slice, &self.stop)
                {
                    self.session
                        .release_output_slot(slot, true, RenderSchedule::At(meta.pts))?;
                    self.stats.record_rendered();
                    Ok(DrainOutcome::Continue)
                } else {
                    // Stop arrived mid-wait. The frame is stale by the
                    // time anyone could look at it, so drop it.
                    self.session
                        .release_output_slot(slot, false, RenderSchedule::Immediate)?;
                    self.stats.record_dropped();
                    Ok(DrainOutcome::Cancelled)
                }
            }
        }
    }
}
