//! Wall-clock pacing for frame presentation.
//!
//! Frame timestamps are relative to the moment playback started. The
//! clock captures that moment once and converts presentation timestamps
//! into bounded sleeps, sliced so a stop request never waits behind a
//! long frame interval.

use crate::pipeline::cancel::StopSignal;
use crate::pipeline::types::Timestamp;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct PlaybackClock {
    base: Option<Instant>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the playback start moment. Later calls are no-ops, so the
    /// origin never moves once the loop is running.
    pub fn start(&mut self) {
        if self.base.is_none() {
            self.base = Some(Instant::now());
        }
    }

    /// Wall-clock time elapsed since start. Zero before `start`.
    pub fn elapsed(&self) -> Timestamp {
        match self.base {
            Some(base) => Timestamp::from_instant(Instant::now(), base),
            None => Timestamp::ZERO,
        }
    }

    /// Sleep in slices of at most `slice` until the clock reaches `pts`.
    ///
    /// Returns true when the presentation time has arrived and false when
    /// a stop was requested mid-wait. The stop flag is checked before
    /// every slice, so the wait overshoots a stop request by at most one
    /// slice.
    pub fn pace_until(&self, pts: Timestamp, slice: Duration, stop: &StopSignal) -> bool {
        loop {
            if stop.is_requested() {
                return false;
            }

            let remaining = pts.saturating_since(self.elapsed());
            if remaining.is_zero() {
                return true;
            }

            thread::sleep(remaining.min(slice));
        }
    }
}
