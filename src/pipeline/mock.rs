//! Scripted source and session doubles for driver tests.
//!
//! `MockSession` is a passthrough decoder: every submitted sample
//! becomes one decoded frame with the same timestamp. It asserts the
//! slot discipline as it goes, so a driver that double-acquires,
//! double-releases, or submits past end-of-stream fails the test at the
//! point of misuse.

use crate::decode::{
    DecoderSession, InputPoll, InputSlot, OutputMeta, OutputPoll, OutputSlot,
};
use crate::demux::{SampleInfo, SampleRead, SampleSource, TrackInfo};
use crate::display::RenderSchedule;
use crate::error::{PlaybackError, Result};
use crate::pipeline::types::Timestamp;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub enum ReadScript {
    Sample(Vec<u8>, i64),
    Fail(&'static str),
}

pub struct MockSource {
    tracks: Vec<TrackInfo>,
    script: VecDeque<ReadScript>,
}

impl MockSource {
    pub fn new(script: Vec<ReadScript>) -> Self {
        Self {
            tracks: vec![TrackInfo {
                index: 0,
                media_type: "video/h264".to_string(),
                width: 320,
                height: 240,
            }],
            script: script.into(),
        }
    }
}

impl SampleSource for MockSource {
    fn tracks(&self) -> &[TrackInfo] {
        &self.tracks
    }

    fn select_track(&mut self, index: usize) -> Result<()> {
        if index < self.tracks.len() {
            Ok(())
        } else {
            Err(PlaybackError::InvalidTrack(index))
        }
    }

    fn next_sample(&mut self, buf: &mut Vec<u8>) -> Result<SampleRead> {
        match self.script.pop_front() {
            Some(ReadScript::Sample(data, pts)) => {
                buf.clear();
                buf.extend_from_slice(&data);
                Ok(SampleRead::Sample(SampleInfo {
                    size: data.len(),
                    pts: Timestamp::from_micros(pts),
                }))
            }
            Some(ReadScript::Fail(msg)) => Err(PlaybackError::SampleRead(msg.to_string())),
            None => Ok(SampleRead::EndOfStream),
        }
    }
}

/// What the session observed, shared with the test.
#[derive(Default)]
pub struct SessionLog {
    /// (len, pts micros, end_of_stream) per submit, in order.
    submits: Mutex<Vec<(usize, i64, bool)>>,
    /// (render, scheduled pts micros or -1 for Immediate, wall-clock
    /// moment of the release) per release.
    releases: Mutex<Vec<(bool, i64, Instant)>>,
    stop_calls: AtomicU32,
}

impl SessionLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn submits(&self) -> Vec<(usize, i64, bool)> {
        self.submits.lock().unwrap().clone()
    }

    pub fn releases(&self) -> Vec<(bool, i64, Instant)> {
        self.releases.lock().unwrap().clone()
    }

    pub fn stop_calls(&self) -> u32 {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

pub struct MockSession {
    log: Arc<SessionLog>,
    started: bool,
    eos_seen: bool,
    buffer: Vec<u8>,
    /// How many input polls report Busy before slots flow.
    input_busy: u32,
    /// Output polls emitted before any frame, one per acquisition.
    output_preludes: VecDeque<OutputPoll>,
    /// (len, pts micros) of frames waiting for an output poll.
    frames: VecDeque<(usize, i64)>,
    outstanding: Option<usize>,
}

impl MockSession {
    pub fn new(log: Arc<SessionLog>) -> Self {
        Self {
            log,
            started: false,
            eos_seen: false,
            buffer: Vec::new(),
            input_busy: 0,
            output_preludes: VecDeque::new(),
            frames: VecDeque::new(),
            outstanding: None,
        }
    }

    pub fn with_input_busy(mut self, polls: u32) -> Self {
        self.input_busy = polls;
        self
    }

    pub fn with_output_preludes(mut self, preludes: Vec<OutputPoll>) -> Self {
        self.output_preludes = preludes.into();
        self
    }
}

impl DecoderSession for MockSession {
    fn start(&mut self) -> Result<()> {
        assert!(!self.started, "started twice");
        self.started = true;
        Ok(())
    }

    fn acquire_input_slot(&mut self, _timeout: Duration) -> Result<InputPoll> {
        assert!(self.started, "input poll before start");
        if self.input_busy > 0 {
            self.input_busy -= 1;
            return Ok(InputPoll::Busy);
        }
        Ok(InputPoll::Slot(InputSlot { index: 0 }))
    }

    fn input_buffer(&mut self, _slot: &InputSlot) -> &mut Vec<u8> {
        &mut self.buffer
    }

    fn submit_input(
        &mut self,
        _slot: InputSlot,
        len: usize,
        pts: Timestamp,
        end_of_stream: bool,
    ) -> Result<()> {
        assert!(self.started, "submit before start");
        assert!(!self.eos_seen, "submit after end of stream");

        self.log
            .submits
            .lock()
            .unwrap()
            .push((len, pts.micros(), end_of_stream));

        if end_of_stream {
            self.eos_seen = true;
        } else {
            self.frames.push_back((len, pts.micros()));
        }
        Ok(())
    }

    fn acquire_output_slot(&mut self, _timeout: Duration) -> Result<OutputPoll> {
        assert!(self.started, "output poll before start");
        assert!(
            self.outstanding.is_none(),
            "output acquired while a slot is still held"
        );

        if let Some(prelude) = self.output_preludes.pop_front() {
            return Ok(prelude);
        }

        if let Some((len, pts)) = self.frames.pop_front() {
            self.outstanding = Some(0);
            return Ok(OutputPoll::Frame(
                OutputSlot { index: 0 },
                OutputMeta {
                    pts: Timestamp::from_micros(pts),
                    size: len,
                    offset: 0,
                    end_of_stream: false,
                },
            ));
        }

        if self.eos_seen {
            return Ok(OutputPoll::EndOfStream);
        }
        Ok(OutputPoll::Busy)
    }

    fn release_output_slot(
        &mut self,
        slot: OutputSlot,
        render: bool,
        schedule: RenderSchedule,
    ) -> Result<()> {
        assert_eq!(
            self.outstanding.take(),
            Some(slot.index),
            "release of a slot that was not acquired"
        );

        let scheduled = match schedule {
            RenderSchedule::Immediate => -1,
            RenderSchedule::At(pts) => pts.micros(),
        };
        self.log
            .releases
            .lock()
            .unwrap()
            .push((render, scheduled, Instant::now()));
        Ok(())
    }

    fn stop(&mut self) {
        self.log.stop_calls.fetch_add(1, Ordering::SeqCst);
    }
}
