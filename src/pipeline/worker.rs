//! The playback thread.
//!
//! The whole pipeline runs on one dedicated thread. The handle exposes
//! the stop signal and the counters; joining returns the driver's
//! result.

use crate::decode::DecoderSession;
use crate::demux::SampleSource;
use crate::error::{PlaybackError, Result};
use crate::pipeline::cancel::StopSignal;
use crate::pipeline::driver::PipelineDriver;
use crate::pipeline::stats::PipelineStats;
use std::sync::Arc;
use std::thread::JoinHandle;

pub struct PlaybackWorker {
    stop: StopSignal,
    stats: Arc<PipelineStats>,
    handle: Option<JoinHandle<Result<()>>>,
}

impl PlaybackWorker {
    /// Move the driver onto its own thread and start playing.
    pub fn spawn<S, D>(driver: PipelineDriver<S, D>) -> Result<Self>
    where
        S: SampleSource + Send + 'static,
        D: DecoderSession + Send + 'static,
    {
        let stop = driver.stop_signal();
        let stats = driver.stats();

        let handle = std::thread::Builder::new()
            .name("framecast-playback".to_string())
            .spawn(move || driver.run())
            .map_err(|e| PlaybackError::Worker(e.to_string()))?;

        log::info!("Worker: playback thread started");
        Ok(Self {
            stop,
            stats,
            handle: Some(handle),
        })
    }

    /// Ask the pipeline to stop without waiting for it.
    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Wait for playback to end on its own.
    pub fn join(mut self) -> Result<()> {
        self.join_inner()
    }

    /// Stop playback and wait for the thread. Safe to call at any point
    /// of the pipeline's life, including after it already finished.
    pub fn stop(mut self) -> Result<()> {
        self.stop.request_stop();
        self.join_inner()
    }

    fn join_inner(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| PlaybackError::Worker("playback thread panicked".to_string()))?,
            None => Ok(()),
        }
    }
}

impl Drop for PlaybackWorker {
    fn drop(&mut self) {
        self.stop.request_stop();
        if let Err(e) = self.join_inner() {
            log::warn!("Worker: playback ended with error: {e}");
        }
    }
}
