//! Pipeline machinery: the driver loop, its clock, cancellation, the
//! worker thread, and counters.

pub mod cancel;
pub mod clock;
pub mod driver;
pub mod stats;
pub mod types;
pub mod worker;

#[cfg(test)]
pub(crate) mod mock;

pub use cancel::StopSignal;
pub use clock::PlaybackClock;
pub use driver::PipelineDriver;
pub use stats::{PipelineStats, StatsSummary};
pub use types::Timestamp;
pub use worker::PlaybackWorker;
