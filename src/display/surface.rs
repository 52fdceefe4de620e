//! Lock-free latest-frame surface.
//!
//! Triple buffering between a single writer (the playback thread) and a
//! single reader (the host's render loop):
//!
//! - **Write slot**: the frame currently being published
//! - **Ready slot**: most recently published frame, waiting for the reader
//! - **Read slot**: the frame the reader last took
//!
//! Each slot is owned by exactly one index at any moment. The write
//! index is touched only by the writer, the read index only by the
//! reader, and the ready index moves between them with atomic swaps, so
//! neither side ever blocks and no slot is ever aliased.

use crate::display::{DecodedFrame, RenderSchedule, RenderTarget};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub struct FrameSurface {
    slots: [UnsafeCell<Option<DecodedFrame>>; 3],
    write_idx: AtomicUsize,
    ready_idx: AtomicUsize,
    read_idx: AtomicUsize,
    fresh: AtomicBool,
}

// Safety: the index discipline above guarantees each slot has at most
// one accessor at a time; the atomic swaps publish the contents.
unsafe impl Send for FrameSurface {}
unsafe impl Sync for FrameSurface {}

impl FrameSurface {
    pub fn new() -> Self {
        Self {
            slots: [
                UnsafeCell::new(None),
                UnsafeCell::new(None),
                UnsafeCell::new(None),
            ],
            write_idx: AtomicUsize::new(0),
            ready_idx: AtomicUsize::new(1),
            read_idx: AtomicUsize::new(2),
            fresh: AtomicBool::new(false),
        }
    }

    /// Publish a frame, replacing any unread one. Writer side only.
    pub fn publish(&self, frame: DecodedFrame) {
        let write_idx = self.write_idx.load(Ordering::Relaxed);
        // Safety: write_idx is owned by the writer until the swap below.
        unsafe {
            *self.slots[write_idx].get() = Some(frame);
        }

        let ready_idx = self.ready_idx.swap(write_idx, Ordering::AcqRel);
        self.write_idx.store(ready_idx, Ordering::Release);
        self.fresh.store(true, Ordering::Release);
    }

    /// Take the most recent frame, if a new one arrived since the last
    /// call. Reader side only.
    pub fn latest(&self) -> Option<DecodedFrame> {
        if self.fresh.swap(false, Ordering::AcqRel) {
            let read_idx = self.read_idx.load(Ordering::Relaxed);
            let ready_idx = self.ready_idx.swap(read_idx, Ordering::AcqRel);
            self.read_idx.store(ready_idx, Ordering::Release);
        }

        let read_idx = self.read_idx.load(Ordering::Relaxed);
        // Safety: read_idx is owned by the reader between the swaps.
        unsafe { (*self.slots[read_idx].get()).clone() }
    }

    pub fn has_frame(&self) -> bool {
        self.fresh.load(Ordering::Acquire)
    }
}

impl Default for FrameSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget for FrameSurface {
    fn present(&self, frame: DecodedFrame, _schedule: RenderSchedule) {
        // Pacing already happened upstream; the surface just keeps the
        // latest frame for the host to poll.
        self.publish(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::Timestamp;
    use bytes::Bytes;
    use std::sync::Arc;
    use std::thread;

    fn frame(tag: u8, pts: i64) -> DecodedFrame {
        DecodedFrame {
            data: Bytes::from(vec![tag; 16]),
            width: 4,
            height: 4,
            pts: Timestamp::from_micros(pts),
        }
    }

    #[test]
    fn test_empty_surface_has_nothing() {
        let surface = FrameSurface::new();
        assert!(!surface.has_frame());
        assert!(surface.latest().is_none());
    }

    #[test]
    fn test_publish_then_read() {
        let surface = FrameSurface::new();
        surface.publish(frame(7, 33_000));

        assert!(surface.has_frame());
        let got = surface.latest().unwrap();
        assert_eq!(got.pts, Timestamp::from_micros(33_000));
        assert_eq!(got.data[0], 7);

        // Read consumed the freshness, not the frame.
        assert!(!surface.has_frame());
        assert!(surface.latest().is_some());
    }

    #[test]
    fn test_reader_sees_only_the_latest() {
        let surface = FrameSurface::new();
        for i in 0..10 {
            surface.publish(frame(i, i as i64 * 1000));
        }

        let got = surface.latest().unwrap();
        assert_eq!(got.data[0], 9);
    }

    #[test]
    fn test_concurrent_publish_and_read() {
        let surface = Arc::new(FrameSurface::new());
        let writer_surface = Arc::clone(&surface);

        let writer = thread::spawn(move || {
            for i in 0..500u32 {
                let tag = (i % 256) as u8;
                writer_surface.publish(DecodedFrame {
                    data: Bytes::from(vec![tag; 64]),
                    width: 8,
                    height: 8,
                    pts: Timestamp::from_micros(i as i64),
                });
            }
        });

        let reader = thread::spawn(move || {
            for _ in 0..500 {
                if let Some(got) = surface.latest() {
                    let first = got.data[0];
                    assert!(got.data.iter().all(|&b| b == first));
                }
            }
        });

        writer.join().unwrap();
        reader.join().unwrap();
    }
}
