//! Hand-off queue between the audio callback and the consumer loop

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Capture counters (shared between the callback and the consumer)
#[derive(Debug, Default)]
pub struct CaptureStats {
    chunks_pushed: AtomicU64,
    chunks_dropped: AtomicU64,
    samples_pushed: AtomicU64,
    stream_errors: AtomicU64,
}

/// Point-in-time copy of [`CaptureStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStatsSnapshot {
    pub chunks_pushed: u64,
    pub chunks_dropped: u64,
    pub samples_pushed: u64,
    pub stream_errors: u64,
}

impl CaptureStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fault reported by the audio driver. Returns the new total.
    pub fn record_stream_error(&self) -> u64 {
        self.stream_errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self) -> CaptureStatsSnapshot {
        CaptureStatsSnapshot {
            chunks_pushed: self.chunks_pushed.load(Ordering::Relaxed),
            chunks_dropped: self.chunks_dropped.load(Ordering::Relaxed),
            samples_pushed: self.samples_pushed.load(Ordering::Relaxed),
            stream_errors: self.stream_errors.load(Ordering::Relaxed),
        }
    }
}

/// FIFO of mono sample chunks, one producer and one consumer.
///
/// The producer is the hardware callback, so `push` only ever holds the lock
/// for a `push_back`; `drain_all` swaps the whole deque out under the lock
/// and hands it over, so the consumer never holds it while processing.
///
/// Growth is bounded by `capacity` (in chunks). A chunk arriving while the
/// queue is full is dropped and counted in [`CaptureStats`].
pub struct CaptureQueue {
    chunks: Mutex<VecDeque<Vec<f32>>>,
    capacity: usize,
    stats: CaptureStats,
}

impl CaptureQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            chunks: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            stats: CaptureStats::new(),
        }
    }

    /// Enqueue a chunk. Returns `false` if it was dropped on overflow.
    pub fn push(&self, chunk: Vec<f32>) -> bool {
        if chunk.is_empty() {
            return true;
        }

        let len = chunk.len() as u64;
        {
            let mut chunks = self.chunks.lock();
            if chunks.len() >= self.capacity {
                drop(chunks);
                let dropped = self.stats.chunks_dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped == 1 || dropped % 100 == 0 {
                    log::warn!(
                        "Capture queue full ({} chunks), {} chunk(s) dropped so far",
                        self.capacity,
                        dropped
                    );
                }
                return false;
            }
            chunks.push_back(chunk);
        }

        self.stats.chunks_pushed.fetch_add(1, Ordering::Relaxed);
        self.stats.samples_pushed.fetch_add(len, Ordering::Relaxed);
        true
    }

    /// Remove and return everything queued so far, oldest first.
    /// Never waits for data; returns an empty deque when nothing is queued.
    pub fn drain_all(&self) -> VecDeque<Vec<f32>> {
        let mut chunks = self.chunks.lock();
        if chunks.is_empty() {
            return VecDeque::new();
        }
        std::mem::replace(&mut *chunks, VecDeque::with_capacity(self.capacity))
    }

    /// Number of chunks currently queued
    pub fn len(&self) -> usize {
        self.chunks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> &CaptureStats {
        &self.stats
    }
}
