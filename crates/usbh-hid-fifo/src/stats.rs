//! Drop accounting for [`ReportFifo`](crate::ReportFifo).
//!
//! Counters are `AtomicU32` so they stay lock-free on 32-bit microcontrollers
//! without 64-bit atomics. They wrap on overflow.

use core::sync::atomic::{AtomicU32, Ordering};

/// Point-in-time copy of [`FifoStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FifoStatsSnapshot {
    /// Bytes stored by `write`.
    pub bytes_written: u32,
    /// Bytes handed out by `read`.
    pub bytes_read: u32,
    /// Bytes offered to `write` while the busy flag was held elsewhere.
    pub dropped_on_contention: u32,
    /// Bytes offered to `write` that did not fit.
    pub dropped_on_overflow: u32,
    /// Number of `write` or `read` calls that found the busy flag held.
    pub contended_calls: u32,
}

impl FifoStatsSnapshot {
    /// Total bytes offered to the buffer but never stored.
    #[must_use]
    pub fn dropped(&self) -> u32 {
        self.dropped_on_contention
            .wrapping_add(self.dropped_on_overflow)
    }
}

/// Relaxed atomic counters updated by the buffer on every call.
#[derive(Debug, Default)]
pub struct FifoStats {
    bytes_written: AtomicU32,
    bytes_read: AtomicU32,
    dropped_on_contention: AtomicU32,
    dropped_on_overflow: AtomicU32,
    contended_calls: AtomicU32,
}

impl FifoStats {
    /// Create zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes_written: AtomicU32::new(0),
            bytes_read: AtomicU32::new(0),
            dropped_on_contention: AtomicU32::new(0),
            dropped_on_overflow: AtomicU32::new(0),
            contended_calls: AtomicU32::new(0),
        }
    }

    #[inline]
    pub(crate) fn record_write(&self, stored: usize, offered: usize) {
        self.bytes_written
            .fetch_add(saturate(stored), Ordering::Relaxed);
        let overflow = offered.saturating_sub(stored);
        if overflow > 0 {
            self.dropped_on_overflow
                .fetch_add(saturate(overflow), Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_read(&self, count: usize) {
        self.bytes_read.fetch_add(saturate(count), Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_contended_write(&self, offered: usize) {
        self.contended_calls.fetch_add(1, Ordering::Relaxed);
        self.dropped_on_contention
            .fetch_add(saturate(offered), Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_contended_read(&self) {
        self.contended_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters without resetting them.
    ///
    /// Each counter is loaded individually; the snapshot is not atomic across
    /// counters.
    #[must_use]
    pub fn snapshot(&self) -> FifoStatsSnapshot {
        FifoStatsSnapshot {
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            dropped_on_contention: self.dropped_on_contention.load(Ordering::Relaxed),
            dropped_on_overflow: self.dropped_on_overflow.load(Ordering::Relaxed),
            contended_calls: self.contended_calls.load(Ordering::Relaxed),
        }
    }

    /// Read all counters and reset them to zero.
    #[must_use]
    pub fn snapshot_and_reset(&self) -> FifoStatsSnapshot {
        FifoStatsSnapshot {
            bytes_written: self.bytes_written.swap(0, Ordering::Relaxed),
            bytes_read: self.bytes_read.swap(0, Ordering::Relaxed),
            dropped_on_contention: self.dropped_on_contention.swap(0, Ordering::Relaxed),
            dropped_on_overflow: self.dropped_on_overflow.swap(0, Ordering::Relaxed),
            contended_calls: self.contended_calls.swap(0, Ordering::Relaxed),
        }
    }
}

fn saturate(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
