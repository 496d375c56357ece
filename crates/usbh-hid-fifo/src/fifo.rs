//! Fixed-capacity byte ring buffer with a non-blocking busy flag.
//!
//! One slot is always left empty so that `head == tail` means empty and
//! `next(head) == tail` means full. A buffer of capacity `N` therefore holds
//! at most `N - 1` bytes.
//!
//! Slots, `head` and `tail` are atomics so the buffer can be shared through an
//! `Arc` without `unsafe`. They are only touched while the busy flag is held,
//! which is acquired with `Acquire` and released with `Release`; the accesses
//! inside the critical section are `Relaxed`.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

use crate::stats::FifoStats;

/// Default capacity in bytes.
pub const DEFAULT_FIFO_CAPACITY: usize = 640;

/// Construction errors for [`ReportFifo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FifoError {
    /// Capacity of zero was requested.
    #[error("fifo capacity must be non-zero")]
    ZeroCapacity,

    /// Capacity too small to hold a single byte (one slot is reserved).
    #[error("fifo capacity {0} cannot hold any data; at least 2 slots are required")]
    CapacityTooSmall(usize),
}

/// Bounded byte queue shared between the interrupt pump and a report consumer.
///
/// All operations take `&self` and never block. See the crate docs for the
/// drop-on-contention policy.
#[derive(Debug)]
pub struct ReportFifo {
    slots: Box<[AtomicU8]>,
    head: AtomicUsize,
    tail: AtomicUsize,
    busy: AtomicBool,
    stats: FifoStats,
}

/// Holds the busy flag; releases it on drop.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl ReportFifo {
    /// Create a buffer with [`DEFAULT_FIFO_CAPACITY`] slots.
    #[must_use]
    pub fn new() -> Self {
        Self::allocate(DEFAULT_FIFO_CAPACITY)
    }

    /// Create a buffer with `capacity` slots (`capacity - 1` usable bytes).
    ///
    /// # Errors
    ///
    /// Returns [`FifoError::ZeroCapacity`] for `0` and
    /// [`FifoError::CapacityTooSmall`] for `1`.
    pub fn with_capacity(capacity: usize) -> Result<Self, FifoError> {
        match capacity {
            0 => Err(FifoError::ZeroCapacity),
            1 => Err(FifoError::CapacityTooSmall(capacity)),
            _ => Ok(Self::allocate(capacity)),
        }
    }

    fn allocate(capacity: usize) -> Self {
        let slots: Vec<AtomicU8> = (0..capacity).map(|_| AtomicU8::new(0)).collect();
        Self {
            slots: slots.into_boxed_slice(),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            busy: AtomicBool::new(false),
            stats: FifoStats::new(),
        }
    }

    /// Declared capacity in slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Maximum number of bytes the buffer can hold at once.
    #[inline]
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.capacity().saturating_sub(1)
    }

    /// Store as many leading bytes of `bytes` as fit.
    ///
    /// Returns the number of bytes stored. Returns `0` without touching the
    /// buffer if another `write`, `read` or `reset` currently holds the busy
    /// flag. Stops early, leaving a partial write, once the buffer is full.
    pub fn write(&self, bytes: &[u8]) -> usize {
        let Some(_guard) = self.try_acquire() else {
            self.stats.record_contended_write(bytes.len());
            return 0;
        };

        let capacity = self.capacity();
        let tail = self.tail.load(Ordering::Relaxed);
        let mut head = self.head.load(Ordering::Relaxed);
        let mut written = 0usize;

        for &byte in bytes {
            let next = advance(head, capacity);
            if next == tail {
                break;
            }
            if let Some(slot) = self.slots.get(head) {
                slot.store(byte, Ordering::Relaxed);
            }
            head = next;
            written = written.saturating_add(1);
        }

        self.head.store(head, Ordering::Relaxed);
        self.stats.record_write(written, bytes.len());
        written
    }

    /// Move up to `out.len()` bytes out of the buffer into `out`.
    ///
    /// Returns the number of bytes read. Returns `0` if the busy flag is held
    /// elsewhere. Stops early, leaving a partial read, once the buffer is
    /// empty.
    pub fn read(&self, out: &mut [u8]) -> usize {
        let Some(_guard) = self.try_acquire() else {
            self.stats.record_contended_read();
            return 0;
        };

        let capacity = self.capacity();
        let head = self.head.load(Ordering::Relaxed);
        let mut tail = self.tail.load(Ordering::Relaxed);
        let mut read = 0usize;

        for dst in out.iter_mut() {
            if tail == head {
                break;
            }
            if let Some(slot) = self.slots.get(tail) {
                *dst = slot.load(Ordering::Relaxed);
            }
            tail = advance(tail, capacity);
            read = read.saturating_add(1);
        }

        self.tail.store(tail, Ordering::Relaxed);
        self.stats.record_read(read);
        read
    }

    /// Discard all stored bytes.
    ///
    /// Returns `false` if the busy flag was held and nothing was discarded.
    pub fn reset(&self) -> bool {
        let Some(_guard) = self.try_acquire() else {
            return false;
        };
        self.head.store(0, Ordering::Relaxed);
        self.tail.store(0, Ordering::Relaxed);
        true
    }

    /// Number of stored bytes.
    ///
    /// Lock-free snapshot; may be stale by the time it is used.
    #[must_use]
    pub fn len(&self) -> usize {
        let capacity = self.capacity();
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        if head >= tail {
            head.saturating_sub(tail)
        } else {
            capacity.saturating_sub(tail).saturating_add(head)
        }
    }

    /// `true` when no bytes are stored (snapshot).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free space in bytes (snapshot).
    #[must_use]
    pub fn free(&self) -> usize {
        self.max_len().saturating_sub(self.len())
    }

    /// `true` while a `write`, `read` or `reset` holds the busy flag.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }

    /// Drop and contention counters.
    #[must_use]
    pub fn stats(&self) -> &FifoStats {
        &self.stats
    }

    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| BusyGuard { flag: &self.busy })
    }
}

impl Default for ReportFifo {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn advance(index: usize, capacity: usize) -> usize {
    let next = index.saturating_add(1);
    if next >= capacity { 0 } else { next }
}
