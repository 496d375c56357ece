//! Prelude for usbh-hid-fifo.
//!
//! ```rust
//! use usbh_hid_fifo::prelude::*;
//!
//! let fifo = ReportFifo::with_capacity(8)?;
//! fifo.write(&[0xAA]);
//! let stats: FifoStatsSnapshot = fifo.stats().snapshot();
//! assert_eq!(stats.bytes_written, 1);
//! # Ok::<(), FifoError>(())
//! ```

pub use crate::fifo::{DEFAULT_FIFO_CAPACITY, FifoError, ReportFifo};
pub use crate::stats::{FifoStats, FifoStatsSnapshot};
