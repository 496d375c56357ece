//! # usbh-hid-fifo
//!
//! Bounded byte ring buffer that carries raw HID input reports from the
//! interrupt pump (producer) to the report consumer running in another
//! execution context.
//!
//! ## Exclusion model
//!
//! The buffer is guarded by a single busy flag acquired with a non-blocking
//! test-and-set. Neither side ever waits for the other:
//!
//! - A `write` that finds the flag held writes nothing and returns `0`.
//! - A `read` that finds the flag held reads nothing and returns `0`.
//! - A `write` into a nearly full buffer stores a prefix and stops.
//!
//! Contention therefore costs bounded, silent data loss instead of latency on
//! the producer side. [`FifoStats`] counts what was dropped and why.
//!
//! ## Usage
//!
//! ```rust
//! use usbh_hid_fifo::ReportFifo;
//!
//! let fifo = ReportFifo::with_capacity(16)?;
//!
//! // Producer side (interrupt pump)
//! assert_eq!(fifo.write(&[0x01, 0x02, 0x03]), 3);
//!
//! // Consumer side
//! let mut report = [0u8; 3];
//! assert_eq!(fifo.read(&mut report), 3);
//! assert_eq!(report, [0x01, 0x02, 0x03]);
//! # Ok::<(), usbh_hid_fifo::FifoError>(())
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod fifo;
pub mod prelude;
pub mod stats;

pub use fifo::{DEFAULT_FIFO_CAPACITY, FifoError, ReportFifo};
pub use stats::{FifoStats, FifoStatsSnapshot};
