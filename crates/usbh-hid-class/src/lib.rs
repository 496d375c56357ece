//! USB host HID class driver.
//!
//! Binds to a HID interface of an attached device, runs the HID class
//! requests once, then keeps an interrupt-IN transfer armed and pushes every
//! received report into a [`usbh_hid_fifo::ReportFifo`] read by a consumer in
//! another execution context.
//!
//! The driver never blocks. The host core steps it through [`HostClass`]:
//!
//! - [`HostClass::init`] selects the interface and opens its pipes.
//! - [`HostClass::class_request`] steps the control sequencer
//!   ([`RequestState`]).
//! - [`HostClass::process`] steps the data pump ([`PumpState`]).
//! - [`HostClass::sof_process`] runs on every frame tick.
//!
//! Transport services come from a [`UsbHost`] implementation; raw reports and
//! the report descriptor go to a [`ReportSink`].
//!
//! ```rust
//! use usbh_hid_class::mock::{MockHost, RecordingSink};
//! use usbh_hid_class::{HidClass, HidClassConfig, HostClass, Progress};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config_blob = [
//!     0x09, 0x02, 0x22, 0x00, 0x01, 0x01, 0x00, 0xA0, 0x32,
//!     0x09, 0x04, 0x00, 0x00, 0x01, 0x03, 0x01, 0x02, 0x00,
//!     0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, 0x04, 0x00,
//!     0x07, 0x05, 0x81, 0x03, 0x04, 0x00, 0x0A,
//! ];
//! let mut host = MockHost::new(&config_blob)?;
//! let mut sink = RecordingSink::default();
//!
//! let driver = HidClass::new(HidClassConfig::default())?;
//! let mut handle = driver.init(&mut host, &mut sink)?;
//! while driver.class_request(&mut host, &mut sink, &mut handle)? == Progress::Pending {}
//! # Ok(())
//! # }
//! ```

#![deny(static_mut_refs)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod bind;
pub mod class;
pub mod config;
pub mod error;
pub mod handle;
pub mod host;
pub mod mock;
pub mod poll;
pub mod pump;
pub mod role;
pub mod select;
pub mod sequencer;

pub use bind::{BoundEndpoints, Direction, EndpointBinding, bind_endpoints};
pub use class::{HidClass, HostClass, Progress};
pub use config::{DeviceMode, HidClassConfig, InterfaceSelection};
pub use error::{ErrorSeverity, HidClassError, HidClassResult, TransportError};
pub use handle::ClassHandle;
pub use host::{
    ControlStatus, DeviceSpeed, HostEvent, PipeConfig, PipeId, ReportSink, UrbState, UsbHost,
};
pub use poll::clamp_poll_interval;
pub use pump::{PumpState, PumpStats};
pub use role::{HidRole, KeyboardRole, MouseRole, RoleInitializer};
pub use select::select_interface;
pub use sequencer::{RequestState, Sequencer};
