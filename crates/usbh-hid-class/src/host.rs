//! Collaborator traits: the USB host core below the driver and the report
//! translation layer above it.

use serde::{Deserialize, Serialize};
use usbh_hid_descriptor::{Interface, InterfaceDescriptor, SetupPacket, TransferType};

use crate::config::{DeviceMode, InterfaceSelection};
use crate::error::TransportError;

/// Host-side pipe (channel) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PipeId(pub u8);

/// Bus speed of the attached device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum DeviceSpeed {
    /// 1.5 Mbit/s
    Low,
    /// 12 Mbit/s
    #[default]
    Full,
    /// 480 Mbit/s
    High,
}

/// Parameters for opening a pipe on an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipeConfig {
    /// `bEndpointAddress`
    pub endpoint_address: u8,
    /// Device address on the bus
    pub device_address: u8,
    /// Device speed
    pub speed: DeviceSpeed,
    /// Transfer type the pipe is opened for
    pub transfer_type: TransferType,
    /// `wMaxPacketSize`
    pub max_packet_size: u16,
}

/// Outcome of one non-blocking control request step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlStatus {
    /// Transfer completed, data stage (if any) filled
    Ok,
    /// Transfer still in flight; call again
    Busy,
    /// The device stalled the request
    NotSupported,
    /// Transport-level failure
    Failed,
}

/// State of the last URB on a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum UrbState {
    /// Submitted, no completion reported yet
    #[default]
    Idle,
    /// Completed successfully
    Done,
    /// NAK or transient error
    NotReady,
    /// Endpoint halted
    Stall,
    /// Transfer error
    Error,
}

/// Events reported to the application through the host core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// The class finished its control requests and is running
    ClassActive,
}

/// Services the USB host core provides to a class driver.
///
/// All calls are non-blocking. Interface indices are positions in the active
/// configuration, as returned by [`UsbHost::find_interface`].
pub trait UsbHost {
    /// Index of the first interface matching `class`, and `subclass` and
    /// `protocol` when given.
    fn find_interface(&self, class: u8, subclass: Option<u8>, protocol: Option<u8>) -> Option<u8>;

    /// Make `index` the active interface.
    fn select_interface(&mut self, index: u8) -> Result<(), TransportError>;

    /// Index of the active interface.
    fn current_interface(&self) -> u8;

    /// Parsed interface at `index`, with its endpoints.
    fn interface(&self, index: u8) -> Option<&Interface>;

    /// Raw configuration descriptor as fetched during enumeration.
    fn raw_configuration(&self) -> &[u8];

    /// Device address on the bus.
    fn device_address(&self) -> u8;

    /// Device speed.
    fn speed(&self) -> DeviceSpeed;

    /// Reserve a pipe for `endpoint_address`.
    fn alloc_pipe(&mut self, endpoint_address: u8) -> Result<PipeId, TransportError>;

    /// Configure and open an allocated pipe.
    fn open_pipe(&mut self, pipe: PipeId, config: &PipeConfig) -> Result<(), TransportError>;

    /// Close an open pipe.
    fn close_pipe(&mut self, pipe: PipeId) -> Result<(), TransportError>;

    /// Return a pipe to the free pool.
    fn free_pipe(&mut self, pipe: PipeId) -> Result<(), TransportError>;

    /// Set the data toggle of a pipe.
    fn set_toggle(&mut self, pipe: PipeId, toggle: u8) -> Result<(), TransportError>;

    /// Advance a control request on the default pipe.
    ///
    /// Call repeatedly with the same arguments until the result is not
    /// [`ControlStatus::Busy`]. IN data lands in `data`.
    fn control_request(&mut self, setup: &SetupPacket, data: &mut [u8]) -> ControlStatus;

    /// Arm an interrupt-IN transfer of up to `length` bytes.
    fn submit_interrupt_in(&mut self, pipe: PipeId, length: usize) -> Result<(), TransportError>;

    /// State of the last URB on `pipe`.
    fn urb_state(&self, pipe: PipeId) -> UrbState;

    /// Copy the payload of the last completed transfer into `buf` and return
    /// the number of bytes the device sent.
    fn transfer_data(&mut self, pipe: PipeId, buf: &mut [u8]) -> usize;

    /// Current (micro)frame counter.
    fn frame_number(&self) -> u32;

    /// Forward an event to the application.
    fn user_event(&mut self, event: HostEvent);

    /// Ask the scheduler to run the class again as soon as possible.
    fn signal(&mut self);
}

/// The translation layer consuming raw reports.
pub trait ReportSink {
    /// Per-device mode override.
    fn device_mode(&self) -> Option<DeviceMode> {
        None
    }

    /// Per-device interface selection override.
    fn interface_selection(&self) -> Option<InterfaceSelection> {
        None
    }

    /// The interface chosen at bind time.
    fn interface_found(&mut self, _index: u8, _interface: &InterfaceDescriptor) {}

    /// Raw report descriptor fetched from the device.
    fn report_descriptor(&mut self, descriptor: &[u8]);

    /// A report was queued; `timestamp_us` is when the pump step started.
    fn event(&mut self, timestamp_us: u64);

    /// Free-running microsecond clock.
    fn now_us(&self) -> u64;
}
