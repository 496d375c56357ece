//! Per-interface driver state.

use std::sync::Arc;

use usbh_hid_descriptor::{HidDescriptor, HidDescriptorLookup};
use usbh_hid_fifo::ReportFifo;

use crate::bind::{BoundEndpoints, EndpointBinding};
use crate::host::PipeId;
use crate::pump::{PumpState, PumpStats};
use crate::role::{HidRole, RoleInitializer};
use crate::sequencer::{RequestState, Sequencer};

/// State of one bound HID interface.
///
/// Created by [`crate::HidClass`] on a successful bind and consumed by
/// `deinit`. Both state machines take it by `&mut`, so nothing else touches
/// it while a step runs. The ring buffer is the only part shared with the
/// report consumer; see [`ClassHandle::fifo`].
#[derive(Debug)]
pub struct ClassHandle {
    pub(crate) interface_index: u8,
    pub(crate) interface_number: u8,
    pub(crate) interface_protocol: u8,
    pub(crate) role: &'static dyn RoleInitializer,
    pub(crate) endpoints: BoundEndpoints,
    pub(crate) report_ceiling: u16,
    pub(crate) length: usize,
    pub(crate) poll_interval: u8,
    pub(crate) hid_lookup: HidDescriptorLookup,
    pub(crate) hid_descriptor: HidDescriptor,
    pub(crate) report_descriptor: Vec<u8>,
    pub(crate) payload: Vec<u8>,
    pub(crate) fifo: Arc<ReportFifo>,
    pub(crate) sequencer: Sequencer,
    pub(crate) pump: PumpState,
    pub(crate) stats: PumpStats,
}

/// Bind-time inputs for [`ClassHandle::new`].
#[derive(Debug)]
pub(crate) struct HandleParts {
    pub interface_index: u8,
    pub interface_number: u8,
    pub interface_protocol: u8,
    pub endpoints: BoundEndpoints,
    pub report_ceiling: u16,
    pub poll_interval: u8,
    pub fifo: Arc<ReportFifo>,
}

impl ClassHandle {
    pub(crate) fn new(parts: HandleParts) -> Self {
        let role = HidRole::from_protocol(parts.interface_protocol).initializer();
        let length = usize::from(
            parts
                .endpoints
                .in_endpoint
                .max_packet_size
                .min(parts.report_ceiling),
        );
        Self {
            interface_index: parts.interface_index,
            interface_number: parts.interface_number,
            interface_protocol: parts.interface_protocol,
            role,
            endpoints: parts.endpoints,
            report_ceiling: parts.report_ceiling,
            length,
            poll_interval: parts.poll_interval,
            hid_lookup: HidDescriptorLookup::NotFound,
            hid_descriptor: HidDescriptor::default(),
            report_descriptor: Vec::new(),
            payload: vec![0; length],
            fifo: parts.fifo,
            sequencer: Sequencer::new(),
            pump: PumpState::Init,
            stats: PumpStats::default(),
        }
    }

    /// Interface index in the active configuration.
    pub fn interface_index(&self) -> u8 {
        self.interface_index
    }

    /// `bInterfaceNumber` of the bound interface.
    pub fn interface_number(&self) -> u8 {
        self.interface_number
    }

    /// `bInterfaceProtocol` of the bound interface.
    pub fn interface_protocol(&self) -> u8 {
        self.interface_protocol
    }

    /// Role chosen at bind time.
    pub fn device_type(&self) -> HidRole {
        self.role.role()
    }

    /// Interrupt IN endpoint.
    pub fn in_endpoint(&self) -> &EndpointBinding {
        &self.endpoints.in_endpoint
    }

    /// Interrupt OUT endpoint, if the interface has one.
    pub fn out_endpoint(&self) -> Option<&EndpointBinding> {
        self.endpoints.out_endpoint.as_ref()
    }

    /// Pipe of the IN endpoint.
    pub fn in_pipe(&self) -> PipeId {
        self.endpoints.in_endpoint.pipe
    }

    /// Pipe of the OUT endpoint.
    pub fn out_pipe(&self) -> Option<PipeId> {
        self.endpoints.out_endpoint.map(|e| e.pipe)
    }

    /// Negotiated interrupt-IN transfer length in bytes.
    pub fn transfer_length(&self) -> usize {
        self.length
    }

    /// Poll interval in ms after clamping.
    pub fn poll_interval(&self) -> u8 {
        self.poll_interval
    }

    /// HID descriptor captured by the sequencer; zeroed until then or when
    /// the configuration had none for this interface.
    pub fn hid_descriptor(&self) -> &HidDescriptor {
        &self.hid_descriptor
    }

    /// Explicit result of the HID descriptor scan.
    pub fn hid_lookup(&self) -> HidDescriptorLookup {
        self.hid_lookup
    }

    /// Report descriptor bytes fetched by the sequencer.
    pub fn report_descriptor(&self) -> &[u8] {
        &self.report_descriptor
    }

    /// Most recent interrupt-IN payload.
    pub fn last_payload(&self) -> &[u8] {
        &self.payload
    }

    /// Shared ring buffer the pump writes reports into.
    pub fn fifo(&self) -> Arc<ReportFifo> {
        Arc::clone(&self.fifo)
    }

    /// Control sequencer state.
    pub fn request_state(&self) -> RequestState {
        self.sequencer.state()
    }

    /// Data pump state.
    pub fn pump_state(&self) -> PumpState {
        self.pump
    }

    /// Data pump counters.
    pub fn pump_stats(&self) -> &PumpStats {
        &self.stats
    }
}
