//! Scriptable host transport and recording report sink for tests.
//!
//! `MockHost` parses a real configuration descriptor blob, hands out pipe
//! identifiers, and plays back scripted control, URB and transfer results.
//! Everything the driver asks of it is recorded for inspection.

use std::collections::{HashMap, VecDeque};

use usbh_hid_descriptor::{
    Configuration, DescriptorResult, Interface, InterfaceDescriptor, SetupPacket,
};

use crate::config::{DeviceMode, InterfaceSelection};
use crate::error::TransportError;
use crate::host::{
    ControlStatus, DeviceSpeed, HostEvent, PipeConfig, PipeId, ReportSink, UrbState, UsbHost,
};

/// Scriptable [`UsbHost`].
#[derive(Debug, Default)]
pub struct MockHost {
    raw_config: Vec<u8>,
    config: Configuration,
    current_interface: u8,
    device_address: u8,
    speed: DeviceSpeed,
    frame: u32,
    next_pipe: u8,
    max_pipes: Option<usize>,
    fail_open_for: Option<u8>,
    select_error: Option<TransportError>,
    allocated: Vec<(PipeId, u8)>,
    opened: Vec<(PipeId, PipeConfig)>,
    closed: Vec<PipeId>,
    freed: Vec<PipeId>,
    toggles: Vec<(PipeId, u8)>,
    control_script: HashMap<u8, VecDeque<ControlStatus>>,
    control_log: Vec<SetupPacket>,
    report_descriptor: Vec<u8>,
    submit_script: VecDeque<Result<(), TransportError>>,
    submits: Vec<(PipeId, usize)>,
    urb_script: VecDeque<UrbState>,
    urb_state: UrbState,
    transfers: VecDeque<Vec<u8>>,
    events: Vec<HostEvent>,
    signals: usize,
}

impl MockHost {
    /// Host whose active configuration is `raw_config`.
    ///
    /// # Errors
    ///
    /// Fails if the blob does not parse as a configuration descriptor.
    pub fn new(raw_config: &[u8]) -> DescriptorResult<Self> {
        let config = Configuration::parse(raw_config)?;
        Ok(Self {
            raw_config: raw_config.to_vec(),
            config,
            device_address: 1,
            next_pipe: 1,
            ..Self::default()
        })
    }

    /// Set the frame counter.
    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame;
    }

    /// Allow at most `count` pipe allocations.
    pub fn limit_pipes(&mut self, count: usize) {
        self.max_pipes = Some(count);
    }

    /// Fail `open_pipe` for `endpoint_address`.
    pub fn fail_open_for(&mut self, endpoint_address: u8) {
        self.fail_open_for = Some(endpoint_address);
    }

    /// Fail `select_interface`.
    pub fn fail_select(&mut self, err: TransportError) {
        self.select_error = Some(err);
    }

    /// Queue results for control requests with `bRequest == request`.
    /// Unscripted requests complete with [`ControlStatus::Ok`].
    pub fn script_control(&mut self, request: u8, results: &[ControlStatus]) {
        self.control_script
            .entry(request)
            .or_default()
            .extend(results.iter().copied());
    }

    /// Bytes returned for GET_DESCRIPTOR(report).
    pub fn set_report_descriptor(&mut self, descriptor: &[u8]) {
        self.report_descriptor = descriptor.to_vec();
    }

    /// Queue results for `submit_interrupt_in`. Unscripted submits succeed.
    pub fn script_submit(&mut self, results: &[Result<(), TransportError>]) {
        self.submit_script.extend(results.iter().copied());
    }

    /// Queue URB outcomes, one per successful submit. Unscripted submits
    /// stay [`UrbState::Idle`].
    pub fn script_urb(&mut self, states: &[UrbState]) {
        self.urb_script.extend(states.iter().copied());
    }

    /// Force the state of the in-flight URB.
    pub fn set_urb_state(&mut self, state: UrbState) {
        self.urb_state = state;
    }

    /// Queue a payload for the next completed transfer.
    pub fn queue_transfer(&mut self, data: &[u8]) {
        self.transfers.push_back(data.to_vec());
    }

    /// Pipes allocated, with their endpoint address.
    pub fn allocated(&self) -> &[(PipeId, u8)] {
        &self.allocated
    }

    /// Pipes opened, with their configuration.
    pub fn opened(&self) -> &[(PipeId, PipeConfig)] {
        &self.opened
    }

    /// Pipes closed.
    pub fn closed(&self) -> &[PipeId] {
        &self.closed
    }

    /// Pipes freed.
    pub fn freed(&self) -> &[PipeId] {
        &self.freed
    }

    /// Toggle resets.
    pub fn toggles(&self) -> &[(PipeId, u8)] {
        &self.toggles
    }

    /// Every control request issued, in order.
    pub fn control_log(&self) -> &[SetupPacket] {
        &self.control_log
    }

    /// Control requests with `bRequest == request`.
    pub fn requests(&self, request: u8) -> usize {
        self.control_log
            .iter()
            .filter(|s| s.request == request)
            .count()
    }

    /// Interrupt submits, with their length.
    pub fn submits(&self) -> &[(PipeId, usize)] {
        &self.submits
    }

    /// Events forwarded to the application.
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Number of scheduler signals.
    pub fn signals(&self) -> usize {
        self.signals
    }

    /// Reset the signal counter and return its old value.
    pub fn take_signals(&mut self) -> usize {
        std::mem::take(&mut self.signals)
    }
}

impl UsbHost for MockHost {
    fn find_interface(&self, class: u8, subclass: Option<u8>, protocol: Option<u8>) -> Option<u8> {
        self.config
            .interfaces
            .iter()
            .position(|i| {
                let d = &i.descriptor;
                d.interface_class == class
                    && subclass.is_none_or(|s| d.interface_subclass == s)
                    && protocol.is_none_or(|p| d.interface_protocol == p)
            })
            .and_then(|p| u8::try_from(p).ok())
    }

    fn select_interface(&mut self, index: u8) -> Result<(), TransportError> {
        if let Some(err) = self.select_error {
            return Err(err);
        }
        self.current_interface = index;
        Ok(())
    }

    fn current_interface(&self) -> u8 {
        self.current_interface
    }

    fn interface(&self, index: u8) -> Option<&Interface> {
        self.config.interface(usize::from(index))
    }

    fn raw_configuration(&self) -> &[u8] {
        &self.raw_config
    }

    fn device_address(&self) -> u8 {
        self.device_address
    }

    fn speed(&self) -> DeviceSpeed {
        self.speed
    }

    fn alloc_pipe(&mut self, endpoint_address: u8) -> Result<PipeId, TransportError> {
        if self
            .max_pipes
            .is_some_and(|max| self.allocated.len() >= max)
        {
            return Err(TransportError::NoFreePipe);
        }
        let pipe = PipeId(self.next_pipe);
        self.next_pipe = self.next_pipe.wrapping_add(1);
        self.allocated.push((pipe, endpoint_address));
        Ok(pipe)
    }

    fn open_pipe(&mut self, pipe: PipeId, config: &PipeConfig) -> Result<(), TransportError> {
        if self.fail_open_for == Some(config.endpoint_address) {
            return Err(TransportError::Failed);
        }
        self.opened.push((pipe, *config));
        Ok(())
    }

    fn close_pipe(&mut self, pipe: PipeId) -> Result<(), TransportError> {
        self.closed.push(pipe);
        Ok(())
    }

    fn free_pipe(&mut self, pipe: PipeId) -> Result<(), TransportError> {
        self.freed.push(pipe);
        Ok(())
    }

    fn set_toggle(&mut self, pipe: PipeId, toggle: u8) -> Result<(), TransportError> {
        self.toggles.push((pipe, toggle));
        Ok(())
    }

    fn control_request(&mut self, setup: &SetupPacket, data: &mut [u8]) -> ControlStatus {
        self.control_log.push(*setup);
        let status = self
            .control_script
            .get_mut(&setup.request)
            .and_then(VecDeque::pop_front)
            .unwrap_or(ControlStatus::Ok);
        if status == ControlStatus::Ok && setup.is_device_to_host() {
            let n = data.len().min(self.report_descriptor.len());
            if let (Some(dst), Some(src)) = (data.get_mut(..n), self.report_descriptor.get(..n)) {
                dst.copy_from_slice(src);
            }
        }
        status
    }

    fn submit_interrupt_in(&mut self, pipe: PipeId, length: usize) -> Result<(), TransportError> {
        let result = self.submit_script.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            self.submits.push((pipe, length));
            self.urb_state = self.urb_script.pop_front().unwrap_or(UrbState::Idle);
        }
        result
    }

    fn urb_state(&self, _pipe: PipeId) -> UrbState {
        self.urb_state
    }

    fn transfer_data(&mut self, _pipe: PipeId, buf: &mut [u8]) -> usize {
        let Some(data) = self.transfers.pop_front() else {
            return 0;
        };
        let n = buf.len().min(data.len());
        if let (Some(dst), Some(src)) = (buf.get_mut(..n), data.get(..n)) {
            dst.copy_from_slice(src);
        }
        data.len()
    }

    fn frame_number(&self) -> u32 {
        self.frame
    }

    fn user_event(&mut self, event: HostEvent) {
        self.events.push(event);
    }

    fn signal(&mut self) {
        self.signals = self.signals.saturating_add(1);
    }
}

/// [`ReportSink`] that records every notification.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Mode override returned to the driver
    pub mode: Option<DeviceMode>,
    /// Selection override returned to the driver
    pub selection: Option<InterfaceSelection>,
    /// Clock value returned by `now_us`
    pub now_us: u64,
    /// `interface_found` calls
    pub found: Vec<(u8, InterfaceDescriptor)>,
    /// Report descriptors received
    pub report_descriptors: Vec<Vec<u8>>,
    /// Event timestamps received
    pub events: Vec<u64>,
}

impl RecordingSink {
    /// Sink preferring `mode`.
    pub fn with_mode(mode: DeviceMode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }
}

impl ReportSink for RecordingSink {
    fn device_mode(&self) -> Option<DeviceMode> {
        self.mode
    }

    fn interface_selection(&self) -> Option<InterfaceSelection> {
        self.selection
    }

    fn interface_found(&mut self, index: u8, interface: &InterfaceDescriptor) {
        self.found.push((index, *interface));
    }

    fn report_descriptor(&mut self, descriptor: &[u8]) {
        self.report_descriptors.push(descriptor.to_vec());
    }

    fn event(&mut self, timestamp_us: u64) {
        self.events.push(timestamp_us);
    }

    fn now_us(&self) -> u64 {
        self.now_us
    }
}

/// Configuration descriptors of common devices.
pub mod fixtures {
    fn finish(mut blob: Vec<u8>) -> Vec<u8> {
        let total = u16::try_from(blob.len()).unwrap_or(u16::MAX).to_le_bytes();
        if let Some(field) = blob.get_mut(2..4) {
            field.copy_from_slice(&total);
        }
        blob
    }

    fn header(num_interfaces: u8) -> Vec<u8> {
        vec![0x09, 0x02, 0x00, 0x00, num_interfaces, 0x01, 0x00, 0xA0, 0x32]
    }

    /// Boot mouse: interface 0, 8-byte interrupt IN on 0x81 at 1 ms, 0x34-byte
    /// report descriptor.
    pub fn boot_mouse() -> Vec<u8> {
        let mut blob = header(1);
        blob.extend_from_slice(&[0x09, 0x04, 0x00, 0x00, 0x01, 0x03, 0x01, 0x02, 0x00]);
        blob.extend_from_slice(&[0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, 0x34, 0x00]);
        blob.extend_from_slice(&[0x07, 0x05, 0x81, 0x03, 0x08, 0x00, 0x01]);
        finish(blob)
    }

    /// Boot keyboard: interface 0, 8-byte interrupt IN on 0x81 at 10 ms and a
    /// 1-byte LED OUT endpoint on 0x02.
    pub fn boot_keyboard() -> Vec<u8> {
        let mut blob = header(1);
        blob.extend_from_slice(&[0x09, 0x04, 0x00, 0x00, 0x02, 0x03, 0x01, 0x01, 0x00]);
        blob.extend_from_slice(&[0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, 0x3F, 0x00]);
        blob.extend_from_slice(&[0x07, 0x05, 0x81, 0x03, 0x08, 0x00, 0x0A]);
        blob.extend_from_slice(&[0x07, 0x05, 0x02, 0x03, 0x01, 0x00, 0x0A]);
        finish(blob)
    }

    /// Gaming mouse without a boot interface: interface 0 is a vendor
    /// interface, interface 1 is HID with protocol 0 and a 64-byte IN
    /// endpoint on 0x82.
    pub fn report_protocol_mouse() -> Vec<u8> {
        let mut blob = header(2);
        blob.extend_from_slice(&[0x09, 0x04, 0x00, 0x00, 0x01, 0xFF, 0x00, 0x00, 0x00]);
        blob.extend_from_slice(&[0x07, 0x05, 0x81, 0x02, 0x40, 0x00, 0x00]);
        blob.extend_from_slice(&[0x09, 0x04, 0x01, 0x00, 0x01, 0x03, 0x00, 0x00, 0x00]);
        blob.extend_from_slice(&[0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, 0x9A, 0x00]);
        blob.extend_from_slice(&[0x07, 0x05, 0x82, 0x03, 0x40, 0x00, 0x01]);
        finish(blob)
    }

    /// Composite keyboard + mouse: boot keyboard on interface 0, boot mouse
    /// on interface 1, each with its own HID descriptor.
    pub fn composite_keyboard_mouse() -> Vec<u8> {
        let mut blob = header(2);
        blob.extend_from_slice(&[0x09, 0x04, 0x00, 0x00, 0x01, 0x03, 0x01, 0x01, 0x00]);
        blob.extend_from_slice(&[0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, 0x3F, 0x00]);
        blob.extend_from_slice(&[0x07, 0x05, 0x81, 0x03, 0x08, 0x00, 0x0A]);
        blob.extend_from_slice(&[0x09, 0x04, 0x01, 0x00, 0x01, 0x03, 0x01, 0x02, 0x00]);
        blob.extend_from_slice(&[0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, 0x34, 0x00]);
        blob.extend_from_slice(&[0x07, 0x05, 0x82, 0x03, 0x08, 0x00, 0x02]);
        finish(blob)
    }
}
