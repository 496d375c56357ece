//! Class request sequencer.
//!
//! Runs once per bind, one step per call:
//!
//! ```text
//! Init -> GetReportDesc -> SetIdle -> SetProtocol -> Done
//!              |                           |
//!              +--------> Failed <---------+
//! ```
//!
//! `Busy` and transport failures leave the state unchanged so the same
//! request is reissued on the next step. A stalled GET_DESCRIPTOR(report) or
//! SET_PROTOCOL latches `Failed`; a stalled SET_IDLE is tolerated.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use usbh_hid_descriptor::{HidDescriptorLookup, HidProtocol, SetupPacket, find_hid_descriptor};

use crate::class::Progress;
use crate::error::{HidClassError, HidClassResult};
use crate::handle::ClassHandle;
use crate::host::{ControlStatus, HostEvent, ReportSink, UsbHost};

/// Control sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum RequestState {
    /// Parse the HID descriptor from the cached configuration
    #[default]
    Init,
    /// Fetch the report descriptor
    GetReportDesc,
    /// SET_IDLE(0, 0)
    SetIdle,
    /// SET_PROTOCOL
    SetProtocol,
    /// All requests done
    Done,
    /// A required request was rejected
    Failed,
}

/// Sequencer state plus the error that ended it, if any.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    state: RequestState,
    failure: Option<HidClassError>,
}

impl Sequencer {
    /// Fresh sequencer in [`RequestState::Init`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// The error that latched [`RequestState::Failed`].
    pub fn failure(&self) -> Option<&HidClassError> {
        self.failure.as_ref()
    }

    fn fail(&mut self, err: HidClassError) -> HidClassResult<Progress> {
        error!("HID class request failed: {}", err);
        self.state = RequestState::Failed;
        self.failure = Some(err.clone());
        Err(err)
    }
}

/// Run one sequencer step.
pub(crate) fn step(
    handle: &mut ClassHandle,
    host: &mut dyn UsbHost,
    sink: &mut dyn ReportSink,
    protocol: HidProtocol,
) -> HidClassResult<Progress> {
    match handle.sequencer.state {
        RequestState::Init => {
            let lookup = find_hid_descriptor(host.raw_configuration(), handle.interface_number);
            match lookup {
                HidDescriptorLookup::Found { descriptor, .. } => debug!(
                    "HID descriptor for interface {}: bcdHID {:#06x}, report descriptor {} bytes",
                    handle.interface_number, descriptor.bcd_hid, descriptor.report_descriptor_length
                ),
                HidDescriptorLookup::NotFound => warn!(
                    "No HID descriptor for interface {}; report descriptor length is 0",
                    handle.interface_number
                ),
            }
            handle.hid_lookup = lookup;
            handle.hid_descriptor = lookup.descriptor_or_default();
            handle.sequencer.state = RequestState::GetReportDesc;
            Ok(Progress::Pending)
        }

        RequestState::GetReportDesc => {
            let length = handle.hid_descriptor.report_descriptor_length;
            handle.report_descriptor.resize(usize::from(length), 0);
            let setup = SetupPacket::get_report_descriptor(handle.interface_number, length);
            match host.control_request(&setup, &mut handle.report_descriptor) {
                ControlStatus::Ok => {
                    sink.report_descriptor(&handle.report_descriptor);
                    handle.sequencer.state = RequestState::SetIdle;
                }
                ControlStatus::NotSupported => {
                    return handle
                        .sequencer
                        .fail(HidClassError::ReportDescriptorNotSupported);
                }
                ControlStatus::Busy | ControlStatus::Failed => {}
            }
            Ok(Progress::Pending)
        }

        RequestState::SetIdle => {
            let setup = SetupPacket::set_idle(0, 0, handle.interface_number);
            match host.control_request(&setup, &mut []) {
                ControlStatus::Ok => handle.sequencer.state = RequestState::SetProtocol,
                ControlStatus::NotSupported => {
                    debug!("SET_IDLE not supported by device; continuing");
                    handle.sequencer.state = RequestState::SetProtocol;
                }
                ControlStatus::Busy | ControlStatus::Failed => {}
            }
            Ok(Progress::Pending)
        }

        RequestState::SetProtocol => {
            let setup = SetupPacket::set_protocol(protocol, handle.interface_number);
            match host.control_request(&setup, &mut []) {
                ControlStatus::Ok => {
                    handle.sequencer.state = RequestState::Done;
                    info!(
                        "HID interface {} active ({}, {:?} protocol)",
                        handle.interface_number,
                        handle.device_type(),
                        protocol
                    );
                    host.user_event(HostEvent::ClassActive);
                    Ok(Progress::Done)
                }
                ControlStatus::NotSupported => {
                    handle.sequencer.fail(HidClassError::SetProtocolNotSupported)
                }
                ControlStatus::Busy | ControlStatus::Failed => Ok(Progress::Pending),
            }
        }

        RequestState::Done => Ok(Progress::Done),

        RequestState::Failed => match handle.sequencer.failure.clone() {
            Some(err) => Err(err),
            None => Ok(Progress::Done),
        },
    }
}
