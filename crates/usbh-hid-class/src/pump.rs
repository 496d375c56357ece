//! Interrupt-IN data pump.
//!
//! ```text
//! Init -> Sync -> GetData <-> Poll
//!   |       ^
//!   |       +-- Idle (optional initial GET_REPORT)
//!   +-> Error
//! ```
//!
//! Every cheap retry calls [`UsbHost::signal`] so the next step runs without
//! waiting for a frame tick. While a transfer is in flight `Poll` stays quiet
//! and relies on the completion interrupt to wake the scheduler.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};
use usbh_hid_descriptor::{ReportType, SetupPacket};

use crate::class::Progress;
use crate::error::{HidClassError, HidClassResult};
use crate::handle::ClassHandle;
use crate::host::{ControlStatus, ReportSink, UrbState, UsbHost};

/// Data pump state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum PumpState {
    /// Run the role initializer
    #[default]
    Init,
    /// Fetch one input report over the control pipe
    Idle,
    /// Wait for an even frame
    Sync,
    /// Arm an interrupt-IN transfer
    GetData,
    /// Wait for the transfer to finish
    Poll,
    /// Role initialization failed
    Error,
}

/// Counters kept by the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct PumpStats {
    /// Non-empty completions handed to the ring buffer
    pub reports: u32,
    /// Bytes the ring buffer accepted
    pub bytes_queued: u32,
    /// Reports the ring buffer did not fully accept
    pub reports_truncated: u32,
    /// Completions carrying no data
    pub zero_length: u32,
    /// Stalls seen on the IN endpoint
    pub stalls: u32,
    /// NAK / not-ready completions
    pub not_ready: u32,
    /// Interrupt transfers the host refused to arm
    pub submit_failures: u32,
}

/// Run one pump step.
pub(crate) fn step(
    handle: &mut ClassHandle,
    host: &mut dyn UsbHost,
    sink: &mut dyn ReportSink,
    fetch_initial_report: bool,
) -> HidClassResult<Progress> {
    let timestamp = sink.now_us();

    match handle.pump {
        PumpState::Init => {
            let result = handle.role.init(
                handle.endpoints.in_endpoint.max_packet_size,
                handle.report_ceiling,
                &handle.fifo,
            );
            host.signal();
            match result {
                Ok(length) => {
                    handle.length = length;
                    handle.payload.clear();
                    handle.payload.resize(length, 0);
                    handle.pump = if fetch_initial_report {
                        PumpState::Idle
                    } else {
                        PumpState::Sync
                    };
                    debug!(
                        "{} role ready, transfer length {} bytes",
                        handle.device_type(),
                        length
                    );
                    Ok(Progress::Pending)
                }
                Err(e) => {
                    error!("HID class init failed: {}", e);
                    handle.pump = PumpState::Error;
                    Err(e)
                }
            }
        }

        PumpState::Idle => {
            let length = u16::try_from(handle.length).unwrap_or(u16::MAX);
            let setup =
                SetupPacket::get_report(ReportType::Input, 0, handle.interface_number, length);
            let status = host.control_request(&setup, &mut handle.payload);
            host.signal();
            match status {
                ControlStatus::Ok | ControlStatus::NotSupported => {
                    handle.pump = PumpState::Sync;
                    Ok(Progress::Pending)
                }
                ControlStatus::Busy => Ok(Progress::Pending),
                ControlStatus::Failed => {
                    error!("Initial GET_REPORT failed");
                    handle.pump = PumpState::Error;
                    Err(HidClassError::GetReportFailed)
                }
            }
        }

        PumpState::Sync => {
            if host.frame_number() & 1 == 0 {
                handle.pump = PumpState::GetData;
            }
            host.signal();
            Ok(Progress::Pending)
        }

        PumpState::GetData => {
            let pipe = handle.in_pipe();
            match host.submit_interrupt_in(pipe, handle.length) {
                Ok(()) => handle.pump = PumpState::Poll,
                Err(e) => {
                    warn!("Interrupt IN submit on pipe {:?} failed: {}", pipe, e);
                    handle.stats.submit_failures = handle.stats.submit_failures.wrapping_add(1);
                    host.signal();
                }
            }
            Ok(Progress::Pending)
        }

        PumpState::Poll => {
            let pipe = handle.in_pipe();
            match host.urb_state(pipe) {
                UrbState::Done => {
                    let received = host.transfer_data(pipe, &mut handle.payload);
                    handle.pump = PumpState::GetData;
                    if received == 0 {
                        warn!("Interrupt IN completed with 0 bytes on pipe {:?}", pipe);
                        handle.stats.zero_length = handle.stats.zero_length.wrapping_add(1);
                    } else {
                        queue_report(handle, received);
                        sink.event(timestamp);
                    }
                    host.signal();
                }
                UrbState::Stall => {
                    handle.stats.stalls = handle.stats.stalls.wrapping_add(1);
                    let endpoint = handle.endpoints.in_endpoint.address;
                    debug!("IN endpoint {:#04x} stalled", endpoint);
                    let setup = SetupPacket::clear_endpoint_halt(endpoint);
                    if host.control_request(&setup, &mut []) == ControlStatus::Ok {
                        handle.pump = PumpState::GetData;
                        host.signal();
                    }
                }
                UrbState::NotReady => {
                    handle.stats.not_ready = handle.stats.not_ready.wrapping_add(1);
                    handle.pump = PumpState::GetData;
                    host.signal();
                }
                UrbState::Idle | UrbState::Error => {}
            }
            Ok(Progress::Pending)
        }

        PumpState::Error => Ok(Progress::Done),
    }
}

/// Push the payload into the ring buffer as one fixed-size record.
///
/// Bytes past `received` are zeroed so short packets never leak stale data.
fn queue_report(handle: &mut ClassHandle, received: usize) {
    if let Some(tail) = handle.payload.get_mut(received..) {
        tail.fill(0);
    }
    let written = handle.fifo.write(&handle.payload);
    let stats = &mut handle.stats;
    stats.reports = stats.reports.wrapping_add(1);
    stats.bytes_queued = stats
        .bytes_queued
        .wrapping_add(u32::try_from(written).unwrap_or(u32::MAX));
    if written < handle.payload.len() {
        stats.reports_truncated = stats.reports_truncated.wrapping_add(1);
        trace!(
            "Report truncated: {} of {} bytes queued",
            written,
            handle.payload.len()
        );
    }
}
