//! Host class registration: the `HostClass` trait the host core dispatches
//! through, and the HID implementation of it.

use std::sync::Arc;

use tracing::{debug, info};
use usbh_hid_descriptor::class_code;
use usbh_hid_fifo::ReportFifo;

use crate::bind::{bind_endpoints, release_pipe};
use crate::config::HidClassConfig;
use crate::error::{HidClassError, HidClassResult};
use crate::handle::{ClassHandle, HandleParts};
use crate::host::{ReportSink, UsbHost};
use crate::poll::clamp_poll_interval;
use crate::role::HidRole;
use crate::select::select_interface;
use crate::{pump, sequencer};

/// Outcome of a successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Progress {
    /// Nothing left to do in this phase
    Done,
    /// Call again
    Pending,
}

impl Progress {
    /// `true` for [`Progress::Done`].
    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// A USB host class driver as seen by the host core.
///
/// The host core calls `init` once the device is configured, then
/// `class_request` until it reports [`Progress::Done`], then `process` on
/// every scheduler wake and `sof_process` on every frame tick. `deinit` runs on
/// detach.
pub trait HostClass {
    /// Per-interface state created by `init`.
    type Handle;
    /// Error type of every step.
    type Error: std::error::Error;

    /// Human readable class name.
    fn name(&self) -> &'static str;

    /// `bInterfaceClass` this driver binds to.
    fn class_code(&self) -> u8;

    /// Bind to the device and allocate its pipes.
    fn init(
        &self,
        host: &mut dyn UsbHost,
        sink: &mut dyn ReportSink,
    ) -> Result<Self::Handle, Self::Error>;

    /// Release everything `init` acquired.
    fn deinit(&self, host: &mut dyn UsbHost, handle: Self::Handle) -> Result<(), Self::Error>;

    /// One step of class-specific control requests.
    fn class_request(
        &self,
        host: &mut dyn UsbHost,
        sink: &mut dyn ReportSink,
        handle: &mut Self::Handle,
    ) -> Result<Progress, Self::Error>;

    /// One step of the data phase.
    fn process(
        &self,
        host: &mut dyn UsbHost,
        sink: &mut dyn ReportSink,
        handle: &mut Self::Handle,
    ) -> Result<Progress, Self::Error>;

    /// Frame tick.
    fn sof_process(
        &self,
        host: &mut dyn UsbHost,
        handle: &mut Self::Handle,
    ) -> Result<Progress, Self::Error>;
}

/// The HID class driver.
#[derive(Debug, Clone, Default)]
pub struct HidClass {
    config: HidClassConfig,
}

impl HidClass {
    /// Class name reported to the host core.
    pub const NAME: &'static str = "HID";

    /// Create a driver with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HidClassError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: HidClassConfig) -> HidClassResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &HidClassConfig {
        &self.config
    }
}

impl HostClass for HidClass {
    type Handle = ClassHandle;
    type Error = HidClassError;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn class_code(&self) -> u8 {
        class_code::HID
    }

    fn init(
        &self,
        host: &mut dyn UsbHost,
        sink: &mut dyn ReportSink,
    ) -> HidClassResult<ClassHandle> {
        let selection = sink
            .interface_selection()
            .unwrap_or(self.config.interface_selection);
        let mode = sink.device_mode().unwrap_or(self.config.device_mode);

        let index = select_interface(&*host, selection, mode, self.config.max_interfaces)?;
        host.select_interface(index)
            .map_err(|source| HidClassError::SelectInterface { index, source })?;

        let interface = host
            .interface(index)
            .cloned()
            .ok_or(HidClassError::InterfaceMissing { index })?;
        sink.interface_found(index, &interface.descriptor);

        let protocol = interface.descriptor.interface_protocol;
        let role = HidRole::from_protocol(protocol);
        info!(
            "HID interface {} (number {}, protocol {}) bound as {}",
            index, interface.descriptor.interface_number, protocol, role
        );

        let endpoints = bind_endpoints(host, index, &interface, self.config.max_endpoints)?;
        let poll_interval = clamp_poll_interval(
            endpoints.in_endpoint.interval,
            self.config.min_poll_interval_ms,
        );
        debug!(
            "Poll interval {} ms (advertised {})",
            poll_interval, endpoints.in_endpoint.interval
        );

        let capacity = self
            .config
            .fifo_capacity()
            .ok_or_else(|| HidClassError::invalid_config("fifo_reports", "ring buffer size overflows"));
        let fifo = match capacity.and_then(|c| ReportFifo::with_capacity(c).map_err(Into::into)) {
            Ok(fifo) => Arc::new(fifo),
            Err(e) => {
                for bound in endpoints.iter() {
                    release_pipe(host, bound.pipe);
                }
                return Err(e);
            }
        };

        Ok(ClassHandle::new(HandleParts {
            interface_index: index,
            interface_number: interface.descriptor.interface_number,
            interface_protocol: protocol,
            endpoints,
            report_ceiling: self.config.max_report_size,
            poll_interval,
            fifo,
        }))
    }

    fn deinit(&self, host: &mut dyn UsbHost, handle: ClassHandle) -> HidClassResult<()> {
        for bound in handle.endpoints.iter() {
            release_pipe(host, bound.pipe);
        }
        debug!("HID interface {} released", handle.interface_index);
        Ok(())
    }

    fn class_request(
        &self,
        host: &mut dyn UsbHost,
        sink: &mut dyn ReportSink,
        handle: &mut ClassHandle,
    ) -> HidClassResult<Progress> {
        sequencer::step(handle, host, sink, self.config.protocol)
    }

    fn process(
        &self,
        host: &mut dyn UsbHost,
        sink: &mut dyn ReportSink,
        handle: &mut ClassHandle,
    ) -> HidClassResult<Progress> {
        pump::step(handle, host, sink, self.config.fetch_initial_report)
    }

    fn sof_process(
        &self,
        host: &mut dyn UsbHost,
        _handle: &mut ClassHandle,
    ) -> HidClassResult<Progress> {
        host.signal();
        Ok(Progress::Done)
    }
}
