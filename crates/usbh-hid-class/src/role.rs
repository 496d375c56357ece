//! Role-specific initialization for boot mice and keyboards.
//!
//! The role is chosen once at bind time from `bInterfaceProtocol` and stored
//! in the handle as a `&'static dyn RoleInitializer`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use usbh_hid_descriptor::hid_protocol;
use usbh_hid_fifo::ReportFifo;

use crate::error::{HidClassError, HidClassResult};

/// The report role a bound interface is driven as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HidRole {
    /// Boot mouse, or any interface with an unrecognized protocol
    Mouse,
    /// Boot keyboard
    Keyboard,
}

impl HidRole {
    /// Role for an interface protocol code. Unrecognized codes map to
    /// [`HidRole::Mouse`].
    pub fn from_protocol(protocol: u8) -> Self {
        match protocol {
            hid_protocol::KEYBOARD => Self::Keyboard,
            _ => Self::Mouse,
        }
    }

    /// The initializer for this role.
    pub fn initializer(self) -> &'static dyn RoleInitializer {
        match self {
            Self::Mouse => &MouseRole,
            Self::Keyboard => &KeyboardRole,
        }
    }
}

impl fmt::Display for HidRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mouse => write!(f, "mouse"),
            Self::Keyboard => write!(f, "keyboard"),
        }
    }
}

/// Per-role setup run by the pump's `Init` state.
pub trait RoleInitializer: Send + Sync + fmt::Debug {
    /// The role implemented.
    fn role(&self) -> HidRole;

    /// Prepare for polling and return the interrupt-IN transfer length.
    ///
    /// # Errors
    ///
    /// [`HidClassError::RoleInitFailed`] when the endpoint cannot carry a
    /// report.
    fn init(&self, max_packet_size: u16, report_ceiling: u16, fifo: &ReportFifo)
    -> HidClassResult<usize>;
}

fn prepare(
    role: HidRole,
    max_packet_size: u16,
    report_ceiling: u16,
    fifo: &ReportFifo,
) -> HidClassResult<usize> {
    if max_packet_size == 0 {
        return Err(HidClassError::RoleInitFailed {
            role,
            reason: "endpoint max packet size is zero",
        });
    }
    let length = usize::from(max_packet_size.min(report_ceiling));
    if length > fifo.max_len() {
        return Err(HidClassError::RoleInitFailed {
            role,
            reason: "report buffer smaller than one report",
        });
    }
    if !fifo.reset() {
        debug!("Report buffer busy during {} init; keeping contents", role);
    }
    Ok(length)
}

/// Boot mouse initializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseRole;

impl RoleInitializer for MouseRole {
    fn role(&self) -> HidRole {
        HidRole::Mouse
    }

    fn init(
        &self,
        max_packet_size: u16,
        report_ceiling: u16,
        fifo: &ReportFifo,
    ) -> HidClassResult<usize> {
        prepare(HidRole::Mouse, max_packet_size, report_ceiling, fifo)
    }
}

/// Boot keyboard initializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardRole;

impl RoleInitializer for KeyboardRole {
    fn role(&self) -> HidRole {
        HidRole::Keyboard
    }

    fn init(
        &self,
        max_packet_size: u16,
        report_ceiling: u16,
        fifo: &ReportFifo,
    ) -> HidClassResult<usize> {
        prepare(HidRole::Keyboard, max_packet_size, report_ceiling, fifo)
    }
}
