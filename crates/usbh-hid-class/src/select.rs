//! Interface selection.

use tracing::debug;
use usbh_hid_descriptor::{class_code, hid_subclass};

use crate::config::{DeviceMode, InterfaceSelection};
use crate::error::{HidClassError, HidClassResult};
use crate::host::UsbHost;

/// Pick the interface index to bind.
///
/// `Auto` looks for the boot interface of `mode` first and falls back to any
/// HID-class interface. `Explicit(n)` takes `n` as given. Either way the
/// result must be below `max_interfaces` and name an interface of the active
/// configuration.
///
/// # Errors
///
/// [`HidClassError::InterfaceNotFound`] when `Auto` finds nothing,
/// [`HidClassError::InterfaceOutOfRange`] for an index at or beyond
/// `max_interfaces` and [`HidClassError::InterfaceMissing`] for an explicit
/// index the configuration does not have.
pub fn select_interface(
    host: &dyn UsbHost,
    selection: InterfaceSelection,
    mode: DeviceMode,
    max_interfaces: u8,
) -> HidClassResult<u8> {
    let index = match selection {
        InterfaceSelection::Auto => host
            .find_interface(
                class_code::HID,
                Some(hid_subclass::BOOT),
                Some(mode.boot_protocol()),
            )
            .or_else(|| {
                debug!("No {} boot interface, broadening search to any HID interface", mode);
                host.find_interface(class_code::HID, None, None)
            })
            .ok_or(HidClassError::InterfaceNotFound { mode })?,
        InterfaceSelection::Explicit(index) => index,
    };

    if index >= max_interfaces {
        return Err(HidClassError::InterfaceOutOfRange {
            index,
            max: max_interfaces,
        });
    }

    if host.interface(index).is_none() {
        return Err(HidClassError::InterfaceMissing { index });
    }

    Ok(index)
}
