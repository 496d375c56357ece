//! Driver configuration.
//!
//! Platform limits and policy knobs for the HID class driver. The translation
//! layer may override interface selection and device mode per device through
//! [`crate::ReportSink`]; the values here are the fallback.

use std::fmt;

use serde::{Deserialize, Serialize};
use usbh_hid_descriptor::{HidProtocol, hid_protocol};

use crate::error::{HidClassError, HidClassResult};

/// Environment variable selecting the interface (`auto` or an index).
pub const INTERFACE_ENV: &str = "USBH_HID_INTERFACE";
/// Environment variable selecting the device mode (`mouse` or `keyboard`).
pub const MODE_ENV: &str = "USBH_HID_MODE";
/// Environment variable overriding the minimum poll interval in ms.
pub const MIN_POLL_ENV: &str = "USBH_HID_MIN_POLL";

/// Default minimum interrupt poll interval in ms.
pub const DEFAULT_MIN_POLL_INTERVAL_MS: u8 = 10;
/// Default platform interface limit.
pub const DEFAULT_MAX_INTERFACES: u8 = 10;
/// Default platform endpoint limit per interface.
pub const DEFAULT_MAX_ENDPOINTS: u8 = 2;
/// Default ceiling for one interrupt-IN payload.
pub const DEFAULT_MAX_REPORT_SIZE: u16 = 64;
/// Default number of report records the ring buffer holds.
pub const DEFAULT_FIFO_REPORTS: u16 = 10;
/// Largest ring buffer, in bytes, a configuration may ask for.
pub const MAX_FIFO_CAPACITY: usize = 64 * 1024;

/// How the interface to bind is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceSelection {
    /// Prefer the boot interface for the device mode, then any HID interface
    #[default]
    Auto,
    /// Bind the interface at this index
    Explicit(u8),
}

/// Which kind of boot device the translation layer expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceMode {
    /// Mouse
    #[default]
    Mouse,
    /// Keyboard
    Keyboard,
}

impl DeviceMode {
    /// `bInterfaceProtocol` of the matching boot interface.
    pub fn boot_protocol(self) -> u8 {
        match self {
            Self::Mouse => hid_protocol::MOUSE,
            Self::Keyboard => hid_protocol::KEYBOARD,
        }
    }
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mouse => write!(f, "mouse"),
            Self::Keyboard => write!(f, "keyboard"),
        }
    }
}

/// HID class driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HidClassConfig {
    /// Interface selection used when the sink has no preference
    pub interface_selection: InterfaceSelection,
    /// Device mode used when the sink has no preference
    pub device_mode: DeviceMode,
    /// Protocol requested with SET_PROTOCOL
    pub protocol: HidProtocol,
    /// Lower bound for the endpoint poll interval, in ms
    pub min_poll_interval_ms: u8,
    /// Highest interface count the host supports
    pub max_interfaces: u8,
    /// Highest endpoint count per interface the host supports
    pub max_endpoints: u8,
    /// Ceiling for one interrupt-IN payload, in bytes
    pub max_report_size: u16,
    /// Ring buffer size, in reports of `max_report_size`
    pub fifo_reports: u16,
    /// Fetch one input report with GET_REPORT before polling starts
    pub fetch_initial_report: bool,
}

impl Default for HidClassConfig {
    fn default() -> Self {
        Self {
            interface_selection: InterfaceSelection::Auto,
            device_mode: DeviceMode::Mouse,
            protocol: HidProtocol::Boot,
            min_poll_interval_ms: DEFAULT_MIN_POLL_INTERVAL_MS,
            max_interfaces: DEFAULT_MAX_INTERFACES,
            max_endpoints: DEFAULT_MAX_ENDPOINTS,
            max_report_size: DEFAULT_MAX_REPORT_SIZE,
            fifo_reports: DEFAULT_FIFO_REPORTS,
            fetch_initial_report: false,
        }
    }
}

impl HidClassConfig {
    /// Defaults overlaid with the `USBH_HID_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Overlay values from a key lookup. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(selection) = lookup(INTERFACE_ENV).and_then(|v| parse_interface_selection(&v))
        {
            self.interface_selection = selection;
        }
        if let Some(mode) = lookup(MODE_ENV).and_then(|v| parse_device_mode(&v)) {
            self.device_mode = mode;
        }
        if let Some(min_poll) = lookup(MIN_POLL_ENV).and_then(|v| v.trim().parse::<u8>().ok()) {
            self.min_poll_interval_ms = min_poll;
        }
    }

    /// Check limits and the derived ring buffer size.
    ///
    /// # Errors
    ///
    /// Returns [`HidClassError::InvalidConfig`] for zero limits, an explicit
    /// interface beyond `max_interfaces`, or a ring buffer larger than
    /// [`MAX_FIFO_CAPACITY`].
    pub fn validate(&self) -> HidClassResult<()> {
        if self.max_interfaces == 0 {
            return Err(HidClassError::invalid_config("max_interfaces", "must be non-zero"));
        }
        if self.max_endpoints == 0 {
            return Err(HidClassError::invalid_config("max_endpoints", "must be non-zero"));
        }
        if self.max_report_size == 0 {
            return Err(HidClassError::invalid_config("max_report_size", "must be non-zero"));
        }
        if self.fifo_reports == 0 {
            return Err(HidClassError::invalid_config("fifo_reports", "must be non-zero"));
        }
        if let InterfaceSelection::Explicit(index) = self.interface_selection {
            if index >= self.max_interfaces {
                return Err(HidClassError::invalid_config(
                    "interface_selection",
                    format!("index {index} >= max_interfaces {}", self.max_interfaces),
                ));
            }
        }
        match self.fifo_capacity() {
            Some(capacity) if capacity <= MAX_FIFO_CAPACITY => Ok(()),
            _ => Err(HidClassError::invalid_config(
                "fifo_reports",
                format!(
                    "{} reports of {} bytes exceed the {MAX_FIFO_CAPACITY} byte ring buffer limit",
                    self.fifo_reports, self.max_report_size
                ),
            )),
        }
    }

    /// Ring buffer capacity in slots: `fifo_reports` full records plus the
    /// reserved slot.
    pub fn fifo_capacity(&self) -> Option<usize> {
        usize::from(self.fifo_reports)
            .checked_mul(usize::from(self.max_report_size))?
            .checked_add(1)
    }
}

/// Parse `auto`, `0`..`255` or `interfaceN`.
pub fn parse_interface_selection(value: &str) -> Option<InterfaceSelection> {
    let value = value.trim().to_ascii_lowercase();
    if value == "auto" {
        return Some(InterfaceSelection::Auto);
    }
    let digits = value.strip_prefix("interface").unwrap_or(&value);
    digits.parse::<u8>().ok().map(InterfaceSelection::Explicit)
}

/// Parse `mouse`/`m` or `keyboard`/`key`/`kbd`.
pub fn parse_device_mode(value: &str) -> Option<DeviceMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "mouse" | "m" => Some(DeviceMode::Mouse),
        "keyboard" | "key" | "kbd" | "k" => Some(DeviceMode::Keyboard),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_validate() -> HidClassResult<()> {
        let config = HidClassConfig::default();
        config.validate()?;
        assert_eq!(config.fifo_capacity(), Some(641));
        assert_eq!(config.protocol, HidProtocol::Boot);
        Ok(())
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = HidClassConfig::default();
        config.apply_overrides(lookup(&[
            (INTERFACE_ENV, "interface2"),
            (MODE_ENV, " Keyboard "),
            (MIN_POLL_ENV, "4"),
        ]));

        assert_eq!(config.interface_selection, InterfaceSelection::Explicit(2));
        assert_eq!(config.device_mode, DeviceMode::Keyboard);
        assert_eq!(config.min_poll_interval_ms, 4);
    }

    #[test]
    fn test_bad_overrides_ignored() {
        let mut config = HidClassConfig::default();
        config.apply_overrides(lookup(&[
            (INTERFACE_ENV, "sideways"),
            (MODE_ENV, "joystick"),
            (MIN_POLL_ENV, "-1"),
        ]));
        assert_eq!(config, HidClassConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = HidClassConfig {
            max_endpoints: 0,
            ..HidClassConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HidClassError::InvalidConfig {
                field: "max_endpoints",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_explicit_out_of_range() {
        let config = HidClassConfig {
            interface_selection: InterfaceSelection::Explicit(10),
            ..HidClassConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_fifo() {
        let config = HidClassConfig {
            max_report_size: u16::MAX,
            fifo_reports: u16::MAX,
            ..HidClassConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HidClassError::InvalidConfig {
                field: "fifo_reports",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_fifo_limit_is_inclusive() -> HidClassResult<()> {
        // 1023 * 64 + 1 fits, 1024 * 64 + 1 does not
        let at_limit = HidClassConfig {
            fifo_reports: 1023,
            ..HidClassConfig::default()
        };
        at_limit.validate()?;
        assert!(at_limit.fifo_capacity() <= Some(MAX_FIFO_CAPACITY));

        let over = HidClassConfig {
            fifo_reports: 1024,
            ..HidClassConfig::default()
        };
        assert!(over.validate().is_err());
        Ok(())
    }

    #[test]
    fn test_boot_protocol_codes() {
        assert_eq!(DeviceMode::Mouse.boot_protocol(), 0x02);
        assert_eq!(DeviceMode::Keyboard.boot_protocol(), 0x01);
    }
}
