//! Control transfer setup packets for the HID class and the standard requests
//! the host driver issues.

use serde::{Deserialize, Serialize};

use crate::constants::{
    descriptor_len, descriptor_type, feature_selector, hid_request, standard_request,
};

/// `bmRequestType` bit fields.
pub mod request_type {
    /// Device-to-host data stage
    pub const DIR_IN: u8 = 0x80;
    /// Host-to-device data stage (or none)
    pub const DIR_OUT: u8 = 0x00;
    /// Standard request
    pub const TYPE_STANDARD: u8 = 0x00;
    /// Class request
    pub const TYPE_CLASS: u8 = 0x20;
    /// Vendor request
    pub const TYPE_VENDOR: u8 = 0x40;
    /// Recipient: device
    pub const RECIPIENT_DEVICE: u8 = 0x00;
    /// Recipient: interface
    pub const RECIPIENT_INTERFACE: u8 = 0x01;
    /// Recipient: endpoint
    pub const RECIPIENT_ENDPOINT: u8 = 0x02;
}

/// HID protocol selected with SET_PROTOCOL (`wValue`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum HidProtocol {
    /// Boot protocol, fixed report layouts
    #[default]
    Boot = 0,
    /// Report protocol, layout given by the report descriptor
    Report = 1,
}

impl HidProtocol {
    /// `wValue` encoding.
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Boot => 0,
            Self::Report => 1,
        }
    }
}

/// Report type carried in the high byte of `wValue` for GET/SET_REPORT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    /// Input report
    Input = 1,
    /// Output report
    Output = 2,
    /// Feature report
    Feature = 3,
}

impl ReportType {
    fn code(self) -> u16 {
        match self {
            Self::Input => 1,
            Self::Output => 2,
            Self::Feature => 3,
        }
    }
}

/// An 8-byte USB setup packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct SetupPacket {
    /// `bmRequestType`
    pub request_type: u8,
    /// `bRequest`
    pub request: u8,
    /// `wValue`
    pub value: u16,
    /// `wIndex`
    pub index: u16,
    /// `wLength`
    pub length: u16,
}

const CLASS_IN: u8 =
    request_type::DIR_IN | request_type::TYPE_CLASS | request_type::RECIPIENT_INTERFACE;
const CLASS_OUT: u8 =
    request_type::DIR_OUT | request_type::TYPE_CLASS | request_type::RECIPIENT_INTERFACE;
const STANDARD_INTERFACE_IN: u8 =
    request_type::DIR_IN | request_type::TYPE_STANDARD | request_type::RECIPIENT_INTERFACE;

impl SetupPacket {
    /// Build a setup packet from its fields.
    pub const fn new(request_type: u8, request: u8, value: u16, index: u16, length: u16) -> Self {
        Self {
            request_type,
            request,
            value,
            index,
            length,
        }
    }

    /// Wire encoding, little-endian.
    pub fn to_bytes(&self) -> [u8; descriptor_len::SETUP] {
        let [value_lo, value_hi] = self.value.to_le_bytes();
        let [index_lo, index_hi] = self.index.to_le_bytes();
        let [length_lo, length_hi] = self.length.to_le_bytes();
        [
            self.request_type,
            self.request,
            value_lo,
            value_hi,
            index_lo,
            index_hi,
            length_lo,
            length_hi,
        ]
    }

    /// Decode the wire encoding.
    pub fn from_bytes(bytes: [u8; descriptor_len::SETUP]) -> Self {
        let [request_type, request, v0, v1, i0, i1, l0, l1] = bytes;
        Self {
            request_type,
            request,
            value: u16::from_le_bytes([v0, v1]),
            index: u16::from_le_bytes([i0, i1]),
            length: u16::from_le_bytes([l0, l1]),
        }
    }

    /// `true` when the data stage flows device to host.
    pub fn is_device_to_host(&self) -> bool {
        self.request_type & request_type::DIR_IN != 0
    }

    /// GET_REPORT for `report_id` of `report_type`.
    pub fn get_report(report_type: ReportType, report_id: u8, interface: u8, length: u16) -> Self {
        Self::new(
            CLASS_IN,
            hid_request::GET_REPORT,
            (report_type.code() << 8) | u16::from(report_id),
            u16::from(interface),
            length,
        )
    }

    /// SET_REPORT for `report_id` of `report_type`.
    pub fn set_report(report_type: ReportType, report_id: u8, interface: u8, length: u16) -> Self {
        Self::new(
            CLASS_OUT,
            hid_request::SET_REPORT,
            (report_type.code() << 8) | u16::from(report_id),
            u16::from(interface),
            length,
        )
    }

    /// SET_IDLE. `duration` is in 4 ms units, 0 means report only on change.
    pub fn set_idle(duration: u8, report_id: u8, interface: u8) -> Self {
        Self::new(
            CLASS_OUT,
            hid_request::SET_IDLE,
            (u16::from(duration) << 8) | u16::from(report_id),
            u16::from(interface),
            0,
        )
    }

    /// SET_PROTOCOL.
    pub fn set_protocol(protocol: HidProtocol, interface: u8) -> Self {
        Self::new(
            CLASS_OUT,
            hid_request::SET_PROTOCOL,
            protocol.as_u16(),
            u16::from(interface),
            0,
        )
    }

    /// GET_DESCRIPTOR(HID) addressed to an interface.
    pub fn get_hid_descriptor(interface: u8, length: u16) -> Self {
        Self::new(
            STANDARD_INTERFACE_IN,
            standard_request::GET_DESCRIPTOR,
            u16::from(descriptor_type::HID) << 8,
            u16::from(interface),
            length,
        )
    }

    /// GET_DESCRIPTOR(REPORT) addressed to an interface.
    pub fn get_report_descriptor(interface: u8, length: u16) -> Self {
        Self::new(
            STANDARD_INTERFACE_IN,
            standard_request::GET_DESCRIPTOR,
            u16::from(descriptor_type::HID_REPORT) << 8,
            u16::from(interface),
            length,
        )
    }

    /// CLEAR_FEATURE(ENDPOINT_HALT) for `endpoint_address`.
    pub fn clear_endpoint_halt(endpoint_address: u8) -> Self {
        Self::new(
            request_type::DIR_OUT | request_type::TYPE_STANDARD | request_type::RECIPIENT_ENDPOINT,
            standard_request::CLEAR_FEATURE,
            feature_selector::ENDPOINT_HALT,
            u16::from(endpoint_address),
            0,
        )
    }
}
