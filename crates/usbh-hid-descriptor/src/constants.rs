//! USB 2.0 and HID 1.11 numeric constants used by the host driver.

/// Direction bit of `bEndpointAddress`; set for IN endpoints.
pub const ENDPOINT_DIR_IN: u8 = 0x80;

/// `bDescriptorType` values.
pub mod descriptor_type {
    /// Device descriptor
    pub const DEVICE: u8 = 0x01;
    /// Configuration descriptor
    pub const CONFIGURATION: u8 = 0x02;
    /// String descriptor
    pub const STRING: u8 = 0x03;
    /// Interface descriptor
    pub const INTERFACE: u8 = 0x04;
    /// Endpoint descriptor
    pub const ENDPOINT: u8 = 0x05;
    /// HID class descriptor
    pub const HID: u8 = 0x21;
    /// HID report descriptor
    pub const HID_REPORT: u8 = 0x22;
    /// HID physical descriptor
    pub const HID_PHYSICAL: u8 = 0x23;
}

/// Fixed descriptor lengths in bytes.
pub mod descriptor_len {
    /// Configuration descriptor header
    pub const CONFIGURATION: usize = 9;
    /// Interface descriptor
    pub const INTERFACE: usize = 9;
    /// Endpoint descriptor
    pub const ENDPOINT: usize = 7;
    /// HID descriptor with a single class descriptor entry
    pub const HID: usize = 9;
    /// Setup packet
    pub const SETUP: usize = 8;
}

/// `bInterfaceClass` values.
pub mod class_code {
    /// Human Interface Device class
    pub const HID: u8 = 0x03;
}

/// HID `bInterfaceSubClass` values.
pub mod hid_subclass {
    /// No subclass
    pub const NONE: u8 = 0x00;
    /// Boot interface subclass
    pub const BOOT: u8 = 0x01;
}

/// HID `bInterfaceProtocol` values (meaningful only for the boot subclass).
pub mod hid_protocol {
    /// No boot protocol
    pub const NONE: u8 = 0x00;
    /// Boot keyboard
    pub const KEYBOARD: u8 = 0x01;
    /// Boot mouse
    pub const MOUSE: u8 = 0x02;
}

/// HID class-specific `bRequest` values.
pub mod hid_request {
    /// GET_REPORT
    pub const GET_REPORT: u8 = 0x01;
    /// GET_IDLE
    pub const GET_IDLE: u8 = 0x02;
    /// GET_PROTOCOL
    pub const GET_PROTOCOL: u8 = 0x03;
    /// SET_REPORT
    pub const SET_REPORT: u8 = 0x09;
    /// SET_IDLE
    pub const SET_IDLE: u8 = 0x0A;
    /// SET_PROTOCOL
    pub const SET_PROTOCOL: u8 = 0x0B;
}

/// Standard `bRequest` values used by the HID driver.
pub mod standard_request {
    /// CLEAR_FEATURE
    pub const CLEAR_FEATURE: u8 = 0x01;
    /// GET_DESCRIPTOR
    pub const GET_DESCRIPTOR: u8 = 0x06;
}

/// Feature selectors for CLEAR_FEATURE.
pub mod feature_selector {
    /// ENDPOINT_HALT
    pub const ENDPOINT_HALT: u16 = 0x0000;
}
