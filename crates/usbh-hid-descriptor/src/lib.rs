//! USB HID host-side descriptor parsing and class request encoding.
//!
//! This crate is I/O-free. It walks raw configuration descriptor blobs as
//! returned by GET_DESCRIPTOR(CONFIGURATION), extracts interface, endpoint and
//! HID class descriptors, and builds the 8-byte setup packets for the HID
//! class requests the host driver issues.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod constants;
pub mod error;
pub mod hid;
pub mod reader;
pub mod setup;

pub use config::{
    Configuration, ConfigurationHeader, DescriptorIter, EndpointDescriptor, Interface,
    InterfaceDescriptor, RawDescriptor, TransferType,
};
pub use constants::{
    ENDPOINT_DIR_IN, class_code, descriptor_len, descriptor_type, feature_selector, hid_protocol,
    hid_request, hid_subclass, standard_request,
};
pub use error::{DescriptorError, DescriptorResult};
pub use hid::{
    HidDescriptor, HidDescriptorLookup, InterfaceFilter, find_hid_descriptor,
    parse_hid_descriptor,
};
pub use reader::ByteReader;
pub use setup::{HidProtocol, ReportType, SetupPacket, request_type};
