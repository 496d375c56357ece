//! Fuzzes the HID descriptor scan over arbitrary configuration blobs.
//!
//! Exercises `find_hid_descriptor` with the wildcard filter and with an
//! interface number taken from the input, plus the strict
//! `HidDescriptor::from_bytes` parser. None of these may panic.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_hid_descriptor

#![no_main]

use libfuzzer_sys::fuzz_target;
use usbh_hid_descriptor::{
    HidDescriptor, HidDescriptorLookup, InterfaceFilter, find_hid_descriptor,
    parse_hid_descriptor,
};

fuzz_target!(|data: &[u8]| {
    let any = find_hid_descriptor(data, InterfaceFilter::Any);
    let number = data.get(4).copied().unwrap_or(0);
    let matched = find_hid_descriptor(data, number);

    // A hit for a specific interface implies the wildcard scan hits too.
    if matched.is_found() {
        assert!(any.is_found());
    }
    if let HidDescriptorLookup::Found { interface, .. } = matched {
        assert_eq!(interface, Some(number));
    }
    if !any.is_found() {
        assert_eq!(parse_hid_descriptor(data, InterfaceFilter::Any), HidDescriptor::default());
    }

    if let Ok(hid) = HidDescriptor::from_bytes(data) {
        assert_eq!(hid.descriptor_type, 0x21);
    }
});
