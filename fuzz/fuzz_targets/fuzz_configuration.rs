//! Fuzzes configuration descriptor walking and strict parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_configuration

#![no_main]

use libfuzzer_sys::fuzz_target;
use usbh_hid_descriptor::{Configuration, DescriptorIter};

fuzz_target!(|data: &[u8]| {
    let mut end = 0usize;
    for raw in DescriptorIter::new(data) {
        assert!(raw.offset >= end);
        assert!(raw.bytes.len() >= 2);
        end = raw.offset + raw.bytes.len();
        assert!(end <= data.len());
    }

    if let Ok(config) = Configuration::parse(data) {
        for (index, interface) in config.interfaces.iter().enumerate() {
            assert!(config.interface(index).is_some());
            for endpoint in &interface.endpoints {
                let _ = endpoint.transfer_type();
                let _ = endpoint.number();
            }
        }
    }
});
