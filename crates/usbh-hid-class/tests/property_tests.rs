//! Property-based tests for selection, poll policy and the data pump.

use proptest::prelude::*;
use usbh_hid_class::mock::{MockHost, RecordingSink};
use usbh_hid_class::{
    DeviceMode, HidClass, HidClassConfig, HostClass, InterfaceSelection, UrbState,
    clamp_poll_interval, select_interface,
};

fn fail(e: impl std::fmt::Display) -> TestCaseError {
    TestCaseError::fail(e.to_string())
}

fn mouse_blob(interval: u8, max_packet_size: u8) -> Vec<u8> {
    vec![
        0x09, 0x02, 0x22, 0x00, 0x01, 0x01, 0x00, 0xA0, 0x32, //
        0x09, 0x04, 0x00, 0x00, 0x01, 0x03, 0x01, 0x02, 0x00, //
        0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, 0x34, 0x00, //
        0x07, 0x05, 0x81, 0x03, max_packet_size, 0x00, interval,
    ]
}

/// `vendor` vendor-specific interfaces followed by a boot mouse.
fn mouse_after_vendor_interfaces(vendor: u8) -> Vec<u8> {
    let mut blob = vec![0x09, 0x02, 0x00, 0x00, vendor.saturating_add(1), 0x01, 0x00, 0xA0, 0x32];
    for number in 0..vendor {
        blob.extend_from_slice(&[0x09, 0x04, number, 0x00, 0x01, 0xFF, 0x00, 0x00, 0x00]);
        blob.extend_from_slice(&[0x07, 0x05, 0x81, 0x02, 0x40, 0x00, 0x00]);
    }
    blob.extend_from_slice(&[0x09, 0x04, vendor, 0x00, 0x01, 0x03, 0x01, 0x02, 0x00]);
    blob.extend_from_slice(&[0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, 0x34, 0x00]);
    blob.extend_from_slice(&[0x07, 0x05, 0x82, 0x03, 0x08, 0x00, 0x0A]);
    let total = u16::try_from(blob.len()).unwrap_or(u16::MAX).to_le_bytes();
    if let Some(field) = blob.get_mut(2..4) {
        field.copy_from_slice(&total);
    }
    blob
}

proptest! {
    #[test]
    fn prop_poll_interval_is_max_of_inputs(advertised in any::<u8>(), min in any::<u8>()) {
        let clamped = clamp_poll_interval(advertised, min);
        prop_assert!(clamped >= min);
        prop_assert!(clamped >= advertised);
        prop_assert!(clamped == min || clamped == advertised);
    }

    #[test]
    fn prop_bound_poll_interval_respects_minimum(
        interval in any::<u8>(),
        min_poll in 0u8..=32,
    ) {
        let mut host = MockHost::new(&mouse_blob(interval, 8)).map_err(fail)?;
        let class = HidClass::new(HidClassConfig {
            min_poll_interval_ms: min_poll,
            ..HidClassConfig::default()
        })
        .map_err(fail)?;
        let handle = class
            .init(&mut host, &mut RecordingSink::default())
            .map_err(fail)?;

        prop_assert_eq!(handle.poll_interval(), interval.max(min_poll));
        prop_assert_eq!(handle.in_endpoint().interval, interval);
    }

    #[test]
    fn prop_auto_selection_skips_non_hid_interfaces(vendor in 0u8..6) {
        let host = MockHost::new(&mouse_after_vendor_interfaces(vendor)).map_err(fail)?;
        let index = select_interface(&host, InterfaceSelection::Auto, DeviceMode::Mouse, 10)
            .map_err(fail)?;
        prop_assert_eq!(index, vendor);
    }

    #[test]
    fn prop_pump_queues_whole_records_within_capacity(
        packets in prop::collection::vec(0usize..=8, 1..40),
        fifo_reports in 1u16..6,
    ) {
        let mut host = MockHost::new(&mouse_blob(10, 8)).map_err(fail)?;
        let mut sink = RecordingSink::default();
        let class = HidClass::new(HidClassConfig {
            max_report_size: 8,
            fifo_reports,
            ..HidClassConfig::default()
        })
        .map_err(fail)?;
        let mut handle = class.init(&mut host, &mut sink).map_err(fail)?;

        host.script_urb(&vec![UrbState::Done; packets.len()]);
        for &len in &packets {
            host.queue_transfer(&vec![0x5A; len]);
        }

        // Init, Sync, then one GetData + Poll pair per packet.
        for _ in 0..(2 + packets.len() * 2) {
            class.process(&mut host, &mut sink, &mut handle).map_err(fail)?;
        }

        let fifo = handle.fifo();
        let non_empty = packets.iter().filter(|&&len| len > 0).count();
        prop_assert!(fifo.len() <= fifo.max_len());
        prop_assert_eq!(fifo.len() % 8, 0);
        prop_assert_eq!(fifo.len() / 8, non_empty.min(usize::from(fifo_reports)));
        prop_assert_eq!(sink.events.len(), non_empty);
        prop_assert_eq!(handle.pump_stats().reports as usize, non_empty);
        prop_assert_eq!(
            handle.pump_stats().zero_length as usize,
            packets.len() - non_empty
        );
    }
}
