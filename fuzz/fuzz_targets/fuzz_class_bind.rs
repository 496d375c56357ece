//! Fuzzes the whole driver lifecycle against arbitrary configuration blobs.
//!
//! Binds through the mock host, runs the class request sequencer to
//! completion and steps the data pump. Bind and request errors are expected;
//! panics are not.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_class_bind

#![no_main]

use libfuzzer_sys::fuzz_target;
use usbh_hid_class::mock::{MockHost, RecordingSink};
use usbh_hid_class::{DeviceMode, HidClass, HidClassConfig, HostClass, Progress, UrbState};

fuzz_target!(|data: &[u8]| {
    let Ok(mut host) = MockHost::new(data) else {
        return;
    };
    let mode = if data.len() % 2 == 0 {
        DeviceMode::Mouse
    } else {
        DeviceMode::Keyboard
    };
    let mut sink = RecordingSink::with_mode(mode);
    let Ok(class) = HidClass::new(HidClassConfig::default()) else {
        return;
    };
    let Ok(mut handle) = class.init(&mut host, &mut sink) else {
        return;
    };

    for _ in 0..8 {
        match class.class_request(&mut host, &mut sink, &mut handle) {
            Ok(Progress::Done) | Err(_) => break,
            Ok(Progress::Pending) => {}
        }
    }

    host.script_urb(&[UrbState::Done, UrbState::Stall, UrbState::NotReady, UrbState::Done]);
    host.queue_transfer(data);
    host.queue_transfer(&[]);
    for frame in 0..16u32 {
        host.set_frame(frame);
        if class.process(&mut host, &mut sink, &mut handle).is_err() {
            break;
        }
    }

    let fifo = handle.fifo();
    assert!(fifo.len() <= fifo.max_len());
    let _ = class.deinit(&mut host, handle);
});
