//! Fuzzes the report ring buffer with an arbitrary operation stream.
//!
//! Each input byte selects an operation; the buffer must never hold more
//! than `capacity - 1` bytes and must return bytes in write order.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_report_fifo

#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use usbh_hid_fifo::ReportFifo;

fuzz_target!(|data: &[u8]| {
    let Some((&cap, ops)) = data.split_first() else {
        return;
    };
    let Ok(fifo) = ReportFifo::with_capacity(usize::from(cap)) else {
        assert!(cap < 2);
        return;
    };
    let mut model: VecDeque<u8> = VecDeque::new();
    let mut counter = 0u8;

    for &op in ops {
        let n = usize::from(op >> 2);
        match op & 0b11 {
            0 | 1 => {
                let bytes: Vec<u8> = (0..n)
                    .map(|_| {
                        counter = counter.wrapping_add(1);
                        counter
                    })
                    .collect();
                let written = fifo.write(&bytes);
                model.extend(bytes.iter().take(written));
            }
            2 => {
                let mut out = vec![0u8; n];
                let read = fifo.read(&mut out);
                for byte in out.iter().take(read) {
                    assert_eq!(Some(*byte), model.pop_front());
                }
            }
            _ => {
                if fifo.reset() {
                    model.clear();
                }
            }
        }
        assert!(fifo.len() <= fifo.max_len());
        assert_eq!(fifo.len(), model.len());
    }
});
