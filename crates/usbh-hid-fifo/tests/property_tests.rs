//! Property-based tests for usbh-hid-fifo.
//!
//! proptest drives operation sequences against a `VecDeque` model; quickcheck
//! covers the simple capacity invariants.

use std::collections::VecDeque;

use proptest::prelude::*;
use quickcheck_macros::quickcheck;
use usbh_hid_fifo::ReportFifo;

#[derive(Debug, Clone)]
enum Op {
    Write(Vec<u8>),
    Read(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        proptest::collection::vec(any::<u8>(), 0..24).prop_map(Op::Write),
        (0usize..24).prop_map(Op::Read),
    ]
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    /// Any interleaving of writes and reads behaves like a bounded FIFO that
    /// keeps the longest prefix that fits.
    #[test]
    fn prop_matches_bounded_queue_model(
        capacity in 2usize..64,
        ops in proptest::collection::vec(op_strategy(), 1..64),
    ) {
        let fifo = ReportFifo::with_capacity(capacity)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                Op::Write(bytes) => {
                    let room = capacity - 1 - model.len();
                    let expected = bytes.len().min(room);
                    prop_assert_eq!(fifo.write(&bytes), expected);
                    model.extend(bytes.iter().take(expected));
                }
                Op::Read(count) => {
                    let mut out = vec![0u8; count];
                    let expected = count.min(model.len());
                    prop_assert_eq!(fifo.read(&mut out), expected);
                    let drained: Vec<u8> = model.drain(..expected).collect();
                    prop_assert_eq!(&out[..expected], drained.as_slice());
                }
            }
            prop_assert!(fifo.len() <= capacity - 1);
            prop_assert_eq!(fifo.len(), model.len());
        }
    }

    /// Writing N < capacity - 1 bytes and reading N returns them in order.
    #[test]
    fn prop_write_read_identity(
        data in proptest::collection::vec(any::<u8>(), 0..128),
    ) {
        let fifo = ReportFifo::with_capacity(data.len() + 2)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(fifo.write(&data), data.len());

        let mut out = vec![0u8; data.len()];
        prop_assert_eq!(fifo.read(&mut out), data.len());
        prop_assert_eq!(out, data);
    }
}

#[quickcheck]
fn prop_stored_never_exceeds_capacity_minus_one(capacity: u8, chunks: Vec<Vec<u8>>) -> bool {
    let capacity = usize::from(capacity).max(2);
    let Ok(fifo) = ReportFifo::with_capacity(capacity) else {
        return false;
    };

    chunks.iter().all(|chunk| {
        fifo.write(chunk);
        fifo.len() <= capacity - 1
    })
}

#[quickcheck]
fn prop_write_count_never_exceeds_offered(capacity: u8, data: Vec<u8>) -> bool {
    let capacity = usize::from(capacity).max(2);
    let Ok(fifo) = ReportFifo::with_capacity(capacity) else {
        return false;
    };
    let written = fifo.write(&data);
    written <= data.len() && written <= capacity - 1
}
