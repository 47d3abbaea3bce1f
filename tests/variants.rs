//! The synchronized and atomic variants must count exactly like the plain histogram.

use hdrbench::sync::{AtomicHistogram, SynchronizedHistogram};
use hdrbench::{Histogram, RecordError};
use std::sync::Arc;
use std::thread;

const TRACKABLE_MAX: u64 = 3600 * 1000 * 1000;
const SIGFIG: u8 = 3;
const TEST_VALUE_LEVEL: u64 = 12340;

#[test]
fn synchronized_record_through() {
    let h = SynchronizedHistogram::<u64>::new_with_max(TRACKABLE_MAX, SIGFIG).unwrap();
    h.record(TEST_VALUE_LEVEL).unwrap();
    assert_eq!(h.count_at(TEST_VALUE_LEVEL), 1);
    assert_eq!(h.len(), 1);
}

#[test]
fn atomic_record_through() {
    let h = AtomicHistogram::new_with_max(TRACKABLE_MAX, SIGFIG).unwrap();
    h.record(TEST_VALUE_LEVEL).unwrap();
    assert_eq!(h.count_at(TEST_VALUE_LEVEL), 1);
    assert_eq!(h.len(), 1);
}

#[test]
fn variants_reject_out_of_range_values() {
    let s = SynchronizedHistogram::<u64>::new_with_max(TRACKABLE_MAX, SIGFIG).unwrap();
    let a = AtomicHistogram::new_with_max(TRACKABLE_MAX, SIGFIG).unwrap();
    assert_eq!(
        s.record(3 * TRACKABLE_MAX).unwrap_err(),
        RecordError::ValueOutOfRange
    );
    assert_eq!(
        a.record(3 * TRACKABLE_MAX).unwrap_err(),
        RecordError::ValueOutOfRange
    );
    assert!(s.is_empty());
    assert!(a.is_empty());
}

#[test]
fn variants_reset_completely() {
    let s = SynchronizedHistogram::<u64>::new_with_max(TRACKABLE_MAX, SIGFIG).unwrap();
    let a = AtomicHistogram::new_with_max(TRACKABLE_MAX, SIGFIG).unwrap();
    for i in 0..100 {
        s.record_correct(TEST_VALUE_LEVEL + i, 51).unwrap();
        a.record_correct(TEST_VALUE_LEVEL + i, 51).unwrap();
    }
    s.reset();
    a.reset();
    assert_eq!(s.len(), 0);
    assert_eq!(a.len(), 0);
    assert_eq!(s.count_at(TEST_VALUE_LEVEL), 0);
    assert_eq!(a.count_at(TEST_VALUE_LEVEL), 0);
}

#[test]
fn all_variants_count_identically() {
    let mut plain = Histogram::<u64>::new_with_max(TRACKABLE_MAX, SIGFIG).unwrap();
    let synchronized = SynchronizedHistogram::<u64>::new_with_max(TRACKABLE_MAX, SIGFIG).unwrap();
    let atomic = AtomicHistogram::new_with_max(TRACKABLE_MAX, SIGFIG).unwrap();

    for i in 0..500 {
        let value = i * 7 + 1;
        plain.record_correct(value, 50).unwrap();
        synchronized.record_correct(value, 50).unwrap();
        atomic.record_correct(value, 50).unwrap();
    }

    assert_eq!(plain.len(), synchronized.len());
    assert_eq!(plain.len(), atomic.len());
    for probe in &[1, 50, 137, 1000, 2048, 3493] {
        assert_eq!(plain.count_at(*probe), synchronized.count_at(*probe));
        assert_eq!(plain.count_at(*probe), atomic.count_at(*probe));
    }
}

#[test]
fn atomic_records_from_many_threads() {
    let h = Arc::new(AtomicHistogram::new_with_max(TRACKABLE_MAX, SIGFIG).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let h = Arc::clone(&h);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    h.record(TEST_VALUE_LEVEL).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(h.len(), 40_000);
    assert_eq!(h.count_at(TEST_VALUE_LEVEL), 40_000);
}

#[test]
fn synchronized_records_from_many_threads() {
    let h = Arc::new(SynchronizedHistogram::<u64>::new_with_max(TRACKABLE_MAX, SIGFIG).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let h = Arc::clone(&h);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    h.record(TEST_VALUE_LEVEL).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(h.len(), 40_000);
    assert_eq!(h.count_at(TEST_VALUE_LEVEL), 40_000);
}
