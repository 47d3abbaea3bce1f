//! Histogram variants that can be updated through a shared reference.
//!
//! Both variants here expose the same counting semantics as the plain [`Histogram`], differing
//! only in how bucket updates are synchronized: [`SynchronizedHistogram`] takes a mutex around
//! every operation, while [`AtomicHistogram`] updates its buckets with lock-free atomic adds.
//! The benchmark harness drives them from a single thread to price the synchronization itself,
//! but they are safe to share across threads.

use crate::core::layout::Layout;
use crate::errors::{CreationError, RecordError};
use crate::{Counter, Histogram, ValueRecorder};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A [`Histogram`] guarded by a mutex, recordable through a shared reference.
///
/// Every operation locks; this is the simplest way to share a histogram between threads, and the
/// most expensive per recording. A poisoned lock panics, as a panic mid-record means the counts
/// can no longer be trusted.
#[derive(Debug)]
pub struct SynchronizedHistogram<C: Counter> {
    inner: Mutex<Histogram<C>>,
}

impl<C: Counter> SynchronizedHistogram<C> {
    /// Construct a synchronized histogram tracking values in `[1, high]` to `sigfig` significant
    /// decimal digits.
    pub fn new_with_max(high: u64, sigfig: u8) -> Result<SynchronizedHistogram<C>, CreationError> {
        Ok(Histogram::new_with_max(high, sigfig)?.into())
    }

    /// See [`Histogram::record`].
    pub fn record(&self, value: u64) -> Result<(), RecordError> {
        self.inner.lock().unwrap().record(value)
    }

    /// See [`Histogram::record_correct`].
    pub fn record_correct(&self, value: u64, interval: u64) -> Result<(), RecordError> {
        self.inner.lock().unwrap().record_correct(value, interval)
    }

    /// See [`Histogram::reset`].
    pub fn reset(&self) {
        self.inner.lock().unwrap().reset()
    }

    /// See [`Histogram::len`].
    pub fn len(&self) -> u64 {
        self.inner.lock().unwrap().len()
    }

    /// True if no samples have been recorded since the last reset.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// See [`Histogram::count_at`].
    pub fn count_at(&self, value: u64) -> C {
        self.inner.lock().unwrap().count_at(value)
    }

    /// Take the wrapped histogram back out.
    pub fn into_inner(self) -> Histogram<C> {
        self.inner.into_inner().unwrap()
    }
}

impl<C: Counter> From<Histogram<C>> for SynchronizedHistogram<C> {
    fn from(h: Histogram<C>) -> Self {
        SynchronizedHistogram {
            inner: Mutex::new(h),
        }
    }
}

impl<C: Counter> ValueRecorder for SynchronizedHistogram<C> {
    #[inline]
    fn record_correct(&mut self, value: u64, interval: u64) -> Result<(), RecordError> {
        SynchronizedHistogram::record_correct(self, value, interval)
    }

    fn reset(&mut self) {
        SynchronizedHistogram::reset(self)
    }

    fn len(&self) -> u64 {
        SynchronizedHistogram::len(self)
    }
}

/// A histogram whose buckets are `AtomicU64`s, recordable lock-free through a shared reference.
///
/// Counts are independent single-cell counters, so relaxed ordering is enough; a reader that
/// needs a consistent cross-bucket snapshot must provide its own synchronization, exactly as with
/// the Java `AtomicHistogram`. `reset` likewise zeroes buckets one at a time and is only
/// meaningful once writers are quiescent.
#[derive(Debug)]
pub struct AtomicHistogram {
    layout: Layout,
    total_count: AtomicU64,
    counts: Box<[AtomicU64]>,
}

impl AtomicHistogram {
    /// Construct an atomic histogram tracking values in `[1, high]` to `sigfig` significant
    /// decimal digits.
    pub fn new_with_max(high: u64, sigfig: u8) -> Result<AtomicHistogram, CreationError> {
        Self::new_with_bounds(1, high, sigfig)
    }

    /// Construct an atomic histogram tracking values in `[low, high]` to `sigfig` significant
    /// decimal digits.
    pub fn new_with_bounds(low: u64, high: u64, sigfig: u8) -> Result<AtomicHistogram, CreationError> {
        let layout = Layout::new(low, high, sigfig)?;
        let counts = (0..layout.counts_len())
            .map(|_| AtomicU64::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Ok(AtomicHistogram {
            layout,
            total_count: AtomicU64::new(0),
            counts,
        })
    }

    /// See [`Histogram::record`].
    #[inline]
    pub fn record(&self, value: u64) -> Result<(), RecordError> {
        self.record_n(value, 1)
    }

    /// See [`Histogram::record_n`].
    #[inline]
    pub fn record_n(&self, value: u64, count: u64) -> Result<(), RecordError> {
        let index = self
            .layout
            .index_for(value)
            .ok_or(RecordError::ValueOutOfRange)?;
        self.counts[index].fetch_add(count, Ordering::Relaxed);
        self.total_count.fetch_add(count, Ordering::Relaxed);
        Ok(())
    }

    /// See [`Histogram::record_correct`].
    pub fn record_correct(&self, value: u64, interval: u64) -> Result<(), RecordError> {
        self.record_n(value, 1)?;
        if interval == 0 || value <= interval {
            return Ok(());
        }
        let mut missing_value = value - interval;
        while missing_value >= interval {
            self.record_n(missing_value, 1)?;
            missing_value -= interval;
        }
        Ok(())
    }

    /// See [`Histogram::reset`].
    pub fn reset(&self) {
        for slot in self.counts.iter() {
            slot.store(0, Ordering::Relaxed);
        }
        self.total_count.store(0, Ordering::Relaxed);
    }

    /// See [`Histogram::len`].
    #[inline]
    pub fn len(&self) -> u64 {
        self.total_count.load(Ordering::Relaxed)
    }

    /// True if no samples have been recorded since the last reset.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// See [`Histogram::count_at`].
    pub fn count_at(&self, value: u64) -> u64 {
        self.counts[self.layout.index_for_clamped(value)].load(Ordering::Relaxed)
    }
}

impl ValueRecorder for AtomicHistogram {
    #[inline]
    fn record_correct(&mut self, value: u64, interval: u64) -> Result<(), RecordError> {
        AtomicHistogram::record_correct(self, value, interval)
    }

    fn reset(&mut self) {
        AtomicHistogram::reset(self)
    }

    fn len(&self) -> u64 {
        AtomicHistogram::len(self)
    }
}
