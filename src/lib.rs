//! `hdrbench` measures the raw cost of recording values into an HDR ("high dynamic range")
//! histogram under three synchronization disciplines: uncontended single-threaded access
//! ([`Histogram`]), mutex-guarded access ([`sync::SynchronizedHistogram`]), and lock-free atomic
//! access ([`sync::AtomicHistogram`]). The point is to answer, with a deliberately simple and
//! reproducible two-phase protocol, how much each discipline costs per recorded value when driven
//! from a single thread.
//!
//! The benchmark protocol lives in the [`bench`] module. Each scenario runs a short warm-up loop
//! (timed and reported, then discarded), resets the histogram, pauses for roughly a second so
//! transient speed-up effects can settle, and then runs the timed measurement loop. Throughput is
//! reported twice per measurement: once against the number of recording calls issued, and once
//! against the histogram's own total count, which can be higher because recording compensates for
//! coordinated omission by backfilling synthetic samples (see
//! [`Histogram::record_correct`]).
//!
//! The histograms themselves track values across a configurable range with a configurable number
//! of significant decimal digits, using the same bucket layout as the Java and Rust HdrHistogram
//! implementations. Only recording, resetting, and total-count queries are provided here; if you
//! need percentiles, iteration, or serialization, use the full `hdrhistogram` crate instead.
//!
//! # Running the benchmark
//!
//! ```
//! use hdrbench::bench::{self, Config};
//! use std::time::Duration;
//!
//! // Scaled-down loop counts; defaults reproduce the original full-scale run.
//! let config = Config {
//!     warmup_loop_length: 10_000,
//!     raw_timing_loop_count: 100_000,
//!     quiesce: Duration::from_millis(1),
//!     ..Config::default()
//! };
//! let mut report = Vec::new();
//! bench::run_uncontended(&mut report, &config).unwrap();
//! let report = String::from_utf8(report).unwrap();
//! assert!(report.contains("value recording calls per sec."));
//! ```

pub mod bench;
mod core;
pub mod errors;
pub mod sync;

pub use crate::core::counter::Counter;
pub use crate::errors::{CreationError, RecordError};

use crate::core::layout::Layout;

/// The recording capability shared by every histogram variant.
///
/// The benchmark harness is written once against this trait; which variant is constructed
/// determines the synchronization discipline being measured. All implementations must have
/// identical observable counting semantics, differing only in cost and thread-safety.
pub trait ValueRecorder {
    /// Record `value`, backfilling synthetic samples at multiples of `interval` to compensate for
    /// coordinated omission. See [`Histogram::record_correct`].
    fn record_correct(&mut self, value: u64, interval: u64) -> Result<(), RecordError>;

    /// Clear all recorded state. The total count returns to zero; the configured value range and
    /// precision are unaffected.
    fn reset(&mut self);

    /// Total number of logical samples recorded since the last reset. May exceed the number of
    /// recording calls made, due to backfill.
    fn len(&self) -> u64;

    /// True if no samples have been recorded since the last reset.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A value-recording histogram covering `[1, highest_trackable_value]` at a precision of
/// `sigfig` significant decimal digits, for use from a single thread.
///
/// `C` is the per-bucket count type; smaller types shrink the footprint at the risk of buckets
/// saturating. Recording is a constant-time index computation plus an add, with no allocation.
///
/// ```
/// use hdrbench::Histogram;
///
/// let mut h = Histogram::<u64>::new_with_max(3_600_000_000, 3).unwrap();
/// h.record(12340).unwrap();
/// assert_eq!(h.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Histogram<C: Counter> {
    layout: Layout,
    total_count: u64,
    counts: Vec<C>,
}

impl<C: Counter> Histogram<C> {
    /// Construct a histogram tracking values in `[1, high]` to `sigfig` significant decimal
    /// digits. `high` must be at least 2, `sigfig` at most 5.
    pub fn new_with_max(high: u64, sigfig: u8) -> Result<Histogram<C>, CreationError> {
        Self::new_with_bounds(1, high, sigfig)
    }

    /// Construct a histogram tracking values in `[low, high]` to `sigfig` significant decimal
    /// digits. A `low` above 1 is useful when values are stated in units much smaller than the
    /// accuracy anyone cares about (e.g. nanosecond values with microsecond accuracy, `low` =
    /// 1000), and shrinks the allocation accordingly.
    pub fn new_with_bounds(low: u64, high: u64, sigfig: u8) -> Result<Histogram<C>, CreationError> {
        let layout = Layout::new(low, high, sigfig)?;
        let counts = vec![C::zero(); layout.counts_len()];
        Ok(Histogram {
            layout,
            total_count: 0,
            counts,
        })
    }

    /// Record a single occurrence of `value`.
    ///
    /// Errors if `value` exceeds the trackable range; these histograms do not resize.
    #[inline]
    pub fn record(&mut self, value: u64) -> Result<(), RecordError> {
        self.record_n(value, C::one())
    }

    /// Record `count` occurrences of `value`.
    #[inline]
    pub fn record_n(&mut self, value: u64, count: C) -> Result<(), RecordError> {
        let index = self
            .layout
            .index_for(value)
            .ok_or(RecordError::ValueOutOfRange)?;
        let slot = &mut self.counts[index];
        *slot = slot.saturating_add(count);
        self.total_count = self.total_count.saturating_add(count.as_u64());
        Ok(())
    }

    /// Record `value`, compensating for coordinated omission.
    ///
    /// When the caller samples on a cadence of `interval` but a single stall delays the whole
    /// loop, the one large value that gets recorded under-represents the stall: the samples that
    /// would have been taken during it are simply missing. To correct for that at recording time,
    /// this method additionally records a decreasing series of synthetic values
    /// (`value - interval`, `value - 2 * interval`, ...) down to `interval`, so the total count
    /// can exceed the number of calls made.
    ///
    /// An `interval` of zero disables the correction.
    pub fn record_correct(&mut self, value: u64, interval: u64) -> Result<(), RecordError> {
        self.record_n_correct(value, C::one(), interval)
    }

    /// Record `count` occurrences of `value`, compensating for coordinated omission as in
    /// [`Histogram::record_correct`].
    pub fn record_n_correct(
        &mut self,
        value: u64,
        count: C,
        interval: u64,
    ) -> Result<(), RecordError> {
        self.record_n(value, count)?;
        if interval == 0 || value <= interval {
            return Ok(());
        }
        let mut missing_value = value - interval;
        while missing_value >= interval {
            self.record_n(missing_value, count)?;
            missing_value -= interval;
        }
        Ok(())
    }

    /// Clear all recorded counts. The value range and precision are unaffected.
    pub fn reset(&mut self) {
        for slot in self.counts.iter_mut() {
            *slot = C::zero();
        }
        self.total_count = 0;
    }

    /// Total number of samples recorded since construction or the last reset.
    #[inline]
    pub fn len(&self) -> u64 {
        self.total_count
    }

    /// True if no samples have been recorded.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// The count recorded at `value`, to within the histogram's resolution. Values beyond the
    /// trackable range read the last bucket.
    pub fn count_at(&self, value: u64) -> C {
        self.counts[self.layout.index_for_clamped(value)]
    }

    /// The configured lowest discernible value.
    pub fn low(&self) -> u64 {
        self.layout.lowest_discernible_value()
    }

    /// The configured highest trackable value.
    pub fn high(&self) -> u64 {
        self.layout.highest_trackable_value()
    }

    /// The configured number of significant decimal digits.
    pub fn sigfig(&self) -> u8 {
        self.layout.significant_value_digits()
    }

    /// The number of buckets the value range is covered by.
    pub fn buckets(&self) -> u32 {
        self.layout.bucket_count()
    }
}

impl<C: Counter> ValueRecorder for Histogram<C> {
    #[inline]
    fn record_correct(&mut self, value: u64, interval: u64) -> Result<(), RecordError> {
        Histogram::record_correct(self, value, interval)
    }

    fn reset(&mut self) {
        Histogram::reset(self)
    }

    fn len(&self) -> u64 {
        Histogram::len(self)
    }
}
