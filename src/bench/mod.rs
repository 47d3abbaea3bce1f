//! The recording-throughput benchmark protocol.
//!
//! One scenario prices one synchronization discipline. Each scenario constructs a fresh
//! histogram and then runs a fixed two-phase protocol:
//!
//! 1. a short warm-up loop, timed and reported, whose contents are then discarded by a reset;
//! 2. a quiescence pause (about a second) so caches and adaptive optimization settle outside the
//!    timed window;
//! 3. the measurement loop, timed and reported.
//!
//! The workload is [`record_correct`](crate::Histogram::record_correct) driven with a
//! deterministic value sequence (`test_value_level + (i & value_mask)`) and a fixed expected
//! interval. Because that recording call backfills synthetic samples to compensate for
//! coordinated omission, the measurement phase reports two rates: one against the number of calls
//! issued and one against the histogram's own total count. Both are meaningful; they are never
//! conflated.
//!
//! Rates are computed with integer truncation (`1_000_000 * count / elapsed_usec`), as the
//! original Java harness does; the bias only shows at very small counts. Elapsed time is likewise
//! truncated to whole microseconds. An elapsed time of zero for a non-empty phase means the clock
//! could not resolve the work at all and is reported as [`BenchError::ZeroElapsed`] rather than
//! silently producing a bogus rate.
//!
//! Measurement loop counts are per-discipline configuration constants, chosen so every scenario
//! runs for comparable wall-clock time (the mutex-guarded discipline gets a tenth of the
//! uncontended iterations, the atomic one a fifth); they are not derived at run time.

use crate::errors::{CreationError, RecordError};
use crate::sync::{AtomicHistogram, SynchronizedHistogram};
use crate::{Histogram, ValueRecorder};
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

/// The benchmark's knobs, passed explicitly into every scenario.
///
/// `Default` reproduces the original full-scale run: an hour's worth of microseconds as the value
/// range at 3 significant digits, 400 million uncontended recordings, and a one second quiescence
/// pause. Tests and doc examples scale the loop counts down.
#[derive(Debug, Clone)]
pub struct Config {
    /// Highest value the histograms are constructed to track.
    pub highest_trackable_value: u64,
    /// Histogram precision, in significant decimal digits.
    pub significant_value_digits: u8,
    /// Base value every recording is derived from.
    pub test_value_level: u64,
    /// Mask applied to the iteration index and added to the base value, so recorded values vary
    /// without the generator costing more than an AND and an add.
    pub value_mask: u64,
    /// Expected inter-sample interval handed to every recording call for coordinated-omission
    /// compensation.
    pub expected_interval: u64,
    /// Recording calls made in the warm-up phase of every scenario.
    pub warmup_loop_length: u64,
    /// Measurement recording calls for the uncontended scenario.
    pub raw_timing_loop_count: u64,
    /// Measurement recording calls for the mutex-guarded scenario.
    pub synchronized_timing_loop_count: u64,
    /// Measurement recording calls for the atomic scenario.
    pub atomic_timing_loop_count: u64,
    /// Pause between warm-up and measurement, excluded from all timing.
    pub quiesce: Duration,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            highest_trackable_value: 3600 * 1000 * 1000, // e.g. for 1 hr in usec units
            significant_value_digits: 3,
            test_value_level: 12340,
            value_mask: 0x8000,
            expected_interval: 1_000_000_000,
            warmup_loop_length: 50_000,
            raw_timing_loop_count: 400_000_000,
            synchronized_timing_loop_count: 40_000_000, // 1/10th the uncontended count
            atomic_timing_loop_count: 80_000_000,       // 1/5th the uncontended count
            quiesce: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// The value recorded for iteration `index`: deterministic, side-effect free, O(1).
    #[inline]
    pub fn value(&self, index: u64) -> u64 {
        self.test_value_level + (index & self.value_mask)
    }
}

/// Everything that can abort a scenario.
///
/// Collaborator errors propagate unmodified; there are no retries and no partial results. A
/// failed phase fails the whole scenario.
#[derive(Debug)]
pub enum BenchError {
    /// The histogram under test could not be constructed.
    Creation(CreationError),
    /// A recording call failed (value beyond the trackable range).
    Record(RecordError),
    /// A non-empty phase completed in zero whole microseconds, i.e. the clock could not resolve
    /// it. Computing a rate from that would divide by zero, so it is treated as fatal.
    ZeroElapsed,
    /// The report sink failed.
    Io(io::Error),
}

impl From<CreationError> for BenchError {
    fn from(e: CreationError) -> Self {
        BenchError::Creation(e)
    }
}

impl From<RecordError> for BenchError {
    fn from(e: RecordError) -> Self {
        BenchError::Record(e)
    }
}

impl From<io::Error> for BenchError {
    fn from(e: io::Error) -> Self {
        BenchError::Io(e)
    }
}

/// Issue exactly `loop_count` recording calls against `histogram`, in increasing index order.
///
/// The histogram's total count afterwards may legitimately exceed `loop_count`: the recording
/// call backfills synthetic samples whenever a value exceeds the expected interval. That is a
/// property of the histogram, not of this driver, and is never an error here.
pub fn record_loop<R: ValueRecorder>(
    histogram: &mut R,
    config: &Config,
    loop_count: u64,
) -> Result<(), RecordError> {
    for i in 0..loop_count {
        histogram.record_correct(config.value(i), config.expected_interval)?;
    }
    Ok(())
}

/// Run `work` exactly once and return the elapsed wall-clock time in whole microseconds,
/// truncating any sub-microsecond remainder.
///
/// Timestamps are taken with [`Instant`] immediately before and after the single invocation;
/// nothing else happens inside the timed window. Errors from `work` propagate unmodified.
pub fn time_phase<F>(work: F) -> Result<u64, RecordError>
where
    F: FnOnce() -> Result<(), RecordError>,
{
    let start = Instant::now();
    work()?;
    let elapsed = start.elapsed();
    Ok(elapsed.as_micros() as u64)
}

/// Operations per second from `count` operations in `delta_usec` microseconds, with integer
/// truncation (the documented precision choice of this harness).
///
/// Callers must guard `delta_usec > 0`; see [`BenchError::ZeroElapsed`].
pub fn rate(count: u64, delta_usec: u64) -> u64 {
    debug_assert!(delta_usec > 0);
    (u128::from(count) * 1_000_000 / u128::from(delta_usec)) as u64
}

/// Best-effort real-time pause between the warm-up and measurement phases.
///
/// This returns normally even if the underlying wait ends early; a shortened pause merely
/// weakens the noise mitigation, it never fails the benchmark.
pub fn quiesce(pause: Duration) {
    thread::sleep(pause);
}

/// Run the two-phase protocol against an already-constructed histogram, writing labeled report
/// lines to `out`.
///
/// Exactly one reset happens between warm-up and measurement, so the total count used in the
/// measurement report reflects measurement-phase recordings only. A loop length of zero is
/// reported as skipped rather than producing a rate.
pub fn run_scenario<R, W>(
    out: &mut W,
    label: &str,
    histogram: &mut R,
    config: &Config,
    timing_loop_count: u64,
) -> Result<(), BenchError>
where
    R: ValueRecorder,
    W: Write,
{
    writeln!(
        out,
        "\nTiming recording speed with expected_interval = {} :",
        config.expected_interval
    )?;

    let delta_usec = time_phase(|| record_loop(histogram, config, config.warmup_loop_length))?;
    if config.warmup_loop_length == 0 {
        writeln!(out, "{}Warmup: skipped, no recordings requested.", label)?;
    } else if delta_usec == 0 {
        return Err(BenchError::ZeroElapsed);
    } else {
        writeln!(
            out,
            "{}Warmup: {} value recordings completed in {} usec, rate = {} value recording calls per sec.",
            label,
            config.warmup_loop_length,
            delta_usec,
            rate(config.warmup_loop_length, delta_usec)
        )?;
    }

    histogram.reset();
    quiesce(config.quiesce);

    let delta_usec = time_phase(|| record_loop(histogram, config, timing_loop_count))?;
    if timing_loop_count == 0 {
        writeln!(out, "{}Hot code timing: skipped, no recordings requested.", label)?;
        return Ok(());
    }
    if delta_usec == 0 {
        return Err(BenchError::ZeroElapsed);
    }
    writeln!(out, "{}Hot code timing:", label)?;
    writeln!(
        out,
        "{}{} value recordings completed in {} usec, rate = {} value recording calls per sec.",
        label,
        timing_loop_count,
        delta_usec,
        rate(timing_loop_count, delta_usec)
    )?;
    writeln!(
        out,
        "{}{} raw recorded entries completed in {} usec, rate = {} recorded values per sec.",
        label,
        histogram.len(),
        delta_usec,
        rate(histogram.len(), delta_usec)
    )?;
    Ok(())
}

/// Price recording into a plain, single-threaded [`Histogram`].
pub fn run_uncontended<W: Write>(out: &mut W, config: &Config) -> Result<(), BenchError> {
    let mut histogram = Histogram::<u64>::new_with_max(
        config.highest_trackable_value,
        config.significant_value_digits,
    )?;
    writeln!(out, "\n\nTiming Histogram:")?;
    run_scenario(
        out,
        "Histogram: ",
        &mut histogram,
        config,
        config.raw_timing_loop_count,
    )
}

/// Price recording into a mutex-guarded [`SynchronizedHistogram`], locked and unlocked on every
/// call from a single uncontended thread.
pub fn run_synchronized<W: Write>(out: &mut W, config: &Config) -> Result<(), BenchError> {
    let mut histogram = SynchronizedHistogram::<u64>::new_with_max(
        config.highest_trackable_value,
        config.significant_value_digits,
    )?;
    writeln!(out, "\n\nTiming SynchronizedHistogram:")?;
    run_scenario(
        out,
        "SynchronizedHistogram: ",
        &mut histogram,
        config,
        config.synchronized_timing_loop_count,
    )
}

/// Price recording into a lock-free [`AtomicHistogram`].
pub fn run_atomic<W: Write>(out: &mut W, config: &Config) -> Result<(), BenchError> {
    let mut histogram = AtomicHistogram::new_with_max(
        config.highest_trackable_value,
        config.significant_value_digits,
    )?;
    writeln!(out, "\n\nTiming AtomicHistogram:")?;
    run_scenario(
        out,
        "AtomicHistogram: ",
        &mut histogram,
        config,
        config.atomic_timing_loop_count,
    )
}

/// Run all three scenarios back to back, each against its own fresh histogram.
pub fn run_all<W: Write>(out: &mut W, config: &Config) -> Result<(), BenchError> {
    run_uncontended(out, config)?;
    run_synchronized(out, config)?;
    run_atomic(out, config)
}
