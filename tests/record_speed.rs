//! Scenario runs adapted from HistogramPerfTest.java.
//!
//! The smoke tests run the full protocol at scaled-down loop counts; `full_scale` reproduces the
//! original run (hundreds of millions of recordings plus one-second quiescence pauses) and is
//! ignored by default. Run it with `cargo test --release -- --ignored --nocapture`.

use hdrbench::bench::{self, Config};
use hdrbench::sync::AtomicHistogram;
use hdrbench::Histogram;
use std::time::Duration;

fn small_config() -> Config {
    Config {
        warmup_loop_length: 20_000,
        raw_timing_loop_count: 400_000,
        synchronized_timing_loop_count: 40_000,
        atomic_timing_loop_count: 80_000,
        quiesce: Duration::from_millis(10),
        ..Config::default()
    }
}

fn assert_report_shape(report: &str, label: &str) {
    assert!(report.contains(&format!("Timing {}:", label)));
    assert!(report.contains(&format!("{}: Warmup:", label)));
    assert!(report.contains(&format!("{}: Hot code timing:", label)));
    assert!(report.contains("value recording calls per sec."));
    assert!(report.contains("recorded values per sec."));
}

#[test]
fn uncontended_scenario_completes_and_reports() {
    let mut out = Vec::new();
    bench::run_uncontended(&mut out, &small_config()).unwrap();
    assert_report_shape(&String::from_utf8(out).unwrap(), "Histogram");
}

#[test]
fn synchronized_scenario_completes_and_reports() {
    let mut out = Vec::new();
    bench::run_synchronized(&mut out, &small_config()).unwrap();
    assert_report_shape(&String::from_utf8(out).unwrap(), "SynchronizedHistogram");
}

#[test]
fn atomic_scenario_completes_and_reports() {
    let mut out = Vec::new();
    bench::run_atomic(&mut out, &small_config()).unwrap();
    assert_report_shape(&String::from_utf8(out).unwrap(), "AtomicHistogram");
}

#[test]
fn warmup_loop_records_the_documented_value_pattern() {
    let config = Config::default();
    let mut histogram = Histogram::<u64>::new_with_max(
        config.highest_trackable_value,
        config.significant_value_digits,
    )
    .unwrap();
    bench::record_loop(&mut histogram, &config, config.warmup_loop_length).unwrap();
    // 50_000 calls alternating between 12340 and 12340 + 0x8000 on bit 15 of the index, with an
    // expected interval too large for any backfill.
    assert_eq!(histogram.len(), 50_000);
    let low_count = histogram.count_at(12340);
    let high_count = histogram.count_at(12340 + 0x8000);
    assert!(low_count > 0 && high_count > 0);
    assert_eq!(low_count + high_count, 50_000);
    histogram.reset();
    assert_eq!(histogram.len(), 0);
}

#[test]
fn measurement_total_reflects_measurement_phase_only() {
    let config = small_config();
    let mut histogram = Histogram::<u64>::new_with_max(
        config.highest_trackable_value,
        config.significant_value_digits,
    )
    .unwrap();
    let mut out = Vec::new();
    bench::run_scenario(&mut out, "Histogram: ", &mut histogram, &config, 100_000).unwrap();
    // The default expected interval exceeds every recorded value, so no backfill happens and the
    // total must equal the measurement calls exactly; warm-up recordings were erased by reset.
    assert_eq!(histogram.len(), 100_000);
}

#[test]
fn short_expected_interval_reports_more_entries_than_calls() {
    let config = Config {
        expected_interval: 1_000,
        ..small_config()
    };
    let mut histogram = AtomicHistogram::new_with_max(
        config.highest_trackable_value,
        config.significant_value_digits,
    )
    .unwrap();
    let mut out = Vec::new();
    bench::run_scenario(&mut out, "AtomicHistogram: ", &mut histogram, &config, 10_000).unwrap();
    assert!(histogram.len() > 10_000);
}

#[test]
#[ignore]
fn full_scale() {
    let stdout = std::io::stdout();
    bench::run_all(&mut stdout.lock(), &Config::default()).unwrap();
}
