/// Integration tests for the batch anomaly benchmark
///
/// Tests verify:
/// 1. Both strategies find the same anomalies per city
/// 2. Pooled results sorted by city equal the sequential results
/// 3. Cities without readings are reported, not skipped
///
/// Run with: cargo test --test batch_benchmark

use chrono::{Duration, NaiveDate};
use tempmon_service::bench::batch::run_batch_benchmark;
use tempmon_service::bench::schedule::TaskOutcome;
use tempmon_service::bench::Speedup;
use tempmon_service::ingest::csv_table::{load_temperature_csv, TemperatureTable};
use tempmon_service::model::CityAnomalySummary;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Daily readings starting at `start`, one CSV line per value.
fn csv_rows(city: &str, start: NaiveDate, temps: &[f64]) -> String {
    temps
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{},{},{}\n", city, start + Duration::days(i as i64), t))
        .collect()
}

/// A: 40 winter days alternating 10/11 °C with spikes at days 34 and 38.
/// B: 35 spring days cycling 5/6/7 °C, no anomalies.
/// C: 10 days, shorter than the window.
fn build_table() -> TemperatureTable {
    let mut a: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
    a[34] = 40.0;
    a[38] = 40.0;
    let b: Vec<f64> = (0..35).map(|i| 5.0 + (i % 3) as f64).collect();
    let c: Vec<f64> = (0..10).map(|i| 20.0 + i as f64).collect();

    let mut text = String::from("city,timestamp,temperature\n");
    // Interleave cities so per-city slicing is exercised
    text.push_str(&csv_rows("C", NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(), &c));
    text.push_str(&csv_rows("A", NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), &a));
    text.push_str(&csv_rows("B", NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(), &b));

    let table = load_temperature_csv(text.as_bytes()).expect("header is valid");
    table.ensure_valid().expect("all rows are valid");
    table
}

fn cities(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn summaries(outcomes: &[TaskOutcome<CityAnomalySummary>]) -> Vec<CityAnomalySummary> {
    outcomes
        .iter()
        .map(|o| o.output().expect("no task should panic").clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_injected_spikes_found_by_both_strategies() {
    let table = build_table();
    let report = run_batch_benchmark(&table, &cities(&["A"]), 30, 4).unwrap();

    for run in [&report.baseline, &report.contender] {
        let a = summaries(&run.results).remove(0);
        assert_eq!(a.city, "A");
        assert_eq!(a.n_days, 40);
        assert_eq!(a.rolling_anomalies, 2, "{}", run.label);
        assert_eq!(a.season_anomalies, 2, "{}", run.label);
        assert_eq!(a.period_start, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(a.period_end, NaiveDate::from_ymd_opt(2023, 2, 9));
    }
}

#[test]
fn test_parallel_sorted_equals_sequential() {
    let table = build_table();
    let input = cities(&["C", "A", "B"]);
    let report = run_batch_benchmark(&table, &input, 30, 3).unwrap();

    let sequential = summaries(&report.baseline.results);
    let parallel = summaries(&report.contender.results);

    let order: Vec<&str> = sequential.iter().map(|s| s.city.as_str()).collect();
    assert_eq!(order, vec!["C", "A", "B"]);

    let mut sequential_sorted = sequential.clone();
    sequential_sorted.sort_by(|x, y| x.city.cmp(&y.city));
    assert_eq!(parallel, sequential_sorted);

    let b = &parallel[1];
    assert_eq!((b.rolling_anomalies, b.season_anomalies), (0, 0));
    let c = &parallel[2];
    assert_eq!(c.n_days, 10);
    assert_eq!(c.rolling_anomalies, 0);
}

#[test]
fn test_zero_row_city_reports_empty_summary() {
    let table = build_table();
    let report = run_batch_benchmark(&table, &cities(&["A", "Nowhere"]), 30, 2).unwrap();

    for run in [&report.baseline, &report.contender] {
        assert_eq!(run.results.len(), 2);
        let empty = run
            .results
            .iter()
            .find(|o| o.city == "Nowhere")
            .and_then(|o| o.output())
            .unwrap();
        assert_eq!(empty.n_days, 0);
        assert_eq!(empty.rolling_anomalies, 0);
        assert_eq!(empty.season_anomalies, 0);
        assert_eq!(empty.period_start, None);
        assert_eq!(empty.period_end, None);
    }
}

#[test]
fn test_duplicate_cities_and_zero_workers() {
    let table = build_table();
    let report = run_batch_benchmark(&table, &cities(&["B", "A", "B", "A"]), 30, 0).unwrap();
    assert_eq!(report.baseline.results.len(), 2);
    assert_eq!(report.contender.results.len(), 2);
}

#[test]
fn test_anomaly_counts_bounded_by_series_length() {
    let table = build_table();
    for window in [1, 2, 5, 30, 100] {
        let report = run_batch_benchmark(&table, &cities(&["A", "B", "C"]), window, 2).unwrap();
        for s in summaries(&report.contender.results) {
            assert!(s.rolling_anomalies <= s.n_days);
            assert!(s.season_anomalies <= s.n_days);
        }
    }
}

#[test]
fn test_speedup_is_reported() {
    let table = build_table();
    let report = run_batch_benchmark(&table, &cities(&["A", "B", "C"]), 30, 2).unwrap();
    match report.speedup() {
        Speedup::Ratio(r) => assert!(r.is_finite() && r > 0.0),
        Speedup::Undefined => assert!(report.contender.elapsed.is_zero()),
    }
}
