//! Historical batch-analysis benchmark.
//!
//! Runs the rolling and seasonal detectors for every requested city, first
//! one city after another on the calling thread, then one task per city on
//! a bounded worker pool, and reports the per-city anomaly summaries of
//! both runs.

use std::collections::{BTreeMap, HashSet};

use crate::analysis::annotate::analyze_city;
use crate::analysis::groupings::group_by_city;
use crate::ingest::csv_table::TemperatureTable;
use crate::logging::{self, DataSource};
use crate::model::{CityAnomalySummary, CitySeries};

use super::schedule::{CityTask, Serial, TaskOutcome, WorkerPool};
use super::{timed, BenchError, BenchmarkResult, StrategyRun};

pub const SEQUENTIAL_LABEL: &str = "sequential";
pub const PARALLEL_LABEL: &str = "parallel (worker pool)";

/// Baseline is the sequential run in input order, contender the pooled run
/// sorted by city name. One outcome per distinct input city in each.
pub type BatchReport = BenchmarkResult<TaskOutcome<CityAnomalySummary>>;

/// Anomaly counts for one city from pre-sliced series.
pub struct AnomalyTask<'a> {
    series: &'a BTreeMap<String, CitySeries>,
    window: usize,
}

impl<'a> AnomalyTask<'a> {
    pub fn new(series: &'a BTreeMap<String, CitySeries>, window: usize) -> Self {
        AnomalyTask { series, window }
    }
}

impl CityTask for AnomalyTask<'_> {
    type Output = CityAnomalySummary;

    fn run(&self, city: &str) -> CityAnomalySummary {
        match self.series.get(city) {
            Some(series) => analyze_city(series, self.window),
            None => analyze_city(
                &CitySeries {
                    city: city.to_string(),
                    readings: Vec::new(),
                },
                self.window,
            ),
        }
    }
}

/// Run both strategies over `cities` using readings from `table`.
///
/// Duplicate names in `cities` collapse to their first occurrence. A city
/// with no readings reports zero counts and no period. `workers` below 1 is
/// treated as 1. Errors only if the worker pool cannot be built.
pub fn run_batch_benchmark(
    table: &TemperatureTable,
    cities: &[String],
    window: usize,
    workers: usize,
) -> Result<BatchReport, BenchError> {
    let cities = distinct_in_order(cities);
    let pool = WorkerPool::new(workers);
    logging::info(
        DataSource::Benchmark,
        None,
        &format!(
            "Batch benchmark over {} cities, window {}, {} workers",
            cities.len(),
            window.max(1),
            pool.workers()
        ),
    );

    let series = group_by_city(table);
    let task = AnomalyTask::new(&series, window);

    let (baseline_results, baseline_elapsed) = timed(|| Serial.run(&task, &cities));
    log_run_summary(&baseline_results);

    let (contender_results, contender_elapsed) = timed(|| pool.run(&task, &cities));
    let mut contender_results = contender_results?;
    contender_results.sort_by(|a, b| a.city.cmp(&b.city));
    log_run_summary(&contender_results);

    let report = BenchmarkResult {
        baseline: StrategyRun {
            label: SEQUENTIAL_LABEL,
            elapsed: baseline_elapsed,
            results: baseline_results,
        },
        contender: StrategyRun {
            label: PARALLEL_LABEL,
            elapsed: contender_elapsed,
            results: contender_results,
        },
    };
    logging::info(
        DataSource::Benchmark,
        None,
        &format!(
            "Batch: {:.3}s vs {:.3}s, speedup {}",
            report.baseline.seconds(),
            report.contender.seconds(),
            report.speedup()
        ),
    );
    Ok(report)
}

fn distinct_in_order(cities: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    cities
        .iter()
        .filter(|c| seen.insert(c.as_str()))
        .cloned()
        .collect()
}

fn log_run_summary(outcomes: &[TaskOutcome<CityAnomalySummary>]) {
    let ok = outcomes.iter().filter(|o| o.result.is_ok()).count();
    logging::log_benchmark_summary(DataSource::Benchmark, outcomes.len(), ok, outcomes.len() - ok);
}
