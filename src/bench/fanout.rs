//! Live-weather fan-out benchmark.
//!
//! Fetches current weather for every city twice: once with blocking calls
//! one after another, once with every request in flight together on a
//! single-threaded event loop. Failures are recorded per city and never
//! stop the run.

use crate::config::WeatherEndpoint;
use crate::ingest::openweather::{
    build_async_client, build_blocking_client, fetch_current, fetch_current_blocking,
};
use crate::logging::{self, DataSource};
use crate::model::WeatherQuoteResult;

use super::schedule::{AsyncCityTask, CityTask, Cooperative, Serial, TaskOutcome};
use super::{timed, BenchError, BenchmarkResult, StrategyRun};

pub const SEQUENTIAL_LABEL: &str = "sequential (blocking)";
pub const CONCURRENT_LABEL: &str = "concurrent (event loop)";

/// Baseline is the blocking loop, contender the event loop. Both hold one
/// outcome per input city, in input order.
pub type FanoutReport = BenchmarkResult<TaskOutcome<WeatherQuoteResult>>;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub struct BlockingWeatherTask<'a> {
    client: reqwest::blocking::Client,
    endpoint: &'a WeatherEndpoint,
    api_key: &'a str,
}

impl CityTask for BlockingWeatherTask<'_> {
    type Output = WeatherQuoteResult;

    fn run(&self, city: &str) -> WeatherQuoteResult {
        let outcome = fetch_current_blocking(&self.client, self.endpoint, city, self.api_key);
        if let Err(e) = &outcome {
            logging::log_weather_failure(city, "blocking fetch", e);
        }
        WeatherQuoteResult::from_outcome(city, outcome)
    }
}

/// Shares one pooled client across every request of a run.
pub struct AsyncWeatherTask<'a> {
    client: reqwest::Client,
    endpoint: &'a WeatherEndpoint,
    api_key: &'a str,
}

impl AsyncCityTask for AsyncWeatherTask<'_> {
    type Output = WeatherQuoteResult;

    async fn run(&self, city: &str) -> WeatherQuoteResult {
        let outcome = fetch_current(&self.client, self.endpoint, city, self.api_key).await;
        if let Err(e) = &outcome {
            logging::log_weather_failure(city, "async fetch", e);
        }
        WeatherQuoteResult::from_outcome(city, outcome)
    }
}

// ---------------------------------------------------------------------------
// Benchmark
// ---------------------------------------------------------------------------

/// Run both strategies over `cities`.
///
/// Must be called from outside any async runtime: the blocking strategy
/// blocks the calling thread and the event-loop strategy starts its own
/// runtime. Errors only if a client or the runtime cannot be built.
pub fn run_fanout_benchmark(
    cities: &[String],
    api_key: &str,
    endpoint: &WeatherEndpoint,
) -> Result<FanoutReport, BenchError> {
    logging::info(
        DataSource::Benchmark,
        None,
        &format!("Fan-out benchmark over {} cities", cities.len()),
    );

    let blocking = BlockingWeatherTask {
        client: build_blocking_client(endpoint).map_err(|e| BenchError::Runtime(e.to_string()))?,
        endpoint,
        api_key,
    };
    let (baseline_results, baseline_elapsed) = timed(|| Serial.run(&blocking, cities));
    drop(blocking);
    log_run_summary(&baseline_results);

    let concurrent = AsyncWeatherTask {
        client: build_async_client(endpoint).map_err(|e| BenchError::Runtime(e.to_string()))?,
        endpoint,
        api_key,
    };
    let (contender_results, contender_elapsed) = timed(|| Cooperative.run(&concurrent, cities));
    drop(concurrent);
    let contender_results = contender_results?;
    log_run_summary(&contender_results);

    let report = BenchmarkResult {
        baseline: StrategyRun {
            label: SEQUENTIAL_LABEL,
            elapsed: baseline_elapsed,
            results: baseline_results,
        },
        contender: StrategyRun {
            label: CONCURRENT_LABEL,
            elapsed: contender_elapsed,
            results: contender_results,
        },
    };
    logging::info(
        DataSource::Benchmark,
        None,
        &format!(
            "Fan-out: {:.3}s vs {:.3}s, speedup {}",
            report.baseline.seconds(),
            report.contender.seconds(),
            report.speedup()
        ),
    );
    Ok(report)
}

/// Outcomes whose fetch returned a temperature.
pub fn successful(outcomes: &[TaskOutcome<WeatherQuoteResult>]) -> usize {
    outcomes
        .iter()
        .filter(|o| o.output().is_some_and(WeatherQuoteResult::is_success))
        .count()
}

fn log_run_summary(outcomes: &[TaskOutcome<WeatherQuoteResult>]) {
    let ok = successful(outcomes);
    logging::log_benchmark_summary(DataSource::Benchmark, outcomes.len(), ok, outcomes.len() - ok);
}
