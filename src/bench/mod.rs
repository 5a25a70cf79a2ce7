/// Strategy benchmarks: the same per-city work run two ways and timed.
///
/// Submodules:
/// - `schedule` - per-city task traits and the schedulers that run them.
/// - `fanout`   - live weather for many cities, blocking loop vs. one
///                cooperative event loop.
/// - `batch`    - anomaly counts for many cities, calling thread vs. a
///                bounded worker pool.

pub mod batch;
pub mod fanout;
pub mod schedule;

use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;

/// A benchmark could not start. Per-city failures are never reported here;
/// they are carried in each run's results.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("could not start benchmark runtime: {0}")]
    Runtime(String),
}

/// One strategy's timing and its per-city results.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRun<R> {
    pub label: &'static str,
    pub elapsed: Duration,
    pub results: Vec<R>,
}

impl<R> StrategyRun<R> {
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Baseline vs. contender. `speedup` is baseline time over contender time.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult<R> {
    pub baseline: StrategyRun<R>,
    pub contender: StrategyRun<R>,
}

impl<R> BenchmarkResult<R> {
    pub fn speedup(&self) -> Speedup {
        Speedup::between(self.baseline.elapsed, self.contender.elapsed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Speedup {
    Ratio(f64),
    /// The contender took no measurable time.
    Undefined,
}

impl Speedup {
    pub fn between(baseline: Duration, contender: Duration) -> Speedup {
        let denominator = contender.as_secs_f64();
        if denominator <= 0.0 || !denominator.is_finite() {
            return Speedup::Undefined;
        }
        let ratio = baseline.as_secs_f64() / denominator;
        if ratio.is_finite() {
            Speedup::Ratio(ratio)
        } else {
            Speedup::Undefined
        }
    }

    pub fn ratio(&self) -> Option<f64> {
        match self {
            Speedup::Ratio(r) => Some(*r),
            Speedup::Undefined => None,
        }
    }
}

impl fmt::Display for Speedup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speedup::Ratio(r) => write!(f, "{:.2}x", r),
            Speedup::Undefined => write!(f, "n/a"),
        }
    }
}

/// Run `f` and measure its wall-clock time.
pub(crate) fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}
