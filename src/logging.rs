/// Structured logging for the temperature monitoring service
///
/// Provides context-rich logging tagged with the data source and, where
/// relevant, the city being processed. Output goes to stderr and optionally
/// to an append-mode log file. Events are emitted through `tracing`, so any
/// subscriber installed by an embedding application also receives them.

use std::fmt;
use std::fs::OpenOptions;
use std::str::FromStr;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::ingest::csv_table::RowError;
use crate::model::WeatherError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Directive used when `RUST_LOG` is not set.
    fn directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Csv,
    OpenWeather,
    Analysis,
    Benchmark,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Csv => write!(f, "CSV"),
            DataSource::OpenWeather => write!(f, "OWM"),
            DataSource::Analysis => write!(f, "ANALYSIS"),
            DataSource::Benchmark => write!(f, "BENCH"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the city is unknown to the weather service
    Expected,
    /// Unexpected failure - bad key, service degradation, network trouble
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Initialization
// ---------------------------------------------------------------------------

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `min_level` when set. Calling this a second time is
/// a no-op: the first subscriber stays installed.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> std::io::Result<()> {
    let console: Box<dyn Layer<Registry> + Send + Sync> = if console_timestamps {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .without_time()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.directive()));

    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .with(filter)
        .try_init();

    Ok(())
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(source: DataSource, city: Option<&str>, message: &str) {
    tracing::info!(source = %source, city = city.unwrap_or("-"), "{}", message);
}

/// Log a warning message
pub fn warn(source: DataSource, city: Option<&str>, message: &str) {
    tracing::warn!(source = %source, city = city.unwrap_or("-"), "{}", message);
}

/// Log an error message
pub fn error(source: DataSource, city: Option<&str>, message: &str) {
    tracing::error!(source = %source, city = city.unwrap_or("-"), "{}", message);
}

/// Log a debug message
pub fn debug(source: DataSource, city: Option<&str>, message: &str) {
    tracing::debug!(source = %source, city = city.unwrap_or("-"), "{}", message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a live weather failure.
///
/// A `cod` of 404 means the service does not know the city, which is a
/// data problem rather than a service problem. An unreadable body may come
/// from the service or from something in between, so it stays unknown.
pub fn classify_weather_failure(err: &WeatherError) -> FailureType {
    match err {
        WeatherError::Api { code, .. } if code == "404" => FailureType::Expected,
        WeatherError::Api { .. } => FailureType::Unexpected,
        WeatherError::Transport { .. } => FailureType::Unexpected,
        WeatherError::Parse(_) => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a live weather failure with automatic classification
pub fn log_weather_failure(city: &str, operation: &str, err: &WeatherError) {
    let failure_type = classify_weather_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(DataSource::OpenWeather, Some(city), &message),
        FailureType::Unexpected => error(DataSource::OpenWeather, Some(city), &message),
        FailureType::Unknown => warn(DataSource::OpenWeather, Some(city), &message),
    }
}

/// Log every rejected CSV row, then a one-line total.
pub fn log_row_errors(errors: &[RowError]) {
    for e in errors {
        warn(
            DataSource::Csv,
            e.city.as_deref(),
            &format!("line {}: {}", e.line, e.message),
        );
    }
    if !errors.is_empty() {
        error(
            DataSource::Csv,
            None,
            &format!("{} row(s) rejected during load", errors.len()),
        );
    }
}

// ---------------------------------------------------------------------------
// Benchmark Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one benchmark strategy run
pub fn log_benchmark_summary(source: DataSource, total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Run complete: {}/{} successful, {} failed",
        successful, total, failed
    );

    if failed == 0 {
        info(source, None, &message);
    } else if successful == 0 {
        error(source, None, &message);
    } else {
        warn(source, None, &message);
    }
}
