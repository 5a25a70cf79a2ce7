/// Core data types for the temperature monitoring service.
///
/// This module defines the shared domain model imported by all other modules:
/// readings and per-city series, the derived anomaly bands, live weather
/// quotes, and the error enums shared across ingest and benchmarking.
/// It contains no I/O.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// Calendar-quarter season bucket.
///
/// Ordered by calendar position (winter first), which is also the order
/// season tables are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];

    /// Maps a calendar month (1-12) to its season.
    ///
    /// 12, 1, 2 → winter; 3, 4, 5 → spring; 6, 7, 8 → summer; everything
    /// else → autumn.
    pub fn from_month(month: u32) -> Season {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn for_timestamp(timestamp: &DateTime<Utc>) -> Season {
        Season::from_month(timestamp.month())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" => Ok(Season::Autumn),
            other => Err(format!("unknown season '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single daily temperature observation for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub city: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64, // °C
    pub season: Season,
}

/// All readings for one city, sorted ascending by timestamp.
///
/// Produced by `analysis::groupings::city_slice`. Missing days are simply
/// absent; duplicate timestamps are kept in input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CitySeries {
    pub city: String,
    pub readings: Vec<Reading>,
}

impl CitySeries {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.temperature).collect()
    }

    /// First and last calendar date covered, or `None` for an empty series.
    pub fn period(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.readings.first()?;
        let last = self.readings.last()?;
        Some((first.timestamp.date_naive(), last.timestamp.date_naive()))
    }
}

// ---------------------------------------------------------------------------
// Derived bands
// ---------------------------------------------------------------------------

/// Trailing-window statistics for one reading, aligned by position with the
/// series it was computed from. All fields are `None` until the window fills.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RollingBand {
    pub roll_mean: Option<f64>,
    pub roll_std: Option<f64>,
    pub roll_upper: Option<f64>,
    pub roll_lower: Option<f64>,
    pub roll_anomaly: bool,
}

/// Whole-series statistics for one season.
///
/// `std` is `None` when fewer than two readings fall in the season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonStat {
    pub mean: f64,
    pub std: Option<f64>,
    pub count: usize,
}

impl SeasonStat {
    /// `(lower, upper)` at mean ± 2σ, if σ is defined.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.std.map(|std| (self.mean - 2.0 * std, self.mean + 2.0 * std))
    }
}

/// Season → statistics lookup for one city. Seasons with no readings have
/// no entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SeasonStats {
    pub by_season: BTreeMap<Season, SeasonStat>,
}

impl SeasonStats {
    pub fn get(&self, season: Season) -> Option<&SeasonStat> {
        self.by_season.get(&season)
    }

    pub fn len(&self) -> usize {
        self.by_season.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_season.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Season, &SeasonStat)> {
        self.by_season.iter()
    }
}

/// Season-wide bounds joined onto one reading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SeasonBand {
    pub season_mean: Option<f64>,
    pub season_std: Option<f64>,
    pub season_upper: Option<f64>,
    pub season_lower: Option<f64>,
    pub season_anomaly: bool,
}

/// Mean temperature for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlyPoint {
    pub year: i32,
    pub temp_mean: f64,
}

/// Per-city result of the anomaly pipeline, as reported by the batch
/// benchmark. Period bounds are `None` for a city with no rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAnomalySummary {
    pub city: String,
    pub n_days: usize,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub rolling_anomalies: usize,
    pub season_anomalies: usize,
}

// ---------------------------------------------------------------------------
// Live weather
// ---------------------------------------------------------------------------

/// A successfully parsed current-weather response.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuote {
    pub city: String,
    pub status_code: String,
    pub temperature: f64,
    pub raw_payload: serde_json::Value,
}

/// Outcome of one live fetch inside a benchmark: `temp` is `None` whenever
/// `error` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuoteResult {
    pub city: String,
    pub temp: Option<f64>,
    pub error: Option<WeatherError>,
}

impl WeatherQuoteResult {
    pub fn from_outcome(city: &str, outcome: Result<WeatherQuote, WeatherError>) -> Self {
        match outcome {
            Ok(quote) => WeatherQuoteResult {
                city: city.to_string(),
                temp: Some(quote.temperature),
                error: None,
            },
            Err(e) => WeatherQuoteResult {
                city: city.to_string(),
                temp: None,
                error: Some(e),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.temp.is_some()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching current weather for a city.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    /// The request never produced a response: timeout, DNS failure,
    /// connection refused, TLS failure.
    #[error("transport error{}: {message}", timeout_tag(.timed_out))]
    Transport { timed_out: bool, message: String },
    /// The endpoint answered but reported a non-success `cod`.
    #[error("API error (cod {code}): {payload}")]
    Api {
        code: String,
        payload: serde_json::Value,
    },
    /// The body was not JSON, or a success body lacked `main.temp`.
    #[error("parse error: {0}")]
    Parse(String),
}

fn timeout_tag(timed_out: &bool) -> &'static str {
    if *timed_out { " (timeout)" } else { "" }
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return WeatherError::Parse(e.to_string());
        }
        WeatherError::Transport {
            timed_out: e.is_timeout(),
            message: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
