//! CSV ingest and normalization for daily temperature tables.
//!
//! Turns a `city,timestamp,temperature[,season]` CSV into typed `Reading`s.
//! The whole file is loaded into memory. Rows that cannot be parsed are
//! never silently dropped: each one becomes a `RowError` carrying its line
//! number, and callers must check `TemperatureTable::ensure_valid` before
//! handing the table to the analysis code.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::StringRecord;
use thiserror::Error;

use crate::model::{Reading, Season};

const COL_CITY: &str = "city";
const COL_TIMESTAMP: &str = "timestamp";
const COL_TEMPERATURE: &str = "temperature";
const COL_SEASON: &str = "season";

/// Naive formats tried in order after RFC 3339.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not open CSV: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("required column '{0}' is missing")]
    MissingColumn(String),
    #[error("{count} invalid row(s), first at line {first_line}: {message}")]
    InvalidRows {
        count: usize,
        first_line: usize,
        message: String,
    },
    #[error("CSV contains no readings")]
    Empty,
}

/// What was wrong with a rejected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowErrorKind {
    Malformed,
    City,
    Timestamp,
    Temperature,
    Season,
}

/// A row-level problem found during load.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number in the file (the header is line 1).
    pub line: usize,
    pub city: Option<String>,
    pub kind: RowErrorKind,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Loaded table
// ---------------------------------------------------------------------------

/// Every parsed reading of a CSV, in file order, plus the rows that failed.
#[derive(Debug, Clone, Default)]
pub struct TemperatureTable {
    pub readings: Vec<Reading>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl TemperatureTable {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Distinct city names, sorted.
    pub fn cities(&self) -> Vec<String> {
        self.readings
            .iter()
            .map(|r| r.city.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn has_invalid_timestamps(&self) -> bool {
        self.row_errors
            .iter()
            .any(|e| e.kind == RowErrorKind::Timestamp)
    }

    /// Fails if any row was rejected, or if there is nothing to analyze.
    /// Analysis assumes a table that passed.
    pub fn ensure_valid(&self) -> Result<(), IngestError> {
        match self.row_errors.first() {
            None if self.readings.is_empty() => Err(IngestError::Empty),
            None => Ok(()),
            Some(first) => Err(IngestError::InvalidRows {
                count: self.row_errors.len(),
                first_line: first.line,
                message: first.message.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn load_temperature_csv_path(path: &Path) -> Result<TemperatureTable, IngestError> {
    let file = File::open(path)?;
    load_temperature_csv(file)
}

/// Load a temperature CSV from any reader.
///
/// Fails only when the header cannot be read or a required column is
/// missing. Everything else is recorded per row.
pub fn load_temperature_csv<R: Read>(reader: R) -> Result<TemperatureTable, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);

    let column = |name: &str| -> Result<usize, IngestError> {
        header_map
            .get(name)
            .copied()
            .ok_or_else(|| IngestError::MissingColumn(name.to_string()))
    };
    let columns = Columns {
        city: column(COL_CITY)?,
        timestamp: column(COL_TIMESTAMP)?,
        temperature: column(COL_TEMPERATURE)?,
        season: header_map.get(COL_SEASON).copied(),
    };

    let mut table = TemperatureTable::default();

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, which is line 1
        let line = idx + 2;
        table.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                table.row_errors.push(RowError {
                    line,
                    city: None,
                    kind: RowErrorKind::Malformed,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &columns) {
            Ok(reading) => table.readings.push(reading),
            Err((kind, city, message)) => table.row_errors.push(RowError {
                line,
                city,
                kind,
                message,
            }),
        }
    }

    Ok(table)
}

struct Columns {
    city: usize,
    timestamp: usize,
    temperature: usize,
    season: Option<usize>,
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

type RowFailure = (RowErrorKind, Option<String>, String);

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<Reading, RowFailure> {
    let field = |idx: usize| record.get(idx).unwrap_or("").trim();

    let city = field(columns.city);
    if city.is_empty() {
        return Err((RowErrorKind::City, None, "empty city".to_string()));
    }
    let city_owned = Some(city.to_string());

    let raw_ts = field(columns.timestamp);
    let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
        (
            RowErrorKind::Timestamp,
            city_owned.clone(),
            format!("unparseable timestamp '{}'", raw_ts),
        )
    })?;

    let raw_temp = field(columns.temperature);
    let temperature = raw_temp
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| {
            (
                RowErrorKind::Temperature,
                city_owned.clone(),
                format!("non-numeric temperature '{}'", raw_temp),
            )
        })?;

    let season = match columns.season.map(field).filter(|s| !s.is_empty()) {
        Some(label) => label
            .parse::<Season>()
            .map_err(|e| (RowErrorKind::Season, city_owned.clone(), e))?,
        None => Season::for_timestamp(&timestamp),
    };

    Ok(Reading {
        city: city.to_string(),
        timestamp,
        temperature,
        season,
    })
}

/// Parse a timestamp cell. Offsets are converted to UTC; naive values are
/// taken as UTC. A bare date is midnight.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
