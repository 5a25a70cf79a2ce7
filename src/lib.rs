//! tempmon_service: per-city temperature anomaly analysis and concurrency
//! benchmarks over live weather data.
//!
//! # Module structure
//!
//! ```text
//! tempmon_service
//! ├── model       - shared data types (Reading, CitySeries, RollingBand, WeatherError, …)
//! ├── config      - TOML settings and the OpenWeather access key
//! ├── logging     - tracing setup, source tags, failure classification
//! ├── ingest
//! │   ├── csv_table   - temperature CSV loading with per-row error capture
//! │   ├── openweather - current-weather API: blocking + async fetch, JSON parsing
//! │   └── fixtures (test only) - representative payloads
//! ├── analysis
//! │   ├── groupings - per-city series sorted by time
//! │   ├── rolling   - trailing-window anomaly band
//! │   ├── seasonal  - per-season anomaly band
//! │   ├── yearly    - calendar-year means
//! │   ├── summary   - descriptive statistics
//! │   └── annotate  - both detectors for one city + anomaly summary
//! ├── alert
//! │   └── thresholds - live temperature vs. the season band
//! └── bench
//!     ├── schedule - per-city tasks; serial, worker-pool and event-loop schedulers
//!     ├── fanout   - blocking vs. event-loop live fetch
//!     └── batch    - sequential vs. pooled anomaly analysis
//! ```

pub mod alert;
pub mod analysis;
pub mod bench;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
