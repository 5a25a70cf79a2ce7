/// Time-series analysis for the temperature monitoring service.
///
/// Every function here is a pure function of a `CitySeries` plus scalar
/// parameters. Nothing reads files or the network.
///
/// Submodules:
/// - `groupings` - slices the loaded table into per-city series sorted by time.
/// - `rolling`   - trailing-window mean ± 2σ band and anomaly flags.
/// - `seasonal`  - whole-series per-season band and anomaly flags.
/// - `yearly`    - calendar-year means.
/// - `summary`   - descriptive statistics for one city.
/// - `annotate`  - runs both detectors for one city and summarizes the result.

pub mod annotate;
pub mod groupings;
pub mod rolling;
pub mod seasonal;
pub mod summary;
pub mod yearly;

mod stats;

/// Multiplier applied to σ when building anomaly bands.
pub const BAND_SIGMAS: f64 = 2.0;
