//! Current-temperature threshold checking.
//!
//! A live temperature is judged against the historical band of the season
//! it was observed in: inside `[mean − 2σ, mean + 2σ]` is normal, outside is
//! anomalous. Without a defined σ the check cannot be made.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::analysis::seasonal;
use crate::model::{Season, SeasonStats};

/// Outcome of comparing a live temperature to its season's band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureStatus {
    Normal,
    Anomalous,
    /// The season has too few readings for a σ.
    Undetermined,
}

impl fmt::Display for TemperatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureStatus::Normal => write!(f, "normal"),
            TemperatureStatus::Anomalous => write!(f, "anomalous"),
            TemperatureStatus::Undetermined => write!(f, "undetermined"),
        }
    }
}

/// A live temperature with the band it was judged against.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureCheck {
    pub city: String,
    pub season: Season,
    pub temperature: f64,
    pub season_mean: f64,
    pub bounds: Option<(f64, f64)>,
    pub status: TemperatureStatus,
}

impl TemperatureCheck {
    pub fn message(&self) -> String {
        match self.bounds {
            Some((lower, upper)) => format!(
                "{}: {:.1} °C is {} for {} (expected {:.1} to {:.1} °C)",
                self.city, self.temperature, self.status, self.season, lower, upper
            ),
            None => format!(
                "{}: {:.1} °C; {} baseline has no spread (mean {:.1} °C)",
                self.city, self.temperature, self.season, self.season_mean
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("no historical {season} readings for {city}")]
    NoSeasonStats { city: String, season: Season },
}

/// Season of the month `now` falls in.
pub fn current_season(now: &DateTime<Utc>) -> Season {
    Season::for_timestamp(now)
}

/// Judge `temperature` against `stats` for `season`.
pub fn check_current_temperature(
    city: &str,
    temperature: f64,
    season: Season,
    stats: &SeasonStats,
) -> Result<TemperatureCheck, ThresholdError> {
    let stat = stats.get(season).ok_or_else(|| ThresholdError::NoSeasonStats {
        city: city.to_string(),
        season,
    })?;

    let band = seasonal::classify(temperature, Some(stat));
    let bounds = band.season_lower.zip(band.season_upper);
    let status = match bounds {
        None => TemperatureStatus::Undetermined,
        Some(_) if band.season_anomaly => TemperatureStatus::Anomalous,
        Some(_) => TemperatureStatus::Normal,
    };

    Ok(TemperatureCheck {
        city: city.to_string(),
        season,
        temperature,
        season_mean: stat.mean,
        bounds,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SeasonStat;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn stats() -> SeasonStats {
        let mut by_season = BTreeMap::new();
        by_season.insert(Season::Winter, SeasonStat { mean: 0.0, std: Some(2.0), count: 90 });
        by_season.insert(Season::Summer, SeasonStat { mean: 25.0, std: None, count: 1 });
        SeasonStats { by_season }
    }

    #[test]
    fn test_current_season_from_month() {
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let oct = Utc.with_ymd_and_hms(2024, 10, 15, 12, 0, 0).unwrap();
        assert_eq!(current_season(&jan), Season::Winter);
        assert_eq!(current_season(&oct), Season::Autumn);
    }

    #[test]
    fn test_within_band_is_normal_including_edges() {
        let check = check_current_temperature("Oslo", 4.0, Season::Winter, &stats()).unwrap();
        assert_eq!(check.status, TemperatureStatus::Normal);
        assert_eq!(check.bounds, Some((-4.0, 4.0)));

        let edge = check_current_temperature("Oslo", -4.0, Season::Winter, &stats()).unwrap();
        assert_eq!(edge.status, TemperatureStatus::Normal);
    }

    #[test]
    fn test_outside_band_is_anomalous() {
        let check = check_current_temperature("Oslo", 9.5, Season::Winter, &stats()).unwrap();
        assert_eq!(check.status, TemperatureStatus::Anomalous);
        assert!(check.message().contains("anomalous for winter"));
    }

    #[test]
    fn test_season_without_std_is_undetermined() {
        let check = check_current_temperature("Oslo", 40.0, Season::Summer, &stats()).unwrap();
        assert_eq!(check.status, TemperatureStatus::Undetermined);
        assert_eq!(check.bounds, None);
    }

    #[test]
    fn test_absent_season_is_error() {
        let result = check_current_temperature("Oslo", 10.0, Season::Spring, &stats());
        assert_eq!(
            result,
            Err(ThresholdError::NoSeasonStats {
                city: "Oslo".to_string(),
                season: Season::Spring
            })
        );
    }
}
