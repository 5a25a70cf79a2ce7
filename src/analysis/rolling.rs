/// Trailing-window anomaly detection.
///
/// For each reading, the mean and sample σ of the last `window` readings
/// (itself included) define a band at mean ± 2σ. A reading strictly outside
/// its band is a rolling anomaly. The window counts readings, not days, so
/// gaps in the record stretch it.

use crate::model::{CitySeries, RollingBand};

use super::{stats, BAND_SIGMAS};

/// One band per reading, aligned by position with `series.readings`.
///
/// The first `window − 1` bands are all `None` and never anomalous. A window
/// of 0 is treated as 1, which defines the mean but never σ.
pub fn rolling_band(series: &CitySeries, window: usize) -> Vec<RollingBand> {
    let window = window.max(1);
    let temps = series.temperatures();

    temps
        .iter()
        .enumerate()
        .map(|(i, &temp)| {
            if i + 1 < window {
                return RollingBand::default();
            }
            let slice = &temps[i + 1 - window..=i];
            let mean = stats::mean(slice);
            let std = stats::sample_std(slice);
            let bounds = match (mean, std) {
                (Some(m), Some(s)) => Some(stats::band(m, s, BAND_SIGMAS)),
                _ => None,
            };
            RollingBand {
                roll_mean: mean,
                roll_std: std,
                roll_lower: bounds.map(|(lower, _)| lower),
                roll_upper: bounds.map(|(_, upper)| upper),
                roll_anomaly: stats::outside(temp, bounds),
            }
        })
        .collect()
}

pub fn count_rolling_anomalies(bands: &[RollingBand]) -> usize {
    bands.iter().filter(|b| b.roll_anomaly).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Reading, Season};
    use chrono::{Duration, TimeZone, Utc};

    fn series(temps: &[f64]) -> CitySeries {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        CitySeries {
            city: "Testville".to_string(),
            readings: temps
                .iter()
                .enumerate()
                .map(|(i, &t)| Reading {
                    city: "Testville".to_string(),
                    timestamp: start + Duration::days(i as i64),
                    temperature: t,
                    season: Season::Winter,
                })
                .collect(),
        }
    }

    #[test]
    fn test_warmup_rows_are_undefined_and_quiet() {
        let bands = rolling_band(&series(&[1.0, 2.0, 3.0, 50.0, 2.0]), 3);
        assert_eq!(bands.len(), 5);
        for band in &bands[..2] {
            assert_eq!(*band, RollingBand::default());
        }
        assert_eq!(bands[2].roll_mean, Some(2.0));
        assert_eq!(bands[2].roll_std, Some(1.0));
        assert_eq!(bands[2].roll_upper, Some(4.0));
        assert_eq!(bands[2].roll_lower, Some(0.0));
    }

    #[test]
    fn test_window_includes_current_reading() {
        // A lone spike sits inside its own window, which inflates σ enough
        // that a 3-point window can never flag it.
        let bands = rolling_band(&series(&[1.0, 1.0, 100.0]), 3);
        assert!(!bands[2].roll_anomaly);
    }

    #[test]
    fn test_spike_after_flat_run_is_flagged() {
        let mut temps = vec![10.0, 11.0, 10.0, 11.0, 10.0, 11.0, 10.0, 11.0, 10.0];
        temps.push(40.0);
        let bands = rolling_band(&series(&temps), 10);
        assert!(bands[9].roll_anomaly, "{:?}", bands[9]);
        assert_eq!(count_rolling_anomalies(&bands), 1);
    }

    #[test]
    fn test_constant_series_has_zero_std_and_no_anomaly() {
        let bands = rolling_band(&series(&[5.0; 6]), 4);
        for band in &bands[3..] {
            assert_eq!(band.roll_std, Some(0.0));
            assert_eq!(band.roll_upper, Some(5.0));
            assert_eq!(band.roll_lower, Some(5.0));
            assert!(!band.roll_anomaly);
        }
    }

    #[test]
    fn test_window_longer_than_series_is_all_undefined() {
        let bands = rolling_band(&series(&[1.0, 2.0, 3.0]), 30);
        assert!(bands.iter().all(|b| *b == RollingBand::default()));
    }

    #[test]
    fn test_window_of_one_defines_mean_only() {
        let bands = rolling_band(&series(&[1.0, 9.0]), 1);
        assert_eq!(bands[1].roll_mean, Some(9.0));
        assert_eq!(bands[1].roll_std, None);
        assert_eq!(bands[1].roll_upper, None);
        assert!(!bands[1].roll_anomaly);
    }

    #[test]
    fn test_window_of_zero_is_clamped_to_one() {
        let s = series(&[1.0, 9.0]);
        assert_eq!(rolling_band(&s, 0), rolling_band(&s, 1));
    }

    #[test]
    fn test_empty_series_gives_no_bands() {
        assert!(rolling_band(&CitySeries::default(), 5).is_empty());
    }

    #[test]
    fn test_rolling_band_is_idempotent() {
        let s = series(&[3.0, 4.0, 8.0, 2.0, 5.0, 30.0, 4.0, 3.0]);
        assert_eq!(rolling_band(&s, 4), rolling_band(&s, 4));
    }
}
