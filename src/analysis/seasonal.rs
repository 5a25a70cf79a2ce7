/// Season-wide anomaly detection.
///
/// Statistics are computed once per season over the whole series, then
/// joined back onto each reading through the season lookup. A reading
/// strictly outside its season's mean ± 2σ is a seasonal anomaly.

use std::collections::BTreeMap;

use crate::model::{CitySeries, Season, SeasonBand, SeasonStat, SeasonStats};

use super::{stats, BAND_SIGMAS};

/// Mean, sample σ and count for every season present in `series`.
pub fn season_stats(series: &CitySeries) -> SeasonStats {
    let mut groups: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for reading in &series.readings {
        groups
            .entry(reading.season)
            .or_default()
            .push(reading.temperature);
    }

    let by_season = groups
        .into_iter()
        .filter_map(|(season, temps)| {
            let mean = stats::mean(&temps)?;
            let stat = SeasonStat {
                mean,
                std: stats::sample_std(&temps),
                count: temps.len(),
            };
            Some((season, stat))
        })
        .collect();

    SeasonStats { by_season }
}

/// Band for a single temperature against its season's statistics.
///
/// A missing season, or one whose σ is undefined, gives no bounds and no
/// anomaly.
pub fn classify(temperature: f64, stat: Option<&SeasonStat>) -> SeasonBand {
    let Some(stat) = stat else {
        return SeasonBand::default();
    };
    let bounds = stat.std.map(|std| stats::band(stat.mean, std, BAND_SIGMAS));
    SeasonBand {
        season_mean: Some(stat.mean),
        season_std: stat.std,
        season_lower: bounds.map(|(lower, _)| lower),
        season_upper: bounds.map(|(_, upper)| upper),
        season_anomaly: stats::outside(temperature, bounds),
    }
}

/// One band per reading, aligned by position with `series.readings`.
pub fn season_band(series: &CitySeries, season_stats: &SeasonStats) -> Vec<SeasonBand> {
    series
        .readings
        .iter()
        .map(|r| classify(r.temperature, season_stats.get(r.season)))
        .collect()
}

pub fn count_season_anomalies(bands: &[SeasonBand]) -> usize {
    bands.iter().filter(|b| b.season_anomaly).count()
}
