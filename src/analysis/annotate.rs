/// Runs both anomaly detectors over one city and summarizes the result.

use crate::logging::{self, DataSource};
use crate::model::{CityAnomalySummary, CitySeries, Reading, RollingBand, SeasonBand, SeasonStats};

use super::rolling::{count_rolling_anomalies, rolling_band};
use super::seasonal::{count_season_anomalies, season_band, season_stats};

/// A city series with both bands attached, aligned by position.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSeries {
    pub series: CitySeries,
    pub window: usize,
    pub rolling: Vec<RollingBand>,
    pub season_stats: SeasonStats,
    pub seasonal: Vec<SeasonBand>,
}

impl AnnotatedSeries {
    pub fn rolling_anomalies(&self) -> usize {
        count_rolling_anomalies(&self.rolling)
    }

    pub fn season_anomalies(&self) -> usize {
        count_season_anomalies(&self.seasonal)
    }

    /// Reading-by-reading view of the two bands.
    pub fn rows(&self) -> impl Iterator<Item = (&Reading, &RollingBand, &SeasonBand)> {
        self.series
            .readings
            .iter()
            .zip(&self.rolling)
            .zip(&self.seasonal)
            .map(|((reading, roll), season)| (reading, roll, season))
    }

    pub fn summary(&self) -> CityAnomalySummary {
        summarize(&self.series, &self.rolling, &self.seasonal)
    }
}

/// Attach rolling bands (over `window` readings) and seasonal bands.
pub fn annotate(series: CitySeries, window: usize) -> AnnotatedSeries {
    let rolling = rolling_band(&series, window);
    let season_stats = season_stats(&series);
    let seasonal = season_band(&series, &season_stats);

    let annotated = AnnotatedSeries {
        window: window.max(1),
        rolling,
        season_stats,
        seasonal,
        series,
    };
    logging::debug(
        DataSource::Analysis,
        Some(&annotated.series.city),
        &format!(
            "{} readings, window {}: {} rolling / {} seasonal anomalies",
            annotated.series.len(),
            annotated.window,
            annotated.rolling_anomalies(),
            annotated.season_anomalies()
        ),
    );
    annotated
}

/// Anomaly counts and period for one city. An empty series yields zero
/// counts and no period.
pub fn analyze_city(series: &CitySeries, window: usize) -> CityAnomalySummary {
    let rolling = rolling_band(series, window);
    let seasonal = season_band(series, &season_stats(series));
    summarize(series, &rolling, &seasonal)
}

fn summarize(
    series: &CitySeries,
    rolling: &[RollingBand],
    seasonal: &[SeasonBand],
) -> CityAnomalySummary {
    let period = series.period();
    CityAnomalySummary {
        city: series.city.clone(),
        n_days: series.len(),
        period_start: period.map(|(start, _)| start),
        period_end: period.map(|(_, end)| end),
        rolling_anomalies: count_rolling_anomalies(rolling),
        season_anomalies: count_season_anomalies(seasonal),
    }
}
