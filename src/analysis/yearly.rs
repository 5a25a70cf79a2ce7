/// Calendar-year mean temperature.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::model::{CitySeries, YearlyPoint};

use super::stats;

/// Mean temperature per calendar year, ascending by year. Years with no
/// readings do not appear.
pub fn yearly_profile(series: &CitySeries) -> Vec<YearlyPoint> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for reading in &series.readings {
        by_year
            .entry(reading.timestamp.year())
            .or_default()
            .push(reading.temperature);
    }

    by_year
        .into_iter()
        .filter_map(|(year, temps)| {
            stats::mean(&temps).map(|temp_mean| YearlyPoint { year, temp_mean })
        })
        .collect()
}
