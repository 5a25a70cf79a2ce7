/// Descriptive statistics for one city's temperature series.

use serde::Serialize;

use crate::model::CitySeries;

use super::stats;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample σ; `None` for a single reading.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Count, mean, σ, extremes and quartiles, or `None` for an empty series.
///
/// Quartiles interpolate linearly between the two nearest ranks.
pub fn describe(series: &CitySeries) -> Option<Describe> {
    let mut temps = series.temperatures();
    let mean = stats::mean(&temps)?;
    let std = stats::sample_std(&temps);
    temps.sort_by(f64::total_cmp);

    Some(Describe {
        count: temps.len(),
        mean,
        std,
        min: temps[0],
        q25: quantile(&temps, 0.25),
        median: quantile(&temps, 0.5),
        q75: quantile(&temps, 0.75),
        max: temps[temps.len() - 1],
    })
}

/// Linear-interpolation quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
