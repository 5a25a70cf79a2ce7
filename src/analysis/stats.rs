//! Thin wrappers over `statrs` that turn its NaN results into `None`.

use statrs::statistics::Statistics;

/// Arithmetic mean, `None` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    finite(values.mean())
}

/// Sample standard deviation (N−1 denominator), `None` below two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    finite(values.std_dev())
}

/// `(lower, upper)` at `mean ± k·std`.
pub(crate) fn band(mean: f64, std: f64, k: f64) -> (f64, f64) {
    (mean - k * std, mean + k * std)
}

/// True iff `value` lies strictly outside `[lower, upper]`.
pub(crate) fn outside(value: f64, bounds: Option<(f64, f64)>) -> bool {
    match bounds {
        Some((lower, upper)) => value < lower || value > upper,
        None => false,
    }
}

fn finite(x: f64) -> Option<f64> {
    if x.is_finite() { Some(x) } else { None }
}
