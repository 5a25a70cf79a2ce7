/// Checks of live readings against historical baselines.
///
/// Submodules:
/// - `thresholds` - current temperature vs. the season's mean ± 2σ band.

pub mod thresholds;
