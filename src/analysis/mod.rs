/// Series-wide analysis for the alarm flood dashboard.
///
/// Submodules:
/// - `metrics` - recomputed labels, confusion counts and quality scores.
/// - `window`  - trailing trend window selection and summary statistics.
///
/// Gap detection and resampling are not done here; windows are plain
/// contiguous slices of the sorted series.

pub mod metrics;
pub mod window;
