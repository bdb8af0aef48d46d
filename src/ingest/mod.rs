/// Series ingestion for the alarm flood dashboard.
///
/// Submodules:
/// - `csv`       - parses the prediction job's CSV output into a `Series`
/// - `loader`    - tries candidate paths in order, falls back to demo data
/// - `synthetic` - pseudo-random demo series used when no file is usable
/// - `fixtures` (test only) - representative CSV payloads
///
/// Everything downstream of this module receives a sorted `Series` with
/// validated fields; the evaluator does not re-check ranges.

pub mod csv;
pub mod loader;
pub mod synthetic;

#[cfg(test)]
pub(crate) mod fixtures;
