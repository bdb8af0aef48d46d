/// Alert evaluation for the alarm flood dashboard.
///
/// Submodules:
/// - `status` - current (or historical) alarm status, risk tier and
///   time-to-next-predicted-flood for a single record of the series.

pub mod status;
