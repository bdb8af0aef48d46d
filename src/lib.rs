/// alarm_flood_service: flood status evaluation over an alarm-count /
/// flood-probability time series.
///
/// # Module structure
///
/// ```text
/// alarm_flood_service
/// ├── model       - shared data types (AlarmRecord, Series, Thresholds, LoadError, …)
/// ├── config      - dashboard configuration loader (dashboard.toml)
/// ├── logging     - leveled, component-tagged console/file logging
/// ├── endpoint    - JSON HTTP API consumed by the dashboard page
/// ├── ingest
/// │   ├── csv       - prediction job output parsing
/// │   ├── loader    - candidate path selection with demo fallback
/// │   ├── synthetic - demo series generation
/// │   └── fixtures (test only) - representative CSV payloads
/// ├── alert
/// │   └── status  - current / historical status snapshot, time to flood
/// └── analysis
///     ├── metrics - confusion matrix and quality scores
///     └── window  - trailing trend window for the chart
/// ```

/// Public modules
pub mod alert;
pub mod analysis;
pub mod config;
pub mod endpoint;
pub mod ingest;
pub mod logging;
pub mod model;
