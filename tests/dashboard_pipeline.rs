/// Integration tests for the load → evaluate → serve pipeline
///
/// These tests verify:
/// 1. A prediction job output file is picked up from the candidate list
/// 2. Stored prediction/label columns are ignored in favour of recomputed labels
/// 3. The JSON routes answer with the expected status, metrics and trend
/// 4. Missing data files fall back to the demo series
///
/// Run with: cargo test --test dashboard_pipeline

use alarm_flood_service::config::{parse_config, DashboardConfig};
use alarm_flood_service::endpoint::{build_dashboard, route, DashboardQuery, DashboardState};
use alarm_flood_service::ingest::loader::{load_series, SeriesSource};

use std::fs;

// Last row carries prediccion_flood=1 although 0.58 < 0.6
const JOB_OUTPUT: &str = "timestamp,active_alarms,probabilidad_flood,prediccion_flood,flood_actual
2025-01-01 00:00:00,180,0.12,0,0
2025-01-01 00:30:00,195,0.31,0,0
2025-01-01 01:00:00,214,0.47,0,0
2025-01-01 01:30:00,231,0.66,1,1
garbage,xx,0.5,0,0
2025-01-01 02:00:00,248,0.74,1,1
2025-01-01 02:30:00,226,0.58,1,0
";

fn state_from_file(config: DashboardConfig) -> (tempfile::TempDir, DashboardState) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("salida_predicciones.csv");
    fs::write(&path, JOB_OUTPUT).expect("write fixture");

    let loaded = load_series(&[dir.path().join("prueba.csv"), path]);
    (dir, DashboardState::new(loaded, config))
}

#[test]
fn test_loads_file_and_counts_rejected_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("salida_predicciones.csv");
    fs::write(&path, JOB_OUTPUT).expect("write fixture");

    let loaded = load_series(&[path.clone()]);
    assert_eq!(loaded.source, SeriesSource::File(path));
    assert_eq!(loaded.series.len(), 6);
    assert_eq!(loaded.skipped_rows, 1);
}

#[test]
fn test_status_recomputes_labels_from_thresholds() {
    let (_dir, state) = state_from_file(DashboardConfig::default());

    let (status, body) = route(&state, "/status");
    assert_eq!(status, 200);
    assert_eq!(body["active_alarms"], 226);
    assert_eq!(body["predicted"], false, "stored prediction column is ignored");
    assert_eq!(body["actual"], true);
    assert_eq!(body["risk"], "MEDIUM");
    assert_eq!(body["alert"], "NORMAL");
    assert_eq!(body["time_to_flood_text"], "Not forecast");

    let (_, body) = route(&state, "/status?prob_threshold=0.55");
    assert_eq!(body["alert"], "ALERT");
    assert_eq!(body["time_to_flood"]["kind"], "IMMINENT");
    assert_eq!(body["time_to_flood_text"], "Imminent");
}

#[test]
fn test_status_at_historical_instant() {
    let (_dir, state) = state_from_file(DashboardConfig::default());

    let (status, body) = route(&state, "/status?at=2025-01-01T01:10:00Z");
    assert_eq!(status, 200);
    assert_eq!(body["active_alarms"], 214);
    assert_eq!(body["time_to_flood_text"], "0.5 hours");
}

#[test]
fn test_metrics_over_loaded_file() {
    let (_dir, state) = state_from_file(DashboardConfig::default());

    let (status, body) = route(&state, "/metrics");
    assert_eq!(status, 200);
    assert_eq!(body["counts"]["true_positives"], 2);
    assert_eq!(body["counts"]["true_negatives"], 3);
    assert_eq!(body["counts"]["false_positives"], 0);
    assert_eq!(body["counts"]["false_negatives"], 1);
    assert_eq!(body["formatted"]["accuracy"], "83.33%");
    assert_eq!(body["formatted"]["precision"], "100.00%");
    assert_eq!(body["formatted"]["recall"], "66.67%");
    assert_eq!(body["formatted"]["f1"], "80.00%");
}

#[test]
fn test_configured_thresholds_apply_by_default() {
    let config = parse_config("[thresholds]\nprobability = 0.55\nalarms = 240\n").expect("valid config");
    let (_dir, state) = state_from_file(config);

    let dashboard = build_dashboard(&state, &DashboardQuery::default()).expect("data present");
    assert!(dashboard.status.snapshot.predicted);
    assert!(!dashboard.status.snapshot.actual);
    assert_eq!(dashboard.trend.alarm_threshold, 240);
    assert_eq!(dashboard.metrics.thresholds.alarms, 240);
    assert_eq!(dashboard.records, 6);
    assert!(!dashboard.demo_data);
}

#[test]
fn test_trend_window_over_short_file() {
    let (_dir, state) = state_from_file(DashboardConfig::default());

    let (status, body) = route(&state, "/trend?hours=6");
    assert_eq!(status, 200);
    let points = body["points"].as_array().expect("points array");
    assert_eq!(points.len(), 6, "shorter series is returned whole");
    assert_eq!(points[0]["active_alarms"], 180);
    assert_eq!(body["summary"]["max_alarms"], 248);
    assert_eq!(body["summary"]["min_alarms"], 180);
}

#[test]
fn test_demo_fallback_when_no_file_exists() {
    let dir = tempfile::tempdir().expect("temp dir");
    let loaded = load_series(&[dir.path().join("missing.csv")]);
    let state = DashboardState::new(loaded, DashboardConfig::default());

    let (status, body) = route(&state, "/dashboard");
    assert_eq!(status, 200);
    assert_eq!(body["demo_data"], true);
    assert_eq!(body["records"], 100);
    assert_eq!(body["trend"]["points"].as_array().map(|p| p.len()), Some(48));

    let (_, health) = route(&state, "/health");
    assert_eq!(health["source"], "demo data");
}
