/// HTTP endpoint serving dashboard data as JSON
///
/// Provides a small read-only API for the rendering layer. The series is
/// loaded once at startup and shared between worker threads; thresholds
/// come from each request's query string (falling back to the configured
/// defaults), so concurrent sessions with different settings never see
/// each other's labels.
///
/// Endpoints:
/// - GET /health    - Service health check
/// - GET /status    - Status snapshot (latest record, or `at` cursor)
/// - GET /metrics   - Confusion matrix and quality scores
/// - GET /trend     - Trailing trend window for the chart
/// - GET /dashboard - status + metrics + trend in one response
///
/// Query parameters: `prob_threshold`, `alarm_threshold`, `hours`, `at`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use threadpool::ThreadPool;

use crate::alert::status::{current_status, status_as_of, StatusSnapshot};
use crate::analysis::metrics::{confusion_and_scores, ConfusionShares, FormattedScores, QualityReport};
use crate::analysis::window::{trend, TrendView};
use crate::config::DashboardConfig;
use crate::ingest::csv::parse_timestamp;
use crate::ingest::loader::{LoadedSeries, SeriesSource};
use crate::logging::{self, Component};
use crate::model::{EvalError, Series, ThresholdError, Thresholds, WINDOW_HOURS_CHOICES};

const SERVICE_NAME: &str = "alarm_flood_service";
const AVAILABLE_ENDPOINTS: [&str; 5] = ["/health", "/status", "/metrics", "/trend", "/dashboard"];

// ---------------------------------------------------------------------------
// Shared State
// ---------------------------------------------------------------------------

/// Read-only state shared by all request handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub series: Series,
    pub source: SeriesSource,
    pub config: DashboardConfig,
}

impl DashboardState {
    pub fn new(loaded: LoadedSeries, config: DashboardConfig) -> Self {
        Self {
            series: loaded.series,
            source: loaded.source,
            config,
        }
    }
}

// ---------------------------------------------------------------------------
// Query Parsing
// ---------------------------------------------------------------------------

/// Per-request overrides parsed from the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardQuery {
    pub prob_threshold: Option<f64>,
    pub alarm_threshold: Option<u32>,
    pub hours: Option<u32>,
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// A parameter value could not be decoded or parsed
    InvalidParameter { name: String, value: String },
    InvalidThresholds(ThresholdError),
    /// `hours` outside the offered window lengths
    InvalidWindowHours(u32),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidParameter { name, value } => {
                write!(f, "Invalid value '{}' for parameter '{}'", value, name)
            }
            QueryError::InvalidThresholds(e) => write!(f, "{}", e),
            QueryError::InvalidWindowHours(h) => {
                write!(f, "Invalid hours {}: expected one of {:?}", h, WINDOW_HOURS_CHOICES)
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// Parses a raw query string (without the leading `?`). Unknown parameters
/// are ignored.
pub fn parse_query(query: &str) -> Result<DashboardQuery, QueryError> {
    let mut parsed = DashboardQuery::default();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_name, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = decode(raw_name, raw_name)?;
        let value = decode(&name, raw_value)?;

        match name.as_str() {
            "prob_threshold" => parsed.prob_threshold = Some(parse_param(&name, &value)?),
            "alarm_threshold" => parsed.alarm_threshold = Some(parse_param(&name, &value)?),
            "hours" => parsed.hours = Some(parse_param(&name, &value)?),
            "at" => {
                parsed.at = Some(parse_timestamp(&value).ok_or_else(|| invalid(&name, &value))?)
            }
            _ => {}
        }
    }

    Ok(parsed)
}

/// Form decoding: `+` is a space, then percent escapes are resolved.
fn decode(name: &str, raw: &str) -> Result<String, QueryError> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(|s| s.into_owned())
        .map_err(|_| invalid(name, raw))
}

fn parse_param<T: FromStr>(name: &str, value: &str) -> Result<T, QueryError> {
    value.parse().map_err(|_| invalid(name, value))
}

fn invalid(name: &str, value: &str) -> QueryError {
    QueryError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    }
}

impl DashboardQuery {
    /// Request thresholds, falling back to the configured defaults.
    pub fn thresholds(&self, defaults: &Thresholds) -> Result<Thresholds, QueryError> {
        Thresholds::new(
            self.prob_threshold.unwrap_or(defaults.probability),
            self.alarm_threshold.unwrap_or(defaults.alarms),
        )
        .map_err(QueryError::InvalidThresholds)
    }

    /// Requested trend window, falling back to the configured length.
    pub fn window_hours(&self, default_hours: u32) -> Result<u32, QueryError> {
        let hours = self.hours.unwrap_or(default_hours);
        if WINDOW_HOURS_CHOICES.contains(&hours) {
            Ok(hours)
        } else {
            Err(QueryError::InvalidWindowHours(hours))
        }
    }
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Status snapshot plus display strings for the status cards
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
    pub probability_text: String,
    pub risk_text: String,
    pub flood_occurring_text: String,
    pub time_to_flood_text: String,
}

impl From<StatusSnapshot> for StatusResponse {
    fn from(snapshot: StatusSnapshot) -> Self {
        StatusResponse {
            probability_text: snapshot.probability_text(),
            risk_text: snapshot.risk.to_string(),
            flood_occurring_text: if snapshot.actual { "YES" } else { "NO" }.to_string(),
            time_to_flood_text: snapshot.time_to_flood.to_string(),
            snapshot,
        }
    }
}

/// Confusion matrix, cell shares and scores
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub thresholds: Thresholds,
    #[serde(flatten)]
    pub report: QualityReport,
    pub total_records: usize,
    pub shares: ConfusionShares,
    pub formatted: FormattedScores,
}

impl MetricsResponse {
    fn new(report: QualityReport, thresholds: Thresholds) -> Self {
        MetricsResponse {
            thresholds,
            total_records: report.counts.total(),
            shares: report.counts.shares(),
            formatted: report.formatted(),
            report,
        }
    }
}

/// Everything the dashboard page renders
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub source: SeriesSource,
    pub demo_data: bool,
    pub records: usize,
    pub status: StatusResponse,
    pub metrics: MetricsResponse,
    pub trend: TrendView,
}

// ---------------------------------------------------------------------------
// Request Evaluation
// ---------------------------------------------------------------------------

/// Why a data request could not be answered.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(QueryError),
    NoData(EvalError),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NoData(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(e) => write!(f, "{}", e),
            ApiError::NoData(e) => write!(f, "{}", e),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        ApiError::BadRequest(e)
    }
}

impl From<EvalError> for ApiError {
    fn from(e: EvalError) -> Self {
        ApiError::NoData(e)
    }
}

fn request_thresholds(state: &DashboardState, query: &DashboardQuery) -> Result<Thresholds, ApiError> {
    Ok(query.thresholds(&state.config.default_thresholds())?)
}

pub fn build_status(state: &DashboardState, query: &DashboardQuery) -> Result<StatusResponse, ApiError> {
    let thresholds = request_thresholds(state, query)?;
    let snapshot = match query.at {
        Some(instant) => status_as_of(&state.series, instant, &thresholds)?,
        None => current_status(&state.series, &thresholds)?,
    };
    Ok(StatusResponse::from(snapshot))
}

pub fn build_metrics(state: &DashboardState, query: &DashboardQuery) -> Result<MetricsResponse, ApiError> {
    let thresholds = request_thresholds(state, query)?;
    let report = confusion_and_scores(&state.series, &thresholds);
    Ok(MetricsResponse::new(report, thresholds))
}

pub fn build_trend(state: &DashboardState, query: &DashboardQuery) -> Result<TrendView, ApiError> {
    let thresholds = request_thresholds(state, query)?;
    let hours = query.window_hours(state.config.display.window_hours)?;
    Ok(trend(
        &state.series,
        hours,
        state.config.display.sample_interval_minutes,
        &thresholds,
    ))
}

pub fn build_dashboard(state: &DashboardState, query: &DashboardQuery) -> Result<DashboardResponse, ApiError> {
    Ok(DashboardResponse {
        source: state.source.clone(),
        demo_data: state.source == SeriesSource::Synthetic,
        records: state.series.len(),
        status: build_status(state, query)?,
        metrics: build_metrics(state, query)?,
        trend: build_trend(state, query)?,
    })
}

fn to_json<T: Serialize>(value: T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}

fn health_json(state: &DashboardState) -> serde_json::Value {
    serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "records": state.series.len(),
        "source": state.source.to_string(),
    })
}

/// Data routes served by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Health,
    Status,
    Metrics,
    Trend,
    Dashboard,
}

impl Route {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            "/health" => Some(Route::Health),
            "/status" => Some(Route::Status),
            "/metrics" => Some(Route::Metrics),
            "/trend" => Some(Route::Trend),
            "/dashboard" => Some(Route::Dashboard),
            _ => None,
        }
    }
}

/// Routes a request by method and URL. Only GET is served.
pub fn route_request(state: &DashboardState, method: &tiny_http::Method, url: &str) -> (u16, serde_json::Value) {
    if *method != tiny_http::Method::Get {
        return (405, serde_json::json!({ "error": "Method not allowed" }));
    }
    route(state, url)
}

/// Routes a GET request URL to a status code and JSON body. The path is
/// matched before the query is parsed.
pub fn route(state: &DashboardState, url: &str) -> (u16, serde_json::Value) {
    let (path, raw_query) = url.split_once('?').unwrap_or((url, ""));

    let Some(matched) = Route::from_path(path) else {
        return (
            404,
            serde_json::json!({
                "error": "Not found",
                "available_endpoints": AVAILABLE_ENDPOINTS,
            }),
        );
    };

    if matched == Route::Health {
        return (200, health_json(state));
    }

    let query = match parse_query(raw_query) {
        Ok(q) => q,
        Err(e) => return error_body(&ApiError::from(e)),
    };

    let result = match matched {
        Route::Health => Ok(health_json(state)),
        Route::Status => build_status(state, &query).and_then(to_json),
        Route::Metrics => build_metrics(state, &query).and_then(to_json),
        Route::Trend => build_trend(state, &query).and_then(to_json),
        Route::Dashboard => build_dashboard(state, &query).and_then(to_json),
    };

    match result {
        Ok(body) => (200, body),
        Err(e) => error_body(&e),
    }
}

fn error_body(err: &ApiError) -> (u16, serde_json::Value) {
    if let ApiError::NoData(e) = err {
        logging::warn(Component::Evaluator, None, &e.to_string());
    }
    (err.status_code(), serde_json::json!({ "error": err.to_string() }))
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port, dispatching requests
/// onto `workers` threads.
pub fn start_endpoint_server(port: u16, workers: usize, state: Arc<DashboardState>) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;
    let pool = ThreadPool::new(workers.max(1));

    logging::info(
        Component::Endpoint,
        None,
        &format!("📡 HTTP endpoint listening on http://0.0.0.0:{} ({} workers)", port, workers.max(1)),
    );
    logging::info(Component::Endpoint, None, &format!("Endpoints: {}", AVAILABLE_ENDPOINTS.join(", ")));

    for request in server.incoming_requests() {
        let state = Arc::clone(&state);
        pool.execute(move || handle_request(&state, request));
    }

    Ok(())
}

fn handle_request(state: &DashboardState, request: tiny_http::Request) {
    let (status, body) = route_request(state, request.method(), request.url());

    logging::debug(
        Component::Endpoint,
        None,
        &format!("{} {} -> {}", request.method(), request.url(), status),
    );

    if let Err(e) = request.respond(create_response(status, &body)) {
        logging::error(Component::Endpoint, None, &format!("Failed to send response: {}", e));
    }
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: &serde_json::Value) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(json).unwrap_or_else(|_| "{}".to_string());
    let response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));

    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
