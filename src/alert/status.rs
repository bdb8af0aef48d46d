//! Status evaluation for a single record of the series.
//!
//! The snapshot is fully determined by (series, cursor, thresholds) and is
//! recomputed on every call; nothing here caches labels between calls.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::model::{AlarmRecord, DerivedLabels, EvalError, Series, Thresholds};

/// Probability at or above which the risk tier is `High`.
pub const RISK_HIGH_BREAKPOINT: f64 = 0.7;

/// Probability at or above which the risk tier is `Medium`.
pub const RISK_MEDIUM_BREAKPOINT: f64 = 0.4;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Coarse display classification of the flood probability.
///
/// The breakpoints are fixed and do not move with the decision threshold,
/// so a record can be `Medium` risk while not predicted, or `Low` risk while
/// predicted under a low threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= RISK_HIGH_BREAKPOINT {
            RiskTier::High
        } else if probability >= RISK_MEDIUM_BREAKPOINT {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "LOW"),
            RiskTier::Medium => write!(f, "MEDIUM"),
            RiskTier::High => write!(f, "HIGH"),
        }
    }
}

/// Headline state shown on the main status card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertState {
    Alert,
    Normal,
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertState::Alert => write!(f, "ALERT"),
            AlertState::Normal => write!(f, "NORMAL"),
        }
    }
}

/// Time until the next record predicted to flood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "hours", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeToFlood {
    /// The snapshot record itself is predicted to flood.
    Imminent,
    /// Fractional hours (`delta_seconds / 3600`) to the next predicted record.
    InHours(f64),
    /// No later record meets the probability threshold.
    NotForecast,
}

impl TimeToFlood {
    pub fn hours(&self) -> Option<f64> {
        match self {
            TimeToFlood::InHours(h) => Some(*h),
            _ => None,
        }
    }
}

impl fmt::Display for TimeToFlood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeToFlood::Imminent => write!(f, "Imminent"),
            TimeToFlood::InHours(h) => write!(f, "{:.1} hours", h),
            TimeToFlood::NotForecast => write!(f, "Not forecast"),
        }
    }
}

/// Status of the series at one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub timestamp: DateTime<Utc>,
    pub active_alarms: u32,
    pub probability: f64,
    pub predicted: bool,
    pub actual: bool,
    pub alert: AlertState,
    pub risk: RiskTier,
    pub time_to_flood: TimeToFlood,
    pub thresholds: Thresholds,
}

impl StatusSnapshot {
    /// Probability as a percentage with one decimal, e.g. `"72.4%"`.
    pub fn probability_text(&self) -> String {
        format!("{:.1}%", self.probability * 100.0)
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Status of the chronologically last record.
pub fn current_status(series: &Series, thresholds: &Thresholds) -> Result<StatusSnapshot, EvalError> {
    if series.is_empty() {
        return Err(EvalError::NoData);
    }
    status_at(series, series.len() - 1, thresholds)
}

/// Status of the record at `cursor`, looking forward through the rest of
/// the series for the next predicted flood.
pub fn status_at(
    series: &Series,
    cursor: usize,
    thresholds: &Thresholds,
) -> Result<StatusSnapshot, EvalError> {
    if series.is_empty() {
        return Err(EvalError::NoData);
    }
    let record = series.get(cursor).ok_or(EvalError::CursorOutOfRange {
        cursor,
        len: series.len(),
    })?;

    let labels = DerivedLabels::for_record(record, thresholds);
    let time_to_flood = if labels.predicted {
        TimeToFlood::Imminent
    } else {
        next_predicted_flood(series, record, thresholds)
    };

    Ok(StatusSnapshot {
        timestamp: record.timestamp,
        active_alarms: record.active_alarms,
        probability: record.probability,
        predicted: labels.predicted,
        actual: labels.actual,
        alert: if labels.predicted { AlertState::Alert } else { AlertState::Normal },
        risk: RiskTier::from_probability(record.probability),
        time_to_flood,
        thresholds: *thresholds,
    })
}

/// Status of the last record at or before `instant`.
pub fn status_as_of(
    series: &Series,
    instant: DateTime<Utc>,
    thresholds: &Thresholds,
) -> Result<StatusSnapshot, EvalError> {
    let cursor = series.index_as_of(instant).ok_or(EvalError::NoData)?;
    status_at(series, cursor, thresholds)
}

/// Scans records strictly after `from` for the first predicted flood.
fn next_predicted_flood(series: &Series, from: &AlarmRecord, thresholds: &Thresholds) -> TimeToFlood {
    let records = series.records();
    let start = records.partition_point(|r| r.timestamp <= from.timestamp);

    records[start..]
        .iter()
        .find(|r| r.probability >= thresholds.probability)
        .map(|r| TimeToFlood::InHours(hours_between(from.timestamp, r.timestamp)))
        .unwrap_or(TimeToFlood::NotForecast)
}

fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let delta = later.signed_duration_since(earlier);
    delta.num_milliseconds() as f64 / 1000.0 / 3600.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
