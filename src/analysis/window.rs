/// Trailing trend window selection.
///
/// `window` takes the last N records of the sorted series; the caller
/// converts a requested duration into N with `points_for_hours`, assuming
/// the nominal sampling interval. Irregular spacing or gaps in the data are
/// not detected, so a 24 hour window over gappy data covers more than
/// 24 hours of wall time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{AlarmRecord, DerivedLabels, Series, Thresholds};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The last `count` records in chronological order, or the whole series if
/// it is shorter.
pub fn window(series: &Series, count: usize) -> &[AlarmRecord] {
    let records = series.records();
    &records[records.len().saturating_sub(count)..]
}

/// Number of samples covering `hours` at the given sampling interval
/// (30 minute cadence gives `hours * 2`).
pub fn points_for_hours(hours: u32, sample_interval_minutes: u32) -> usize {
    if sample_interval_minutes == 0 {
        return 0;
    }
    (hours as usize * 60) / sample_interval_minutes as usize
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Headline statistics over a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSummary {
    pub points: usize,
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
    pub mean_probability: f64,
    pub max_alarms: u32,
    pub min_alarms: u32,
}

/// Summary of a window; `None` when it is empty.
pub fn summarize(records: &[AlarmRecord]) -> Option<WindowSummary> {
    let first = records.first()?;
    let last = records.last()?;

    let probability_sum: f64 = records.iter().map(|r| r.probability).sum();
    let max_alarms = records.iter().map(|r| r.active_alarms).max()?;
    let min_alarms = records.iter().map(|r| r.active_alarms).min()?;

    Some(WindowSummary {
        points: records.len(),
        first: first.timestamp,
        last: last.timestamp,
        mean_probability: probability_sum / records.len() as f64,
        max_alarms,
        min_alarms,
    })
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

/// One chart point: alarms on the left axis, probability (%) on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub active_alarms: u32,
    pub probability_pct: f64,
    pub predicted: bool,
}

/// Everything the trend chart needs: the points, the horizontal alarm
/// threshold line, and the window summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendView {
    pub hours: u32,
    pub alarm_threshold: u32,
    pub points: Vec<TrendPoint>,
    pub summary: Option<WindowSummary>,
}

/// Builds the trend view for the trailing `hours` of the series.
pub fn trend(
    series: &Series,
    hours: u32,
    sample_interval_minutes: u32,
    thresholds: &Thresholds,
) -> TrendView {
    let records = window(series, points_for_hours(hours, sample_interval_minutes));

    let points = records
        .iter()
        .map(|r| TrendPoint {
            timestamp: r.timestamp,
            active_alarms: r.active_alarms,
            probability_pct: r.probability * 100.0,
            predicted: DerivedLabels::for_record(r, thresholds).predicted,
        })
        .collect();

    TrendView {
        hours,
        alarm_threshold: thresholds.alarms,
        points,
        summary: summarize(records),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
