/// Core data types for the alarm flood status service.
///
/// This module defines the shared domain model imported by all other modules:
/// the time-stamped alarm record, the sorted series wrapper, the threshold
/// pair and the labels derived from it, plus the error types raised while
/// loading or evaluating a series. Evaluation logic lives in `alert` and
/// `analysis`; this module only holds types and their invariants.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default probability cutoff for "flood predicted".
pub const DEFAULT_PROB_THRESHOLD: f64 = 0.6;

/// Default active-alarm cutoff for "flood actually occurring".
pub const DEFAULT_ALARM_THRESHOLD: u32 = 225;

/// Default trend window length, in hours.
pub const DEFAULT_WINDOW_HOURS: u32 = 24;

/// Window lengths offered to the dashboard (6 to 48 hours in 6 hour steps).
pub const WINDOW_HOURS_CHOICES: [u32; 8] = [6, 12, 18, 24, 30, 36, 42, 48];

/// Nominal sampling interval of the prediction job output, in minutes.
pub const NOMINAL_SAMPLE_INTERVAL_MINUTES: u32 = 30;

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// One row of the prediction job output.
///
/// Any label columns present in the source file are deliberately not part of
/// this type: labels are always derived from the current `Thresholds`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmRecord {
    pub timestamp: DateTime<Utc>,
    pub active_alarms: u32,
    pub probability: f64, // 0.0 ..= 1.0
}

/// A chronologically ordered, read-only sequence of records.
///
/// The only constructor sorts its input, so every `Series` handed to the
/// evaluator is in ascending timestamp order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    records: Vec<AlarmRecord>,
}

impl Series {
    /// Builds a series from records in any order. Records sharing a
    /// timestamp keep their input order.
    pub fn from_records(mut records: Vec<AlarmRecord>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        Self { records }
    }

    pub fn records(&self) -> &[AlarmRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AlarmRecord> {
        self.records.get(index)
    }

    /// The chronologically last record.
    pub fn latest(&self) -> Option<&AlarmRecord> {
        self.records.last()
    }

    /// Index of the last record with `timestamp <= instant`.
    pub fn index_as_of(&self, instant: DateTime<Utc>) -> Option<usize> {
        let after = self.records.partition_point(|r| r.timestamp <= instant);
        after.checked_sub(1)
    }
}

// ---------------------------------------------------------------------------
// Threshold types
// ---------------------------------------------------------------------------

/// The decision threshold pair. Runtime configuration only; never stored
/// alongside the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    /// `probability >= this` means a flood is predicted.
    pub probability: f64,
    /// `active_alarms >= this` means a flood is occurring.
    pub alarms: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            probability: DEFAULT_PROB_THRESHOLD,
            alarms: DEFAULT_ALARM_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Builds a validated threshold pair.
    pub fn new(probability: f64, alarms: u32) -> Result<Self, ThresholdError> {
        let thresholds = Self { probability, alarms };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Checks that the probability cutoff lies in [0, 1].
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(ThresholdError::ProbabilityOutOfRange(self.probability));
        }
        Ok(())
    }
}

/// Binary labels recomputed for a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedLabels {
    pub predicted: bool,
    pub actual: bool,
}

impl DerivedLabels {
    /// Both comparisons are inclusive.
    pub fn for_record(record: &AlarmRecord, thresholds: &Thresholds) -> Self {
        Self {
            predicted: record.probability >= thresholds.probability,
            actual: record.active_alarms >= thresholds.alarms,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Invalid threshold pair.
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdError {
    ProbabilityOutOfRange(f64),
}

impl std::fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdError::ProbabilityOutOfRange(p) => {
                write!(f, "Probability threshold {} is outside [0, 1]", p)
            }
        }
    }
}

impl std::error::Error for ThresholdError {}

/// Errors raised by the status evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The series is empty, or no record exists at the requested instant.
    NoData,
    /// A historical cursor points past the end of the series.
    CursorOutOfRange { cursor: usize, len: usize },
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::NoData => write!(f, "No data available"),
            EvalError::CursorOutOfRange { cursor, len } => {
                write!(f, "Cursor {} is out of range for a series of {} records", cursor, len)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Errors that can arise when reading a candidate series source.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The candidate path does not exist.
    NotFound(String),
    /// The file exists but could not be read.
    Io { path: String, message: String },
    /// The header line could not be split into column names.
    MalformedHeader(String),
    /// The header lacks one of the required columns.
    MissingColumn(String),
    /// The source has no header line.
    EmptyInput,
    /// Every data row was rejected (or there were none).
    NoValidRows { skipped: usize },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::NotFound(path) => write!(f, "File not found: {}", path),
            LoadError::Io { path, message } => write!(f, "Failed to read {}: {}", path, message),
            LoadError::MalformedHeader(reason) => write!(f, "Parse error: malformed header: {}", reason),
            LoadError::MissingColumn(col) => write!(f, "Parse error: missing column '{}'", col),
            LoadError::EmptyInput => write!(f, "Parse error: input has no header line"),
            LoadError::NoValidRows { skipped } => {
                write!(f, "No data: no valid rows ({} rejected)", skipped)
            }
        }
    }
}

impl std::error::Error for LoadError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
