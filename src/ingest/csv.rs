/// CSV parser for the prediction job output.
///
/// Columns are located by header name, so their order does not matter.
/// Accepted names:
///   timestamp                          - datetime (RFC 3339 or naive, naive = UTC)
///   active_alarms | active_actual      - non-negative integer
///   probability | probabilidad_flood   - float in [0, 1]
/// Any other column is ignored, including stored prediction/label columns.
///
/// Fields may be wrapped in double quotes; a quoted field can hold commas
/// and `""` escapes. Rows whose field count differs from the header's, or
/// with an unparseable timestamp, a non-integral or negative alarm count, or
/// a probability outside [0, 1] are skipped and counted. A header without
/// one of the required columns rejects the whole source.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fs;
use std::path::Path;

use crate::logging::{self, Component};
use crate::model::{AlarmRecord, LoadError, Series};

const TIMESTAMP_COLUMNS: &[&str] = &["timestamp"];
const ALARM_COLUMNS: &[&str] = &["active_alarms", "active_actual"];
const PROBABILITY_COLUMNS: &[&str] = &["probability", "probabilidad_flood"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A successfully parsed source.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSeries {
    pub series: Series,
    pub skipped_rows: usize,
}

/// Reads and parses a CSV file.
pub fn read_series_file(path: &Path) -> Result<ParsedSeries, LoadError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(LoadError::NotFound(display));
    }
    let text = fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: display,
        message: e.to_string(),
    })?;
    parse_series_csv(&text)
}

/// Parses CSV text into a sorted series.
pub fn parse_series_csv(text: &str) -> Result<ParsedSeries, LoadError> {
    let mut lines = text
        .trim_start_matches('\u{feff}')
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines.next().ok_or(LoadError::EmptyInput)?;
    let columns = ColumnMap::from_header(header)?;

    let mut records = Vec::new();
    let mut skipped_rows = 0;

    for (i, line) in lines {
        match columns.parse_row(line) {
            Ok(record) => records.push(record),
            Err(reason) => {
                skipped_rows += 1;
                logging::debug(
                    Component::Loader,
                    None,
                    &format!("line {} rejected: {}", i + 1, reason),
                );
            }
        }
    }

    if records.is_empty() {
        return Err(LoadError::NoValidRows { skipped: skipped_rows });
    }

    Ok(ParsedSeries {
        series: Series::from_records(records),
        skipped_rows,
    })
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

/// Positions of the required columns within a row.
struct ColumnMap {
    width: usize,
    timestamp: usize,
    alarms: usize,
    probability: usize,
}

impl ColumnMap {
    fn from_header(header: &str) -> Result<Self, LoadError> {
        let names: Vec<String> = split_fields(header)
            .map_err(LoadError::MalformedHeader)?
            .into_iter()
            .map(|n| n.to_ascii_lowercase())
            .collect();

        let find = |aliases: &[&str]| {
            names
                .iter()
                .position(|n| aliases.contains(&n.as_str()))
                .ok_or_else(|| LoadError::MissingColumn(aliases[0].to_string()))
        };

        Ok(ColumnMap {
            width: names.len(),
            timestamp: find(TIMESTAMP_COLUMNS)?,
            alarms: find(ALARM_COLUMNS)?,
            probability: find(PROBABILITY_COLUMNS)?,
        })
    }

    fn parse_row(&self, line: &str) -> Result<AlarmRecord, String> {
        let fields = split_fields(line)?;
        if fields.len() != self.width {
            return Err(format!("expected {} fields, found {}", self.width, fields.len()));
        }

        let raw_timestamp = fields[self.timestamp].as_str();
        let raw_alarms = fields[self.alarms].as_str();
        let raw_probability = fields[self.probability].as_str();

        let timestamp = parse_timestamp(raw_timestamp)
            .ok_or_else(|| format!("unparseable timestamp '{}'", raw_timestamp))?;
        let active_alarms = parse_alarm_count(raw_alarms)
            .ok_or_else(|| format!("invalid alarm count '{}'", raw_alarms))?;
        let probability = parse_probability(raw_probability)
            .ok_or_else(|| format!("probability '{}' not in [0, 1]", raw_probability))?;

        Ok(AlarmRecord {
            timestamp,
            active_alarms,
            probability,
        })
    }
}

/// Splits one CSV line into trimmed fields. Commas inside `"..."` belong to
/// the field and `""` inside quotes is a literal quote.
fn split_fields(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(current.trim().to_string());
    Ok(fields)
}

/// Parses RFC 3339 or a naive datetime (interpreted as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Accepts `"245"` and integral float text such as `"245.0"`.
fn parse_alarm_count(raw: &str) -> Option<u32> {
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let value: f64 = raw.parse().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

fn parse_probability(raw: &str) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    (0.0..=1.0).contains(&value).then_some(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
