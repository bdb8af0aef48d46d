/// Test fixtures: representative CSV payloads from the prediction job.
///
/// The job writes one row per 30 minute interval with the columns
///   timestamp, active_alarms, probabilidad_flood, prediccion_flood, flood_actual
/// where the last two are labels computed by the job at its own thresholds.
/// Parsers must ignore those label columns.

/// Six half-hourly rows in chronological order, Spanish column names, with
/// stored labels that disagree with the default thresholds on the last row.
#[cfg(test)]
pub(crate) fn fixture_job_output_csv() -> &'static str {
    "timestamp,active_alarms,probabilidad_flood,prediccion_flood,flood_actual
2025-01-01 00:00:00,180,0.12,0,0
2025-01-01 00:30:00,195,0.31,0,0
2025-01-01 01:00:00,214,0.47,0,0
2025-01-01 01:30:00,231,0.66,1,1
2025-01-01 02:00:00,248,0.74,1,1
2025-01-01 02:30:00,226,0.58,1,0
"
}

/// English column names, columns reordered, rows out of order, quoted
/// fields and an integral float alarm count.
#[cfg(test)]
pub(crate) fn fixture_unsorted_csv() -> &'static str {
    "probability,timestamp,active_alarms
0.80,\"2025-03-10T12:00:00Z\",260
0.10,\"2025-03-10T11:00:00Z\",140.0
0.45,\"2025-03-10T11:30:00Z\",205
"
}

/// One good row surrounded by rows the loader must reject.
#[cfg(test)]
pub(crate) fn fixture_malformed_rows_csv() -> &'static str {
    "timestamp,active_alarms,probability
not-a-date,200,0.5
2025-01-01 00:30:00,many,0.5
2025-01-01 01:00:00,210,1.7
2025-01-01 01:30:00,-4,0.2
2025-01-01 02:00:00,212.5,0.2
2025-01-01 02:30:00,220,0.61

2025-01-01 03:00:00,230
"
}

/// Header lacks the probability column.
#[cfg(test)]
pub(crate) fn fixture_missing_column_csv() -> &'static str {
    "timestamp,active_alarms,prediccion_flood
2025-01-01 00:00:00,180,0
"
}

/// A free-text column with quoted commas and escaped quotes, followed by a
/// row with an unterminated quote and a row with an extra field.
#[cfg(test)]
pub(crate) fn fixture_quoted_comma_csv() -> &'static str {
    r#"timestamp,active_alarms,note,probability
2025-01-01 00:00:00,230,"x,0.9",0.1
2025-01-01 00:30:00,240,"said ""high"", 0.95",0.2
2025-01-01 01:00:00,250,"unterminated,0.3
2025-01-01 01:30:00,260,x,0.9,0.4
"#
}
