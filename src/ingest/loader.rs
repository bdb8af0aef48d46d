/// Series source selection.
///
/// Tries each candidate path in order and keeps the first one that parses
/// into a non-empty series. When none does, the demo series stands in so
/// the dashboard still has something to show; `LoadedSeries::source`
/// records which case happened.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::ingest::csv::read_series_file;
use crate::ingest::synthetic::demo_series;
use crate::logging::{self, Component};
use crate::model::Series;

/// Default locations of the prediction job output, in priority order.
pub const DEFAULT_CANDIDATE_PATHS: [&str; 3] = [
    "prueba/salida_predicciones.csv",
    "salida_predicciones.csv",
    "data/salida_predicciones.csv",
];

/// Where a loaded series came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum SeriesSource {
    File(PathBuf),
    Synthetic,
}

impl fmt::Display for SeriesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesSource::File(path) => write!(f, "{}", path.display()),
            SeriesSource::Synthetic => write!(f, "demo data"),
        }
    }
}

/// A series together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: Series,
    pub source: SeriesSource,
    pub skipped_rows: usize,
}

impl LoadedSeries {
    pub fn is_synthetic(&self) -> bool {
        self.source == SeriesSource::Synthetic
    }
}

/// First candidate that yields a non-empty series, if any.
pub fn load_first_candidate<P: AsRef<Path>>(candidates: &[P]) -> Option<LoadedSeries> {
    for candidate in candidates {
        let path = candidate.as_ref();
        let label = path.display().to_string();

        match read_series_file(path) {
            Ok(parsed) => {
                logging::info(
                    Component::Loader,
                    Some(&label),
                    &format!("Loaded {} records from {}", parsed.series.len(), label),
                );
                if parsed.skipped_rows > 0 {
                    logging::warn(
                        Component::Loader,
                        Some(&label),
                        &format!("{} malformed rows rejected", parsed.skipped_rows),
                    );
                }
                return Some(LoadedSeries {
                    series: parsed.series,
                    source: SeriesSource::File(path.to_path_buf()),
                    skipped_rows: parsed.skipped_rows,
                });
            }
            Err(e) => logging::log_source_failure(&label, &e),
        }
    }
    None
}

/// First usable candidate, or the demo series when none parses.
pub fn load_series<P: AsRef<Path>>(candidates: &[P]) -> LoadedSeries {
    load_first_candidate(candidates).unwrap_or_else(|| {
        logging::warn(
            Component::Loader,
            None,
            "No data file could be loaded; using demo data",
        );
        LoadedSeries {
            series: demo_series(),
            source: SeriesSource::Synthetic,
            skipped_rows: 0,
        }
    })
}
