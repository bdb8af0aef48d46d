/// Dashboard configuration loader - parses dashboard.toml
///
/// Holds the default threshold pair, the trend window settings, the list of
/// candidate data files, logging options and endpoint settings. Every
/// section is optional; anything left out takes its default. Thresholds
/// loaded here are only defaults: endpoint requests may override them.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::loader::DEFAULT_CANDIDATE_PATHS;
use crate::logging::LogLevel;
use crate::model::{
    ThresholdError, Thresholds, DEFAULT_ALARM_THRESHOLD, DEFAULT_PROB_THRESHOLD,
    DEFAULT_WINDOW_HOURS, NOMINAL_SAMPLE_INTERVAL_MINUTES, WINDOW_HOURS_CHOICES,
};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "DASHBOARD_CONFIG";

// ---------------------------------------------------------------------------
// TOML Configuration Structures
// ---------------------------------------------------------------------------

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub thresholds: ThresholdConfig,
    pub display: DisplayConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
    pub endpoint: EndpointConfig,
}

/// Default decision thresholds
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Probability cutoff for "flood predicted", in [0, 1]
    pub probability: f64,
    /// Active alarm cutoff for "flood occurring"
    pub alarms: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            probability: DEFAULT_PROB_THRESHOLD,
            alarms: DEFAULT_ALARM_THRESHOLD,
        }
    }
}

/// Trend window settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub window_hours: u32,
    /// Nominal spacing of the input series; used to turn hours into points
    pub sample_interval_minutes: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_hours: DEFAULT_WINDOW_HOURS,
            sample_interval_minutes: NOMINAL_SAMPLE_INTERVAL_MINUTES,
        }
    }
}

/// Data file candidates, tried in order
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    pub candidate_paths: Vec<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            candidate_paths: DEFAULT_CANDIDATE_PATHS.iter().map(PathBuf::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// "debug", "info", "warn" or "error"
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EndpointConfig {
    pub port: u16,
    pub workers: usize,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            workers: 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The configuration file does not exist
    NotFound(String),
    /// The file exists but could not be read
    Io(String),
    /// The file is not valid TOML for this schema
    Parse(String),
    InvalidThresholds(ThresholdError),
    /// Window length outside the offered choices
    InvalidWindowHours(u32),
    InvalidSampleInterval(u32),
    InvalidLogLevel(String),
    InvalidWorkerCount(usize),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(f, "Configuration file not found: {}", path),
            ConfigError::Io(msg) => write!(f, "Failed to read configuration: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse configuration: {}", msg),
            ConfigError::InvalidThresholds(e) => write!(f, "Invalid thresholds: {}", e),
            ConfigError::InvalidWindowHours(h) => write!(
                f,
                "Invalid window_hours {}: expected one of {:?}",
                h, WINDOW_HOURS_CHOICES
            ),
            ConfigError::InvalidSampleInterval(m) => {
                write!(f, "Invalid sample_interval_minutes {}: must be positive", m)
            }
            ConfigError::InvalidLogLevel(level) => write!(
                f,
                "Invalid logging level '{}': expected debug, info, warn or error",
                level
            ),
            ConfigError::InvalidWorkerCount(n) => {
                write!(f, "Invalid endpoint worker count {}: must be at least 1", n)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl DashboardConfig {
    /// Checks every range the dashboard depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_thresholds()
            .validate()
            .map_err(ConfigError::InvalidThresholds)?;

        if !WINDOW_HOURS_CHOICES.contains(&self.display.window_hours) {
            return Err(ConfigError::InvalidWindowHours(self.display.window_hours));
        }
        if self.display.sample_interval_minutes == 0 {
            return Err(ConfigError::InvalidSampleInterval(0));
        }
        if LogLevel::parse(&self.logging.level).is_none() {
            return Err(ConfigError::InvalidLogLevel(self.logging.level.clone()));
        }
        if self.endpoint.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(0));
        }
        Ok(())
    }

    /// The configured threshold pair, as the evaluator type.
    pub fn default_thresholds(&self) -> Thresholds {
        Thresholds::from(&self.thresholds)
    }

    /// Parsed logging level; `Info` if the name is unrecognized.
    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.logging.level).unwrap_or(LogLevel::Info)
    }
}

/// Parses and validates configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<DashboardConfig, ConfigError> {
    let config: DashboardConfig =
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Loads and validates a configuration file.
pub fn load_config_from<P: AsRef<Path>>(path: P) -> Result<DashboardConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
    parse_config(&contents)
}

/// Resolves the configuration path: explicit argument, then the
/// `DASHBOARD_CONFIG` environment variable, then `dashboard.toml`.
pub fn resolve_config_path(explicit: Option<&str>) -> PathBuf {
    explicit
        .map(PathBuf::from)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Converts ThresholdConfig from TOML to the evaluator's Thresholds type.
impl From<&ThresholdConfig> for Thresholds {
    fn from(config: &ThresholdConfig) -> Self {
        Thresholds {
            probability: config.probability,
            alarms: config.alarms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
[thresholds]
probability = 0.55
alarms = 240

[display]
window_hours = 12
sample_interval_minutes = 15

[data]
candidate_paths = ["a.csv", "data/b.csv"]

[logging]
level = "debug"
file = "service.log"
timestamps = true

[endpoint]
port = 9090
workers = 2
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(FULL_CONFIG).expect("config should parse");

        assert_eq!(config.default_thresholds(), Thresholds { probability: 0.55, alarms: 240 });
        assert_eq!(config.display.window_hours, 12);
        assert_eq!(config.display.sample_interval_minutes, 15);
        assert_eq!(
            config.data.candidate_paths,
            vec![PathBuf::from("a.csv"), PathBuf::from("data/b.csv")]
        );
        assert_eq!(config.log_level(), LogLevel::Debug);
        assert_eq!(config.logging.file.as_deref(), Some("service.log"));
        assert_eq!(config.endpoint.port, 9090);
        assert_eq!(config.endpoint.workers, 2);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").expect("empty config is valid");
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.default_thresholds(), Thresholds::default());
        assert_eq!(config.display.window_hours, 24);
        assert_eq!(config.data.candidate_paths.len(), 3);
        assert_eq!(config.data.candidate_paths[0], PathBuf::from("prueba/salida_predicciones.csv"));
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = parse_config("[thresholds]\nalarms = 300\n").expect("valid");
        assert_eq!(config.thresholds.alarms, 300);
        assert_eq!(config.thresholds.probability, 0.6);
    }

    #[test]
    fn test_rejects_probability_out_of_range() {
        let err = parse_config("[thresholds]\nprobability = 1.2\n").unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidThresholds(ThresholdError::ProbabilityOutOfRange(1.2))
        );
    }

    #[test]
    fn test_rejects_window_outside_choices() {
        assert_eq!(
            parse_config("[display]\nwindow_hours = 20\n").unwrap_err(),
            ConfigError::InvalidWindowHours(20)
        );
        for hours in WINDOW_HOURS_CHOICES {
            let toml = format!("[display]\nwindow_hours = {}\n", hours);
            assert!(parse_config(&toml).is_ok(), "{} hours should be accepted", hours);
        }
    }

    #[test]
    fn test_rejects_negative_alarm_threshold() {
        assert!(matches!(
            parse_config("[thresholds]\nalarms = -5\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_bad_log_level_and_workers() {
        assert_eq!(
            parse_config("[logging]\nlevel = \"loud\"\n").unwrap_err(),
            ConfigError::InvalidLogLevel("loud".to_string())
        );
        assert_eq!(
            parse_config("[endpoint]\nworkers = 0\n").unwrap_err(),
            ConfigError::InvalidWorkerCount(0)
        );
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_config_from("no/such/dashboard.toml"),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, FULL_CONFIG).unwrap();

        let config = load_config_from(&path).expect("file should load");
        assert_eq!(config.thresholds.alarms, 240);
    }

    #[test]
    fn test_repository_dashboard_toml_is_valid() {
        let config = load_config_from(DEFAULT_CONFIG_PATH).expect("dashboard.toml should load");
        assert_eq!(config.default_thresholds(), Thresholds::default());
    }

    #[test]
    fn test_explicit_config_path_wins() {
        assert_eq!(resolve_config_path(Some("custom.toml")), PathBuf::from("custom.toml"));
    }
}
