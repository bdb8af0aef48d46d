/// Structured logging for the alarm flood status service
///
/// Provides leveled, component-tagged logging with UTC timestamps. Console
/// output is always on; an optional log file receives every entry at or
/// above the configured level. Calls made before `init_logger` are dropped.

use chrono::Utc;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::model::LoadError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a level name as written in dashboard.toml.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Loader,
    Evaluator,
    Endpoint,
    Config,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Loader => write!(f, "LOAD"),
            Component::Evaluator => write!(f, "EVAL"),
            Component::Endpoint => write!(f, "HTTP"),
            Component::Config => write!(f, "CONF"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. an optional candidate file that is not present
    Expected,
    /// Unexpected failure - unreadable or malformed input
    Unexpected,
    /// Unknown - input was readable but yielded nothing usable
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

/// Minimum level of the global logger, checked before `LOGGER` is locked so
/// filtered calls never contend for the mutex.
static MIN_LEVEL: AtomicU8 = AtomicU8::new(LEVEL_DISABLED);

/// Gate value before `init_logger` runs: every level is below it.
const LEVEL_DISABLED: u8 = u8::MAX;

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Log file path and its handle, opened once in append mode
    log_file: Option<(String, File)>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Builds a logger, opening `log_file` for appending. A file that cannot
    /// be opened is reported once and file output is disabled.
    pub fn new(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) -> Self {
        let log_file = log_file.and_then(|path| {
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => Some((path.to_string(), file)),
                Err(e) => {
                    eprintln!("Failed to open log file {}: {}", path, e);
                    None
                }
            }
        });

        Logger {
            min_level,
            log_file,
            console_timestamps,
        }
    }

    fn format_entry(level: LogLevel, component: Component, subject: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, component, subject_part, message)
    }

    fn log(&self, level: LogLevel, component: Component, subject: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let entry = Self::format_entry(level, component, subject, message);
        let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, subject_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, subject_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}{}: {}", component, subject_part, message),
            }
        }

        if let Some((path, file)) = &self.log_file {
            let mut writer: &File = file;
            if let Err(e) = writeln!(writer, "{}", entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize (or re-initialize) the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    let logger = Logger::new(min_level, log_file, console_timestamps);
    if let Ok(mut guard) = LOGGER.lock() {
        *guard = Some(logger);
        MIN_LEVEL.store(min_level as u8, Ordering::Relaxed);
    }
}

fn passes_gate(level: LogLevel, gate: u8) -> bool {
    gate != LEVEL_DISABLED && level as u8 >= gate
}

fn dispatch(level: LogLevel, component: Component, subject: Option<&str>, message: &str) {
    if !passes_gate(level, MIN_LEVEL.load(Ordering::Relaxed)) {
        return;
    }
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, component, subject, message);
        }
    }
}

pub fn debug(component: Component, subject: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, subject, message);
}

pub fn info(component: Component, subject: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, subject, message);
}

pub fn warn(component: Component, subject: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, subject, message);
}

pub fn error(component: Component, subject: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, subject, message);
}

// ---------------------------------------------------------------------------
// Source Failure Logging
// ---------------------------------------------------------------------------

/// Classify a series source failure
pub fn classify_source_failure(err: &LoadError) -> FailureType {
    match err {
        LoadError::NotFound(_) => FailureType::Expected,
        LoadError::Io { .. }
        | LoadError::MalformedHeader(_)
        | LoadError::MissingColumn(_)
        | LoadError::EmptyInput => FailureType::Unexpected,
        LoadError::NoValidRows { .. } => FailureType::Unknown,
    }
}

/// Log a candidate source that could not be used, at a level matching its
/// classification
pub fn log_source_failure(path: &str, err: &LoadError) {
    let failure_type = classify_source_failure(err);
    let message = format!("load failed [{}]: {}", failure_type, err);

    match failure_type {
        FailureType::Expected => debug(Component::Loader, Some(path), &message),
        FailureType::Unexpected => error(Component::Loader, Some(path), &message),
        FailureType::Unknown => warn(Component::Loader, Some(path), &message),
    }
}
