//! Diagnostic logging for settings materialization.
//!
//! The merge/filter core never talks to a global logger. It receives a
//! [`LogSink`] and reports through it. [`Logger`] is the standard sink: it
//! forwards every record to `tracing` and can additionally keep an in-memory
//! copy so callers (and tests) can inspect what was reported.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU8, Ordering},
};
use tracing::Level;

/// Severity of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn to_u8(self) -> u8 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warning => 2,
            LogLevel::Error => 3,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warning,
            _ => LogLevel::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Convert a [`LogLevel`] to the matching tracing level.
pub fn log_level_to_tracing(level: LogLevel) -> Level {
    match level {
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warning => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Atomic minimum level shared between clones of a [`Logger`].
pub struct LogLevelFilter(AtomicU8);

impl LogLevelFilter {
    pub fn new(level: LogLevel) -> Self {
        Self(AtomicU8::new(level.to_u8()))
    }

    pub fn get(&self) -> LogLevel {
        LogLevel::from_u8(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, level: LogLevel) {
        self.0.store(level.to_u8(), Ordering::Relaxed);
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level.to_u8() >= self.0.load(Ordering::Relaxed)
    }
}

impl Default for LogLevelFilter {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

/// A diagnostic record kept by a capturing [`Logger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Destination for diagnostics emitted by the merge/filter core.
pub trait LogSink {
    fn log(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Logger that forwards to `tracing` and optionally records in memory.
#[derive(Clone)]
pub struct Logger {
    level_filter: Arc<LogLevelFilter>,
    name: Option<String>,
    records: Option<Arc<Mutex<Vec<LogRecord>>>>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            level_filter: Arc::new(LogLevelFilter::default()),
            name: None,
            records: None,
        }
    }

    pub fn with_level_filter(mut self, filter: Arc<LogLevelFilter>) -> Self {
        self.level_filter = filter;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Keep a copy of every record that passes the level filter.
    pub fn with_capture(mut self) -> Self {
        self.records = Some(Arc::new(Mutex::new(Vec::new())));
        self
    }

    /// Records captured so far (empty unless built with [`Logger::with_capture`]).
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .as_ref()
            .and_then(|records| records.lock().ok().map(|r| r.clone()))
            .unwrap_or_default()
    }

    /// Captured records at exactly `level`.
    pub fn records_at(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.level == level)
            .collect()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level_filter.get())
            .field("name", &self.name)
            .field("capturing", &self.records.is_some())
            .finish()
    }
}

impl LogSink for Logger {
    fn log(&self, level: LogLevel, message: &str) {
        if !self.level_filter.should_log(level) {
            return;
        }

        let name = self.name.as_deref().unwrap_or("climatecontrol");
        match log_level_to_tracing(level) {
            Level::ERROR => tracing::error!(logger = %name, "{}", message),
            Level::WARN => tracing::warn!(logger = %name, "{}", message),
            Level::INFO => tracing::info!(logger = %name, "{}", message),
            _ => tracing::debug!(logger = %name, "{}", message),
        }

        if let Some(ref records) = self.records
            && let Ok(mut records) = records.lock()
        {
            records.push(LogRecord {
                level,
                message: message.to_string(),
            });
        }
    }
}
