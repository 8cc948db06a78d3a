#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Structured JSON-lines logging shared by the simulator crates.
//!
//! Records go to a single sink (a file or standard error) and are filtered
//! by a minimum level so the report stream on standard output stays clean.

use std::{
    fmt,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Log severity level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Debug information.
    Debug,
    /// Informational events.
    Info,
    /// Warning indicator.
    Warn,
    /// Error indicator.
    Error,
}

/// Structured log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Timestamp in ISO8601.
    pub timestamp: DateTime<Utc>,
    /// Module emitting the log.
    pub module: String,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// Arbitrary JSON fields attached to the record.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl LogRecord {
    /// Creates a record with the provided info.
    #[must_use]
    pub fn new(module: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            module: module.into(),
            level,
            message: message.into(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Attaches a single metadata field.
    #[must_use]
    pub fn with_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

enum Sink {
    File { path: PathBuf, file: File },
    Stderr,
}

/// Thread-safe JSON-lines logger with a minimum-level filter.
pub struct JsonLogger {
    min_level: LogLevel,
    sink: Mutex<Sink>,
}

impl fmt::Debug for JsonLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLogger")
            .field("min_level", &self.min_level)
            .field("path", &self.path())
            .finish()
    }
}

impl JsonLogger {
    /// Opens (append mode) a file-backed logger, creating parent directories.
    pub fn to_file(path: impl AsRef<Path>, min_level: LogLevel) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            min_level,
            sink: Mutex::new(Sink::File { path, file }),
        })
    }

    /// Logger writing to standard error.
    #[must_use]
    pub fn stderr(min_level: LogLevel) -> Self {
        Self {
            min_level,
            sink: Mutex::new(Sink::Stderr),
        }
    }

    /// Whether records at `level` pass the filter.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Writes a log record as a JSON line; filtered records are dropped.
    pub fn log(&self, record: &LogRecord) -> Result<()> {
        if !self.enabled(record.level) {
            return Ok(());
        }
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut sink = self.sink.lock();
        match &mut *sink {
            Sink::File { file, .. } => {
                file.write_all(&line)?;
                file.flush()?;
            }
            Sink::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(&line)?;
                err.flush()?;
            }
        }
        Ok(())
    }

    /// Backing file path, if the logger writes to a file.
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        match &*self.sink.lock() {
            Sink::File { path, .. } => Some(path.clone()),
            Sink::Stderr => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_json_lines() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::to_file(dir.path().join("run.log"), LogLevel::Debug).unwrap();
        let record =
            LogRecord::new("targets", LogLevel::Info, "targets.generated").with_field("count", 5);
        logger.log(&record).unwrap();
        let content = fs::read_to_string(logger.path().unwrap()).unwrap();
        assert!(content.contains("\"message\":\"targets.generated\""));
        assert!(content.contains("\"count\":5"));
    }

    #[test]
    fn drops_records_below_min_level() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::to_file(dir.path().join("run.log"), LogLevel::Warn).unwrap();
        logger
            .log(&LogRecord::new("report", LogLevel::Info, "report.rendered"))
            .unwrap();
        logger
            .log(&LogRecord::new("report", LogLevel::Warn, "report.write_failed"))
            .unwrap();
        let content = fs::read_to_string(logger.path().unwrap()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("report.write_failed"));
    }

    #[test]
    fn stderr_logger_has_no_path() {
        let logger = JsonLogger::stderr(LogLevel::Error);
        assert!(logger.path().is_none());
        assert!(!logger.enabled(LogLevel::Warn));
    }
}
