//! Append-only run log.
//!
//! Every line is `[YYYY-MM-DD HH:MM:SS] message` and is flushed as soon as it
//! is written, so the log is complete even when the process exits early.
//! Lines are mirrored to `tracing` at the matching level.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Timestamp format of log lines.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of a run log line (only affects the `tracing` mirror).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Warn,
    Error,
}

/// Append-only text log shared by all stages of a run.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl RunLog {
    /// Open `path` for appending, creating it and its parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record an informational line.
    pub fn info(&self, message: impl AsRef<str>) {
        self.write_line(Level::Info, message.as_ref());
    }

    /// Record a warning line.
    pub fn warn(&self, message: impl AsRef<str>) {
        self.write_line(Level::Warn, message.as_ref());
    }

    /// Record an error line.
    pub fn error(&self, message: impl AsRef<str>) {
        self.write_line(Level::Error, message.as_ref());
    }

    fn write_line(&self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!("{message}"),
            Level::Warn => tracing::warn!("{message}"),
            Level::Error => tracing::error!("{message}"),
        }

        let line = format!("[{}] {}\n", Local::now().format(TIMESTAMP_FORMAT), message);
        let result = match self.file.lock() {
            Ok(mut file) => file.write_all(line.as_bytes()).and_then(|()| file.flush()),
            Err(_) => Err(io::Error::other("run log lock poisoned")),
        };

        // A broken log must not take the run down with it.
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to append to run log");
        }
    }
}
