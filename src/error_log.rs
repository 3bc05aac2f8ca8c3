//! Persistent failure log
//!
//! One line per failed fetch or storage operation, in the form
//! `[YYYY-MM-DD HH:MM:SS] <city>: <message>`. This is the operator-facing
//! record; diagnostics go through `tracing`.

use crate::Result;
use crate::error::FetchError;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Append-only error log file shared by all cities
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one failure line for `city`
    pub fn record(&self, city: &str, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let line = format_line(&Local::now().format("%Y-%m-%d %H:%M:%S").to_string(), city, message);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        debug!(city, "Recorded failure in {}", self.path.display());
        Ok(())
    }

    /// Record a fetch failure; if the log itself is unwritable, report via tracing
    pub fn record_failure(&self, city: &str, failure: &FetchError) {
        if let Err(e) = self.record(city, &failure.to_string()) {
            error!(
                city,
                "Could not write to error log {}: {} (original failure: {})",
                self.path.display(),
                e,
                failure
            );
        }
    }
}

fn format_line(timestamp: &str, city: &str, message: &str) -> String {
    format!("[{timestamp}] {city}: {message}\n")
}
