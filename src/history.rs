//! Per-city reading history
//!
//! Each city has one JSON file holding an array of [`HistoryEntry`] in
//! append order. Files are rewritten whole on every append, so the store
//! assumes a single writer per city. A file that is missing or does not
//! parse counts as an empty history; corrupt content is dropped on the
//! next append.

use crate::{AirWatchError, Result};
use crate::models::{HistoryEntry, PollutantReading};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Number of AQI values shown in trend displays
pub const DEFAULT_TREND_LENGTH: usize = 10;

/// How a city's history was obtained
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryLoad {
    /// The file existed and parsed
    Loaded(Vec<HistoryEntry>),
    /// No history file yet
    Missing,
    /// The file was unreadable or corrupt and is treated as empty
    Recovered { reason: String },
}

impl HistoryLoad {
    /// The entries, empty unless the file was loaded
    #[must_use]
    pub fn entries(self) -> Vec<HistoryEntry> {
        match self {
            HistoryLoad::Loaded(entries) => entries,
            HistoryLoad::Missing | HistoryLoad::Recovered { .. } => Vec::new(),
        }
    }
}

/// Summary of an append
#[derive(Debug, Clone, PartialEq)]
pub struct AppendReport {
    /// Number of entries in the file after the append
    pub total_entries: usize,
    /// Set when previous content was discarded
    pub recovered_from: Option<String>,
}

/// JSON-file history store rooted at one directory
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the history file for `city`
    #[must_use]
    pub fn path_for(&self, city: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(city)))
    }

    /// Load the full history of a city
    pub fn load(&self, city: &str) -> HistoryLoad {
        let path = self.path_for(city);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return HistoryLoad::Missing,
            Err(e) => {
                return HistoryLoad::Recovered {
                    reason: format!("failed to read {}: {}", path.display(), e),
                };
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&contents) {
            Ok(entries) => HistoryLoad::Loaded(entries),
            Err(e) => HistoryLoad::Recovered {
                reason: format!("failed to parse {}: {}", path.display(), e),
            },
        }
    }

    /// Append a reading to a city's history
    ///
    /// Corrupt existing content never fails the append; only writing the file
    /// can.
    pub fn append(
        &self,
        city: &str,
        reading: PollutantReading,
        timestamp: DateTime<FixedOffset>,
    ) -> Result<AppendReport> {
        let (mut entries, recovered_from) = match self.load(city) {
            HistoryLoad::Loaded(entries) => (entries, None),
            HistoryLoad::Missing => (Vec::new(), None),
            HistoryLoad::Recovered { reason } => {
                debug!(city, "Discarding unreadable history: {}", reason);
                (Vec::new(), Some(reason))
            }
        };

        entries.push(HistoryEntry::new(city, reading, timestamp));
        self.write(city, &entries)?;

        info!(city, "Saved reading, history now has {} entries", entries.len());
        Ok(AppendReport {
            total_entries: entries.len(),
            recovered_from,
        })
    }

    /// Most recent entry for a city
    pub fn read_latest(&self, city: &str) -> Option<HistoryEntry> {
        self.load(city).entries().pop()
    }

    /// Up to `n` most recent entries, oldest first
    pub fn read_recent(&self, city: &str, n: usize) -> Vec<HistoryEntry> {
        let mut entries = self.load(city).entries();
        let skip = entries.len().saturating_sub(n);
        entries.split_off(skip)
    }

    /// Up to `n` most recent AQI values, oldest first
    pub fn aqi_trend(&self, city: &str, n: usize) -> Vec<Option<u8>> {
        self.read_recent(city, n)
            .iter()
            .map(|entry| entry.data.aqi)
            .collect()
    }

    fn write(&self, city: &str, entries: &[HistoryEntry]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AirWatchError::storage(format!(
                "failed to create history directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut buffer = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        entries.serialize(&mut serializer)?;

        let path = self.path_for(city);
        if let Err(e) = fs::write(&path, &buffer) {
            warn!(city, "Failed to write history {}: {}", path.display(), e);
            return Err(AirWatchError::storage(format!(
                "failed to write {}: {}",
                path.display(),
                e
            )));
        }
        Ok(())
    }
}

/// File name for a city: characters that are not valid in file names become `_`
fn file_stem(city: &str) -> String {
    let stem: String = city
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        stem
    }
}
