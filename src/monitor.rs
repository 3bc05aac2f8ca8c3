//! Polling pipeline: fetch, persist, advise
//!
//! Cities are polled one after another; a cycle for one city completes
//! before the next starts, which is what keeps history files single-writer.

use crate::advisory::{Advisory, AqiTrend};
use crate::api::{AirQualityClient, FetchOutcome};
use crate::config::AirWatchConfig;
use crate::error_log::ErrorLog;
use crate::history::{DEFAULT_TREND_LENGTH, HistoryStore};
use crate::models::{City, HistoryEntry};
use anyhow::Result;
use chrono::{DateTime, FixedOffset, Local};
use serde::Serialize;
use tracing::{error, info, instrument};

/// Counts of outcomes for one polling cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    pub fetched: usize,
    pub rate_limited: usize,
    pub failed: usize,
}

impl PollSummary {
    pub fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Fetched(_) => self.fetched += 1,
            FetchOutcome::RateLimited { .. } => self.rate_limited += 1,
            FetchOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// What a display shows for a city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityReport {
    pub latest: HistoryEntry,
    pub advisory: Option<Advisory>,
    pub trend: AqiTrend,
}

/// Owns the client, history store and error log for a set of cities
pub struct AirQualityMonitor {
    client: AirQualityClient,
    history: HistoryStore,
    error_log: ErrorLog,
    cities: Vec<City>,
}

impl AirQualityMonitor {
    pub fn new(config: &AirWatchConfig) -> Result<Self> {
        let error_log = ErrorLog::new(config.error_log_path());
        let client = AirQualityClient::new(config, error_log.clone())?;

        Ok(Self {
            client,
            history: HistoryStore::new(config.history_dir()),
            error_log,
            cities: config.cities.clone(),
        })
    }

    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Fetch one city and persist the reading with the current local time
    pub fn poll_city(&mut self, city: &City) -> FetchOutcome {
        self.poll_city_at(city, Local::now().fixed_offset())
    }

    /// Fetch one city and persist the reading under `timestamp`
    #[instrument(skip(self, city), fields(city = %city.name))]
    pub fn poll_city_at(&mut self, city: &City, timestamp: DateTime<FixedOffset>) -> FetchOutcome {
        let outcome = self.client.fetch(city.latitude, city.longitude, &city.name);

        if let FetchOutcome::Fetched(reading) = &outcome {
            if let Err(e) = self.history.append(&city.name, *reading, timestamp) {
                error!("Failed to save reading for {}: {}", city.name, e);
                if let Err(log_err) = self
                    .error_log
                    .record(&city.name, &format!("Failed to save history: {e}"))
                {
                    error!("Could not write to error log: {}", log_err);
                }
            }
        }

        outcome
    }

    /// Poll every configured city once, in order
    pub fn poll_all(&mut self) -> PollSummary {
        let cities = self.cities.clone();
        let mut summary = PollSummary::default();

        for city in &cities {
            let outcome = self.poll_city(city);
            summary.record(&outcome);
        }

        info!(
            "Polling cycle done: {} fetched, {} rate limited, {} failed",
            summary.fetched, summary.rate_limited, summary.failed
        );
        summary
    }

    /// Latest reading, advisory and AQI trend for a city
    #[must_use]
    pub fn report(&self, city_name: &str) -> Option<CityReport> {
        report_from(&self.history, city_name)
    }
}

/// Build a report straight from a history store
#[must_use]
pub fn report_from(history: &HistoryStore, city_name: &str) -> Option<CityReport> {
    let latest = history.read_latest(city_name)?;

    Some(CityReport {
        advisory: Advisory::for_reading(&latest.data),
        trend: AqiTrend::new(history.aqi_trend(city_name, DEFAULT_TREND_LENGTH)),
        latest,
    })
}
