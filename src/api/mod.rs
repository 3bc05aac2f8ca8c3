//! Air-quality API client
//!
//! One blocking HTTP request per call, gated by a per-city rate limiter.
//! Every failure is classified into a [`FetchError`], written to the error
//! log and returned as a [`FetchOutcome`]; nothing is raised to the caller.

pub mod response;

use crate::config::AirWatchConfig;
use crate::error::FetchError;
use crate::error_log::ErrorLog;
use crate::models::PollutantReading;
use crate::rate_limiter::RateLimiter;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

pub use response::parse_air_pollution;

/// Result of a single fetch attempt
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A reading was produced
    Fetched(PollutantReading),
    /// The city was fetched too recently; no request was made
    RateLimited { retry_in: Duration },
    /// The request was made but produced no reading
    Failed(FetchError),
}

impl FetchOutcome {
    /// The reading, if one was produced
    #[must_use]
    pub fn into_reading(self) -> Option<PollutantReading> {
        match self {
            FetchOutcome::Fetched(reading) => Some(reading),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchOutcome::RateLimited { .. })
    }
}

/// Client for the air pollution endpoint
pub struct AirQualityClient {
    /// HTTP client
    client: Client,
    /// Endpoint the query parameters are appended to
    base_url: String,
    /// Sent as `appid`
    api_key: String,
    /// Per-request timeout, reported in timeout failures
    timeout: Duration,
    /// Rate limiter
    rate_limiter: RateLimiter,
    /// Failure sink
    error_log: ErrorLog,
}

impl AirQualityClient {
    /// Create a new air-quality API client
    pub fn new(config: &AirWatchConfig, error_log: ErrorLog) -> Result<Self> {
        config.validate_api_key()?;
        let timeout = config.request_timeout();

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("airwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            timeout,
            rate_limiter: RateLimiter::new(config.min_request_interval()),
            error_log,
        })
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    #[must_use]
    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    /// Fetch the current reading for a city
    pub fn fetch(&mut self, lat: f64, lon: f64, city_name: &str) -> FetchOutcome {
        self.fetch_at(lat, lon, city_name, Instant::now())
    }

    /// Fetch the current reading for a city, gating on `now`
    #[instrument(skip(self, now), fields(city = city_name))]
    pub fn fetch_at(&mut self, lat: f64, lon: f64, city_name: &str, now: Instant) -> FetchOutcome {
        if !self.rate_limiter.allow(city_name, now) {
            let retry_in = self.rate_limiter.time_until_allowed(city_name, now);
            warn!(
                "Too many requests for {}, next fetch allowed in {:.0}s",
                city_name,
                retry_in.as_secs_f64()
            );
            return FetchOutcome::RateLimited { retry_in };
        }

        let start_time = Instant::now();
        match self.request(lat, lon) {
            Ok(reading) => {
                info!(
                    "Fetched air quality for {} in {:.3}s (aqi: {:?})",
                    city_name,
                    start_time.elapsed().as_secs_f64(),
                    reading.aqi
                );
                FetchOutcome::Fetched(reading)
            }
            Err(failure) => {
                warn!("Air quality fetch for {} failed: {}", city_name, failure);
                self.error_log.record_failure(city_name, &failure);
                FetchOutcome::Failed(failure)
            }
        }
    }

    /// Make a single request and validate the response
    fn request(&self, lat: f64, lon: f64) -> std::result::Result<PollutantReading, FetchError> {
        let url = reqwest::Url::parse_with_params(
            &self.base_url,
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
            ],
        )
        .map_err(|e| FetchError::Unexpected {
            message: format!("invalid base URL {}: {}", self.base_url, e),
        })?;

        debug!("Requesting {} (lat={}, lon={})", self.base_url, lat, lon);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().map_err(|e| self.classify(e))?;
        debug!("HTTP response received: {} ({} bytes)", status, body.len());

        if status != StatusCode::OK {
            return Err(FetchError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        parse_air_pollution(&body)
    }

    /// Map a transport error onto the failure taxonomy, timeouts first
    ///
    /// The request URL carries the API key, so it is stripped from the message.
    fn classify(&self, error: reqwest::Error) -> FetchError {
        let error = error.without_url();
        if error.is_timeout() {
            FetchError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else if error.is_connect() {
            FetchError::Connection {
                message: error.to_string(),
            }
        } else {
            FetchError::Unexpected {
                message: error.to_string(),
            }
        }
    }
}
