//! `AirWatch` - air-quality monitoring for a fixed set of cities
//!
//! This library polls an air pollution API, keeps a per-city history of
//! normalized readings and derives health advisories from them.

pub mod advisory;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod error_log;
pub mod history;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod rate_limiter;

// Re-export core types for public API
pub use advisory::{Advisory, AqiCategory, AqiTrend, category_of, recommendation_for};
pub use api::{AirQualityClient, FetchOutcome};
pub use config::AirWatchConfig;
pub use error::{AirWatchError, FetchError, FetchErrorKind};
pub use error_log::ErrorLog;
pub use history::{HistoryLoad, HistoryStore};
pub use models::{City, HistoryEntry, PollutantReading};
pub use monitor::{AirQualityMonitor, CityReport, PollSummary};
pub use rate_limiter::RateLimiter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AirWatchError>;
