//! Data models for the AirWatch application
//!
//! This module contains the core domain models organized by concern:
//! - City: monitored cities and their coordinates
//! - Reading: normalized pollutant measurements
//! - History: timestamped readings as persisted per city

pub mod city;
pub mod history;
pub mod reading;

// Re-export all public types for convenient access
pub use city::City;
pub use history::HistoryEntry;
pub use reading::PollutantReading;
