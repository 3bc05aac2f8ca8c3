//! Error types and handling for the `AirWatch` application

use thiserror::Error;

/// Main error type for the `AirWatch` application
#[derive(Error, Debug)]
pub enum AirWatchError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// History storage errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl AirWatchError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AirWatchError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            AirWatchError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            AirWatchError::Storage { .. } | AirWatchError::Json { .. } => {
                "History storage failed. Check the log directory.".to_string()
            }
            AirWatchError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

/// Discriminant of a [`FetchError`], handy for matching without payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Connection,
    Unexpected,
    BadStatus,
    InvalidJson,
    MissingList,
    MissingFields,
}

/// Failure of a single air-quality fetch.
///
/// The display text of each variant is the message written to the error log.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Timeout after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Connection error (network issue)")]
    Connection { message: String },

    #[error("Unexpected error: {message}")]
    Unexpected { message: String },

    #[error("Bad status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Invalid JSON response")]
    InvalidJson,

    #[error("Missing 'list' in API response: {raw}")]
    MissingList { raw: String },

    #[error("Missing 'main' or 'components' in data entry: {raw}")]
    MissingFields { raw: String },
}

impl FetchError {
    #[must_use]
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Timeout { .. } => FetchErrorKind::Timeout,
            FetchError::Connection { .. } => FetchErrorKind::Connection,
            FetchError::Unexpected { .. } => FetchErrorKind::Unexpected,
            FetchError::BadStatus { .. } => FetchErrorKind::BadStatus,
            FetchError::InvalidJson => FetchErrorKind::InvalidJson,
            FetchError::MissingList { .. } => FetchErrorKind::MissingList,
            FetchError::MissingFields { .. } => FetchErrorKind::MissingFields,
        }
    }
}
