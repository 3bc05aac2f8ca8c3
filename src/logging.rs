//! Diagnostic logging setup

use crate::config::LoggingConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level; `verbose` raises the crate's
/// own level to `debug`.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let default_filter = if verbose {
        "airwatch=debug".to_string()
    } else {
        format!("airwatch={}", config.level)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {e}");
    }
}
