use airwatch::cli::{self, Cli};
use airwatch::{AirWatchConfig, AirWatchError, logging};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match AirWatchConfig::load_from_path(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.logging, cli.verbose);

    match cli::run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(err) = e.downcast_ref::<AirWatchError>() {
                eprintln!("{}", err.user_message());
            }
            tracing::debug!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}
