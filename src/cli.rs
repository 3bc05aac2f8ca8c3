//! Command line interface

use crate::AirWatchError;
use crate::advisory::TrendDirection;
use crate::config::AirWatchConfig;
use crate::history::HistoryStore;
use crate::models::{City, PollutantReading};
use crate::monitor::{AirQualityMonitor, CityReport, PollSummary, report_from};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "airwatch")]
#[command(about = "Air-quality polling, history and health advisories for configured cities")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "AIRWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the current air quality once and append it to history
    Fetch {
        /// Only fetch this city
        #[arg(long)]
        city: Option<String>,
    },

    /// Poll all cities repeatedly
    Watch {
        /// Seconds between polling cycles
        #[arg(short, long, default_value = "300")]
        interval: u64,
        /// Stop after this many cycles (0 = run forever)
        #[arg(short = 'n', long, default_value = "0")]
        cycles: u64,
    },

    /// Show the latest reading and advisory for a city
    Show {
        /// City name
        city: String,
    },

    /// List configured cities
    Cities,
}

/// Run a parsed command against a loaded configuration
pub fn run(cli: Cli, config: AirWatchConfig) -> Result<()> {
    match cli.command {
        Commands::Fetch { city } => {
            let mut monitor = AirQualityMonitor::new(&config)?;
            let summary = match city {
                Some(name) => {
                    let city = lookup(&config, &name)?.clone();
                    let mut summary = PollSummary::default();
                    summary.record(&monitor.poll_city(&city));
                    summary
                }
                None => monitor.poll_all(),
            };
            print_summary(&summary);
        }
        Commands::Watch { interval, cycles } => {
            let mut monitor = AirQualityMonitor::new(&config)?;
            let mut cycle = 0;
            loop {
                cycle += 1;
                info!("Starting polling cycle {}", cycle);
                print_summary(&monitor.poll_all());
                if cycles != 0 && cycle >= cycles {
                    break;
                }
                thread::sleep(Duration::from_secs(interval));
            }
        }
        Commands::Show { city } => {
            let city = lookup(&config, &city)?;
            let history = HistoryStore::new(config.history_dir());
            match report_from(&history, &city.name) {
                Some(report) => print_report(city, &report),
                None => println!("No readings recorded for {} yet.", city.name),
            }
        }
        Commands::Cities => {
            for city in &config.cities {
                println!("{:<20} {}", city.name, city.format_coordinates());
            }
        }
    }
    Ok(())
}

fn lookup<'a>(config: &'a AirWatchConfig, name: &str) -> Result<&'a City> {
    config.city(name).ok_or_else(|| {
        AirWatchError::validation(format!("Unknown city '{name}'. Run `airwatch cities` to list them."))
            .into()
    })
}

fn print_summary(summary: &PollSummary) {
    println!(
        "Fetched: {}  Rate limited: {}  Failed: {}",
        summary.fetched, summary.rate_limited, summary.failed
    );
}

fn print_report(city: &City, report: &CityReport) {
    println!("{} ({})", city.name, city.format_coordinates());
    println!("Measured at: {}", report.latest.timestamp.format("%Y-%m-%d %H:%M:%S %:z"));

    let reading = &report.latest.data;
    match &report.advisory {
        Some(advisory) => {
            println!(
                "AQI: {} - {} ({})",
                reading.aqi.unwrap_or_default(),
                advisory.category,
                advisory.color_code
            );
            println!("{}", advisory.recommendation);
        }
        None => println!("AQI: n/a"),
    }

    for (name, value) in reading.components() {
        println!("  {:<6} {}", name, PollutantReading::format_value(value));
    }

    let direction = match report.trend.direction() {
        TrendDirection::Improving => "improving",
        TrendDirection::Worsening => "worsening",
        TrendDirection::Stable => "stable",
        TrendDirection::Unknown => "not enough data",
    };
    println!("Trend: {} ({})", report.trend.format(), direction);
}
