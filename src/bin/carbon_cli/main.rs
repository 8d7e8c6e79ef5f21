// ABOUTME: Carbon Aware CLI - command-line front end for the carbon-aware pipeline
// ABOUTME: Runs the emissions and forecast entry points and prints JSON to stdout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors
//!
//! Usage:
//! ```bash
//! # Emissions for two locations over a range
//! carbon-aware-cli emissions -l eastus -l westus --start 2024-05-01T00:00:00Z --end 2024-05-01T06:00:00Z
//!
//! # Lowest-carbon sample across locations
//! carbon-aware-cli best -l eastus -l westus
//!
//! # Average intensity for one location
//! carbon-aware-cli average -l eastus --start 2024-05-01T00:00:00Z --end 2024-05-02T00:00:00Z
//!
//! # Current forecast resampled to a 30 minute workload
//! carbon-aware-cli forecast -l eastus --duration 30
//!
//! # Forecast as it was generated at a past instant
//! carbon-aware-cli forecast-as-of -l eastus --requested-at 2024-05-01T12:00:00Z
//! ```
//!
//! Data sources, credentials and location files are read from the environment.
//! Logs go to stderr.

mod commands;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use carbon_aware::config::CarbonAwareConfig;
use carbon_aware::factory::DataSources;
use carbon_aware::logging::LoggingConfig;

#[derive(Parser)]
#[command(
    name = "carbon-aware-cli",
    about = "Carbon-aware emissions and forecast queries",
    long_about = "Query historical emissions, average intensity and forecasts from the configured carbon-intensity providers."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Emissions samples for one or more locations
    Emissions(RangeArgs),
    /// Lowest-intensity samples across one or more locations
    Best(RangeArgs),
    /// Average intensity for one location over a period
    Average(RangeArgs),
    /// Current forecast for one or more locations
    Forecast {
        #[command(flatten)]
        range: RangeArgs,
        /// Workload duration in minutes
        #[arg(long)]
        duration: Option<i64>,
    },
    /// Forecast for one location as generated at a past instant
    ForecastAsOf {
        #[command(flatten)]
        range: RangeArgs,
        /// Workload duration in minutes
        #[arg(long)]
        duration: Option<i64>,
        /// Instant the forecast was generated at (RFC 3339)
        #[arg(long)]
        requested_at: Option<DateTime<Utc>>,
    },
}

#[derive(Args)]
struct RangeArgs {
    /// Location name; repeat for several locations
    #[arg(long = "location", short = 'l')]
    locations: Vec<String>,

    /// Start of the range (RFC 3339)
    #[arg(long)]
    start: Option<DateTime<Utc>>,

    /// End of the range (RFC 3339)
    #[arg(long)]
    end: Option<DateTime<Utc>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let config = CarbonAwareConfig::from_env()?;
    debug!("{}", config.summary());
    let sources = DataSources::from_config(&config)?;

    let output = match cli.command {
        Command::Emissions(range) => commands::emissions(&sources, range.into()).await?,
        Command::Best(range) => commands::best(&sources, range.into()).await?,
        Command::Average(range) => commands::average(&sources, range.into()).await?,
        Command::Forecast { range, duration } => {
            commands::forecast(&sources, range.into(), duration).await?
        }
        Command::ForecastAsOf {
            range,
            duration,
            requested_at,
        } => commands::forecast_as_of(&sources, range.into(), duration, requested_at).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

impl From<RangeArgs> for commands::Range {
    fn from(args: RangeArgs) -> Self {
        Self {
            locations: args.locations,
            start: args.start,
            end: args.end,
        }
    }
}
