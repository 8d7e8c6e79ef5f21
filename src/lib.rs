// ABOUTME: Main library entry point for the carbon-aware data pipeline
// ABOUTME: Entry-point handlers, parameter validation, location source, configuration and logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

#![deny(unsafe_code)]

//! # Carbon Aware
//!
//! Ingests carbon-intensity measurements and forecasts from grid-data
//! providers, normalizes them into uniform series and derives the summaries a
//! scheduler needs: the average intensity over a period and the lowest-carbon
//! window within a forecast horizon.
//!
//! ## Architecture
//!
//! - **carbon-core**: data model, error taxonomy, clock and the pure
//!   time-series engine
//! - **carbon-providers**: the provider trait, credential and cache
//!   management, and the `WattTime`, Electricity Maps and JSON providers
//! - **this crate**: parameter validation, the five entry points, the
//!   file-backed location source, configuration and logging
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use carbon_aware::config::CarbonAwareConfig;
//! use carbon_aware::factory::DataSources;
//! use carbon_aware::parameters::ForecastQuery;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CarbonAwareConfig::from_env()?;
//!     let sources = DataSources::from_config(&config)?;
//!
//!     let query = ForecastQuery::new(["eastus"]).with_window_size(chrono::Duration::minutes(30));
//!     for forecast in sources.forecast_handler().get_current_forecast(&query).await? {
//!         println!("{}: {:?}", forecast.location, forecast.optimal_data_points.first());
//!     }
//!     Ok(())
//! }
//! ```

pub use carbon_core::clock;
pub use carbon_core::constants;
pub use carbon_core::errors;
pub use carbon_core::models;
pub use carbon_core::timeseries;

/// Provider clients and their shared infrastructure
pub use carbon_providers as providers;

/// Environment configuration
pub mod config;

/// Provider construction from configuration
pub mod factory;

/// Pipeline entry points
pub mod handlers;

/// File-backed location source
pub mod locations;

/// Structured logging setup
pub mod logging;

/// Parameter contract validation and typed queries
pub mod parameters;

pub use errors::{CarbonAwareError, CarbonAwareResult, ProviderError, ValidationErrors};
pub use handlers::{EmissionsHandler, ForecastHandler};
pub use models::{EmissionsData, EmissionsForecast};
