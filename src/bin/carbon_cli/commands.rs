// ABOUTME: Subcommand implementations for carbon-aware-cli
// ABOUTME: Maps command-line arguments onto typed queries and serializes handler results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tracing::info;

use carbon_aware::factory::DataSources;
use carbon_aware::parameters::{AverageQuery, EmissionsQuery, ForecastAsOfQuery, ForecastQuery};

/// Locations and range shared by every subcommand
pub struct Range {
    /// Location names
    pub locations: Vec<String>,
    /// Range start
    pub start: Option<DateTime<Utc>>,
    /// Range end
    pub end: Option<DateTime<Utc>>,
}

impl Range {
    /// First location, or empty so validation reports it as missing
    fn single_location(&self) -> String {
        self.locations.first().cloned().unwrap_or_default()
    }
}

/// Window size for `--duration` minutes
fn window_size(duration: Option<i64>) -> Result<Option<Duration>> {
    duration
        .map(|minutes| {
            Duration::try_minutes(minutes)
                .ok_or_else(|| anyhow!("--duration of {minutes} minutes is out of range"))
        })
        .transpose()
}

/// Emissions samples for every location
pub async fn emissions(sources: &DataSources, range: Range) -> Result<Value> {
    let query = EmissionsQuery::new(range.locations).between(range.start, range.end);
    let samples = sources.emissions_handler().get_emissions_data(&query).await?;
    info!(samples = samples.len(), "Emissions query complete");
    Ok(serde_json::to_value(samples)?)
}

/// Lowest-intensity samples across every location
pub async fn best(sources: &DataSources, range: Range) -> Result<Value> {
    let query = EmissionsQuery::new(range.locations).between(range.start, range.end);
    let samples = sources
        .emissions_handler()
        .get_best_emissions_data(&query)
        .await?;
    Ok(serde_json::to_value(samples)?)
}

/// Average intensity for the first location
pub async fn average(sources: &DataSources, range: Range) -> Result<Value> {
    let query = AverageQuery {
        location: range.single_location(),
        start: range.start,
        end: range.end,
    };
    let average = sources
        .emissions_handler()
        .get_average_carbon_intensity(&query)
        .await?;
    Ok(json!({
        "location": query.location,
        "startTime": query.start,
        "endTime": query.end,
        "carbonIntensity": average,
    }))
}

/// Current forecast for every location
pub async fn forecast(sources: &DataSources, range: Range, duration: Option<i64>) -> Result<Value> {
    let mut query = ForecastQuery::new(range.locations).between(range.start, range.end);
    query.window_size = window_size(duration)?;
    let forecasts = sources.forecast_handler().get_current_forecast(&query).await?;
    Ok(serde_json::to_value(forecasts)?)
}

/// Forecast for the first location as of `requested_at`
pub async fn forecast_as_of(
    sources: &DataSources,
    range: Range,
    duration: Option<i64>,
    requested_at: Option<DateTime<Utc>>,
) -> Result<Value> {
    let query = ForecastAsOfQuery {
        location: range.single_location(),
        requested_at,
        start: range.start,
        end: range.end,
        window_size: window_size(duration)?,
    };
    let forecast = sources.forecast_handler().get_forecast_as_of(&query).await?;
    if forecast.is_none() {
        info!(location = %query.location, "No forecast existed at the requested instant");
    }
    Ok(serde_json::to_value(forecast)?)
}
