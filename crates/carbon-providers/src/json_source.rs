// ABOUTME: Static JSON data provider serving emissions and forecasts from a local file
// ABOUTME: Loads once at construction; useful for demos, tests and offline operation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use crate::constants::json_source::{MIN_SAMPLING_WINDOW_MINUTES, PROVIDER_NAME};
use crate::core::CarbonIntensityProvider;
use crate::errors::{ProviderError, ProviderResult};
use crate::models::{EmissionsData, EmissionsForecast};
use crate::timeseries::{extend_time_by_window, filter_by_duration};

#[derive(Debug, Default, Deserialize)]
struct DataFile {
    #[serde(default)]
    emissions: Vec<EmissionsData>,
    #[serde(default)]
    forecasts: Vec<EmissionsForecast>,
}

/// Provider backed by an in-memory copy of a JSON data file
#[derive(Debug, Clone, Default)]
pub struct JsonDataProvider {
    emissions: Vec<EmissionsData>,
    forecasts: Vec<EmissionsForecast>,
}

impl JsonDataProvider {
    /// Provider over the given data
    #[must_use]
    pub const fn new(emissions: Vec<EmissionsData>, forecasts: Vec<EmissionsForecast>) -> Self {
        Self { emissions, forecasts }
    }

    /// Load `{ "emissions": [...], "forecasts": [...] }` from `path`
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if the file cannot be read and
    /// `ProviderError::MalformedResponse` if it is not valid data.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(PROVIDER_NAME, format!("cannot read {}: {e}", path.display()))
        })?;
        let provider = Self::from_json_str(&contents)?;
        info!(
            path = %path.display(),
            emissions = provider.emissions.len(),
            forecasts = provider.forecasts.len(),
            "Loaded JSON emissions data"
        );
        Ok(provider)
    }

    /// Parse data from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MalformedResponse` if `json` is not valid data.
    pub fn from_json_str(json: &str) -> ProviderResult<Self> {
        let file: DataFile = serde_json::from_str(json)
            .map_err(|e| ProviderError::malformed(PROVIDER_NAME, format!("invalid data file: {e}")))?;
        Ok(Self::new(file.emissions, file.forecasts))
    }
}

#[async_trait]
impl CarbonIntensityProvider for JsonDataProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_history(
        &self,
        location: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ProviderResult<Vec<EmissionsData>> {
        let (wide_start, wide_end) =
            extend_time_by_window(start, end, Duration::minutes(MIN_SAMPLING_WINDOW_MINUTES));
        let candidates: Vec<EmissionsData> = self
            .emissions
            .iter()
            .filter(|sample| sample.location == location && sample.time_between(wide_start, wide_end))
            .cloned()
            .collect();
        debug!(location, candidates = candidates.len(), "Filtered JSON emissions by location");
        Ok(filter_by_duration(&candidates, start, end))
    }

    async fn fetch_current_forecast(&self, location: &str) -> ProviderResult<EmissionsForecast> {
        self.forecasts
            .iter()
            .find(|forecast| forecast.location == location)
            .cloned()
            .ok_or_else(|| ProviderError::NullPayload {
                provider: PROVIDER_NAME,
                resource: format!("forecast for {location}"),
            })
    }

    async fn fetch_forecast_as_of(
        &self,
        _location: &str,
        _requested_at: DateTime<Utc>,
    ) -> ProviderResult<Option<EmissionsForecast>> {
        Err(ProviderError::Unsupported {
            provider: PROVIDER_NAME,
            operation: "historical forecasts",
        })
    }

    async fn resolve_region(&self, latitude: f64, longitude: f64) -> ProviderResult<String> {
        Ok(format!("{latitude},{longitude}"))
    }
}
