// ABOUTME: WattTime v3 response payloads and their conversion into emissions samples
// ABOUTME: MOER values arrive in lbs/MWh and are converted to g/kWh here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::constants::units::moer_to_grams_per_kwh;
use crate::constants::watttime::PROVIDER_NAME;
use crate::errors::{ProviderError, ProviderResult};
use crate::models::{EmissionsData, EmissionsForecast};

/// `GET login` response
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for data calls
    #[serde(default)]
    pub token: Option<String>,
}

/// One MOER point
#[derive(Debug, Clone, Deserialize)]
pub struct DataPoint {
    /// Start of the interval
    pub point_time: DateTime<Utc>,
    /// Marginal emissions rate in lbs/MWh
    pub value: f64,
    /// Interval length in seconds, when reported
    #[serde(default)]
    pub frequency: Option<i64>,
}

/// Metadata block shared by data responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMeta {
    /// Region abbreviation the data belongs to
    #[serde(default)]
    pub region: String,
    /// Signal the values describe
    #[serde(default)]
    pub signal_type: Option<String>,
    /// When a forecast was generated
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

/// `GET historical` and `GET forecast` response
#[derive(Debug, Deserialize)]
pub struct GridDataResponse {
    /// Points in the order the API returned them
    #[serde(default)]
    pub data: Vec<DataPoint>,
    /// Response metadata
    #[serde(default)]
    pub meta: ResponseMeta,
}

/// One stored forecast from `GET forecast/historical`
#[derive(Debug, Deserialize)]
pub struct HistoricalForecast {
    /// When this forecast was generated
    pub generated_at: DateTime<Utc>,
    /// Forecast points
    #[serde(default)]
    pub forecast: Vec<DataPoint>,
}

/// `GET forecast/historical` response
#[derive(Debug, Deserialize)]
pub struct HistoricalForecastResponse {
    /// Forecasts generated in the requested range; empty when none existed
    #[serde(default)]
    pub data: Vec<HistoricalForecast>,
    /// Response metadata
    #[serde(default)]
    pub meta: ResponseMeta,
}

/// `GET region-from-loc` response
#[derive(Debug, Deserialize)]
pub struct RegionResponse {
    /// Region abbreviation
    pub region: String,
    /// Human readable region name
    #[serde(default)]
    pub region_full_name: String,
}

/// Absolute spacing of the first two points
fn point_spacing(points: &[DataPoint]) -> Option<Duration> {
    match points {
        [first, second, ..] => Some((first.point_time - second.point_time).abs()),
        _ => None,
    }
}

fn forecast_samples(points: &[DataPoint], location: &str) -> ProviderResult<Vec<EmissionsData>> {
    let duration = point_spacing(points).ok_or_else(|| {
        ProviderError::malformed(
            PROVIDER_NAME,
            format!("forecast has {} point(s), at least 2 are required", points.len()),
        )
    })?;
    Ok(points
        .iter()
        .map(|point| EmissionsData::new(location, point.point_time, duration, moer_to_grams_per_kwh(point.value)))
        .collect())
}

impl GridDataResponse {
    /// Historical samples for `location`
    ///
    /// Each sample uses its own `frequency` when present and representable,
    /// otherwise the spacing of the first two points, otherwise zero.
    #[must_use]
    pub fn into_history(self, location: &str) -> Vec<EmissionsData> {
        let fallback = point_spacing(&self.data).unwrap_or_else(Duration::zero);
        self.data
            .iter()
            .map(|point| {
                let duration = point.frequency.and_then(Duration::try_seconds).unwrap_or(fallback);
                EmissionsData::new(location, point.point_time, duration, moer_to_grams_per_kwh(point.value))
            })
            .collect()
    }

    /// Current forecast for `location`
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MalformedResponse` when fewer than two points
    /// were returned or `meta.generated_at` is missing.
    pub fn into_forecast(self, location: &str) -> ProviderResult<EmissionsForecast> {
        let generated_at = self
            .meta
            .generated_at
            .ok_or_else(|| ProviderError::malformed(PROVIDER_NAME, "forecast is missing meta.generated_at"))?;
        let samples = forecast_samples(&self.data, location)?;
        Ok(EmissionsForecast::new(location, generated_at, samples))
    }
}

impl HistoricalForecast {
    /// Stored forecast for `location`
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MalformedResponse` when fewer than two points
    /// were returned.
    pub fn into_forecast(self, location: &str) -> ProviderResult<EmissionsForecast> {
        let samples = forecast_samples(&self.forecast, location)?;
        Ok(EmissionsForecast::new(location, self.generated_at, samples))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GridDataResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_history_prefers_frequency_over_spacing() {
        let response = parse(
            r#"{"data":[
                {"point_time":"2024-01-01T00:10:00Z","value":1000.0,"frequency":300},
                {"point_time":"2024-01-01T00:00:00Z","value":500.0}
            ],"meta":{"region":"CAISO_NORTH"}}"#,
        );
        let history = response.into_history("westus");

        assert_eq!(history[0].duration, Duration::minutes(5));
        assert_eq!(history[1].duration, Duration::minutes(10));
        assert!((history[0].rating - 453.592_37).abs() < 1e-9);
        assert_eq!(history[0].location, "westus");
    }

    #[test]
    fn test_unrepresentable_frequency_falls_back_to_spacing() {
        let response = parse(
            r#"{"data":[
                {"point_time":"2024-01-01T00:05:00Z","value":1.0,"frequency":9223372036854775807},
                {"point_time":"2024-01-01T00:00:00Z","value":1.0}
            ]}"#,
        );
        assert_eq!(response.into_history("x")[0].duration, Duration::minutes(5));
    }

    #[test]
    fn test_single_point_history_has_zero_duration() {
        let response = parse(r#"{"data":[{"point_time":"2024-01-01T00:00:00Z","value":10.0}]}"#);
        assert_eq!(response.into_history("x")[0].duration, Duration::zero());
    }

    #[test]
    fn test_forecast_needs_two_points() {
        let response = parse(
            r#"{"data":[{"point_time":"2024-01-01T00:00:00Z","value":10.0}],
                "meta":{"generated_at":"2024-01-01T00:00:00Z"}}"#,
        );
        assert!(matches!(
            response.into_forecast("x"),
            Err(ProviderError::MalformedResponse { .. })
        ));
    }
}
