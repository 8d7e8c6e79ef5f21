// ABOUTME: Electricity Maps v3 response payloads and conversion into emissions samples
// ABOUTME: Sample length is inferred from point spacing, defaulting to one hour
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::constants::electricity_maps::DEFAULT_SAMPLE_MINUTES;
use crate::models::{EmissionsData, EmissionsForecast};

/// One intensity point from history or past-range
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonIntensityPoint {
    /// Intensity in gCO2eq/kWh
    pub carbon_intensity: f64,
    /// Start of the hour the value describes
    pub datetime: DateTime<Utc>,
    /// Last update of the value
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Whether the value is an estimate
    #[serde(default)]
    pub is_estimated: Option<bool>,
    /// Emission factor basis
    #[serde(default)]
    pub emission_factor_type: Option<String>,
}

/// `GET carbon-intensity/history` response
#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    /// Zone the data belongs to
    #[serde(default)]
    pub zone: String,
    /// Points for the last 24 hours
    #[serde(default)]
    pub history: Vec<CarbonIntensityPoint>,
}

/// `GET carbon-intensity/past-range` response
#[derive(Debug, Deserialize)]
pub struct PastRangeResponse {
    /// Zone the data belongs to
    #[serde(default)]
    pub zone: String,
    /// Points in the requested range
    #[serde(default)]
    pub data: Vec<CarbonIntensityPoint>,
}

/// One forecast point
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// Forecast intensity in gCO2eq/kWh
    pub carbon_intensity: f64,
    /// Start of the forecast hour
    pub datetime: DateTime<Utc>,
}

/// `GET carbon-intensity/forecast` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    /// Zone the forecast belongs to
    #[serde(default)]
    pub zone: String,
    /// Forecast points
    #[serde(default)]
    pub forecast: Vec<ForecastPoint>,
    /// When the forecast was produced
    pub updated_at: DateTime<Utc>,
}

fn spacing(times: &[DateTime<Utc>]) -> Duration {
    match times {
        [first, second, ..] => (*first - *second).abs(),
        _ => Duration::minutes(DEFAULT_SAMPLE_MINUTES),
    }
}

/// Samples for `location` from history or past-range points
#[must_use]
pub fn to_history(points: &[CarbonIntensityPoint], location: &str) -> Vec<EmissionsData> {
    let times: Vec<_> = points.iter().take(2).map(|point| point.datetime).collect();
    let duration = spacing(&times);
    points
        .iter()
        .map(|point| EmissionsData::new(location, point.datetime, duration, point.carbon_intensity))
        .collect()
}

impl ForecastResponse {
    /// Forecast for `location`
    #[must_use]
    pub fn into_forecast(self, location: &str) -> EmissionsForecast {
        let times: Vec<_> = self.forecast.iter().take(2).map(|point| point.datetime).collect();
        let duration = spacing(&times);
        let samples = self
            .forecast
            .iter()
            .map(|point| EmissionsData::new(location, point.datetime, duration, point.carbon_intensity))
            .collect();
        EmissionsForecast::new(location, self.updated_at, samples)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_spacing_and_generated_at() {
        let response: ForecastResponse = serde_json::from_str(
            r#"{"zone":"DK-DK1","updatedAt":"2024-01-01T00:00:00Z","forecast":[
                {"carbonIntensity":300,"datetime":"2024-01-01T01:00:00Z"},
                {"carbonIntensity":200,"datetime":"2024-01-01T02:00:00Z"}
            ]}"#,
        )
        .unwrap();
        let forecast = response.into_forecast("denmark");

        assert_eq!(forecast.forecast_data.len(), 2);
        assert_eq!(forecast.forecast_data[0].duration, Duration::hours(1));
        assert_eq!(forecast.forecast_data[1].location, "denmark");
        assert_eq!(forecast.generated_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_single_history_point_gets_default_duration() {
        let response: PastRangeResponse = serde_json::from_str(
            r#"{"zone":"DE","data":[{"carbonIntensity":400,"datetime":"2024-01-01T00:00:00Z"}]}"#,
        )
        .unwrap();
        let history = to_history(&response.data, "germany");
        assert_eq!(history[0].duration, Duration::minutes(60));
    }
}
