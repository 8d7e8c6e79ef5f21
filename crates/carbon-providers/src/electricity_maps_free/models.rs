// ABOUTME: Electricity Maps free tier response payload and its conversion into a one-point forecast
// ABOUTME: The latest reading is treated as a sample covering the next two hours
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::constants::electricity_maps_free::SAMPLE_DURATION_MINUTES;
use crate::models::{EmissionsData, EmissionsForecast};

/// Intensity reading inside a latest-data response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridEmissionData {
    /// Time of the reading
    pub datetime: DateTime<Utc>,
    /// Intensity in gCO2eq/kWh
    pub carbon_intensity: f64,
    /// Share of fossil generation, in percent
    #[serde(default)]
    pub fossil_fuel_percentage: Option<f64>,
}

/// Units reported alongside the reading
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridEmissionUnits {
    /// Unit of `carbonIntensity`
    #[serde(default)]
    pub carbon_intensity: Option<String>,
}

/// `GET latest` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridEmissionDataPoint {
    /// Terms-of-use notice
    #[serde(default, rename = "_disclaimer")]
    pub disclaimer: Option<String>,
    /// Request status reported by the API
    #[serde(default)]
    pub status: Option<String>,
    /// Zone the reading belongs to
    #[serde(default)]
    pub country_code: String,
    /// The reading
    pub data: GridEmissionData,
    /// Units
    #[serde(default)]
    pub units: Option<GridEmissionUnits>,
}

impl GridEmissionDataPoint {
    /// Forecast for `location` holding this reading as its only point
    ///
    /// The sample is labelled with the reported zone, falling back to
    /// `location` when the response names none.
    #[must_use]
    pub fn into_forecast(self, location: &str) -> EmissionsForecast {
        let zone = if self.country_code.is_empty() {
            location.to_owned()
        } else {
            self.country_code
        };
        let sample = EmissionsData::new(
            zone,
            self.data.datetime,
            Duration::minutes(SAMPLE_DURATION_MINUTES),
            self.data.carbon_intensity,
        );
        let mut forecast = EmissionsForecast::new(location, self.data.datetime, vec![sample]);
        forecast.data_start_at = Some(self.data.datetime);
        forecast
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const LATEST: &str = r#"{
        "_disclaimer": "This data is the exclusive property of Electricity Maps",
        "status": "ok",
        "countryCode": "DE",
        "data": {
            "datetime": "2024-05-01T12:00:00.000Z",
            "carbonIntensity": 382.0,
            "fossilFuelPercentage": 41.3
        },
        "units": { "carbonIntensity": "gCO2eq/kWh" }
    }"#;

    #[test]
    fn test_latest_reading_becomes_two_hour_sample() {
        let point: GridEmissionDataPoint = serde_json::from_str(LATEST).unwrap();
        let forecast = point.into_forecast("germany");

        assert_eq!(forecast.location, "germany");
        assert_eq!(forecast.forecast_data.len(), 1);
        let sample = &forecast.forecast_data[0];
        assert_eq!(sample.location, "DE");
        assert_eq!(sample.duration, Duration::hours(2));
        assert!((sample.rating - 382.0).abs() < f64::EPSILON);
        assert_eq!(forecast.generated_at, sample.time);
        assert_eq!(forecast.data_start_at, Some(sample.time));
    }
}
