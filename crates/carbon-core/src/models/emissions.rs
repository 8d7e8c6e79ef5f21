// ABOUTME: Emissions sample and forecast models shared by providers and handlers
// ABOUTME: Durations cross the serialization boundary as minutes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One provider-reported intensity measurement
///
/// `time` is the start of the measured interval and `duration` its length.
/// `rating` is grams of CO2-equivalent per kWh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsData {
    /// Location identifier the sample belongs to
    pub location: String,
    /// Start of the measured interval
    pub time: DateTime<Utc>,
    /// Length of the measured interval
    #[serde(with = "duration_minutes", default = "Duration::zero")]
    pub duration: Duration,
    /// Intensity value
    pub rating: f64,
}

impl EmissionsData {
    /// Create a sample
    #[must_use]
    pub fn new(
        location: impl Into<String>,
        time: DateTime<Utc>,
        duration: Duration,
        rating: f64,
    ) -> Self {
        Self {
            location: location.into(),
            time,
            duration,
            rating,
        }
    }

    /// Exclusive end of the measured interval, `None` past the representable range
    #[must_use]
    pub fn try_end(&self) -> Option<DateTime<Utc>> {
        self.time.checked_add_signed(self.duration)
    }

    /// Exclusive end of the measured interval
    ///
    /// Saturates at the bounds of `DateTime<Utc>` for durations that would
    /// overflow it.
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.try_end().unwrap_or(if self.duration < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
    }

    /// True when `time` falls in `[start, end]`
    #[must_use]
    pub fn time_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.time >= start && self.time <= end
    }
}

/// A forecast series plus the metadata the provider reported with it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsForecast {
    /// Location the forecast is for
    pub location: String,
    /// When the provider produced the forecast
    pub generated_at: DateTime<Utc>,
    /// Instant used to retrieve a historical snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_at: Option<DateTime<Utc>>,
    /// Start of the window the data was clipped to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_start_at: Option<DateTime<Utc>>,
    /// End of the window the data was clipped to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_end_at: Option<DateTime<Utc>>,
    /// Width of the rolling window applied to `forecast_data`
    #[serde(with = "duration_minutes", default = "Duration::zero")]
    pub window_size: Duration,
    /// Forecast points
    #[serde(default)]
    pub forecast_data: Vec<EmissionsData>,
    /// Points sharing the minimum rating
    #[serde(default)]
    pub optimal_data_points: Vec<EmissionsData>,
}

impl EmissionsForecast {
    /// Forecast with raw data and no processing metadata
    #[must_use]
    pub fn new(
        location: impl Into<String>,
        generated_at: DateTime<Utc>,
        forecast_data: Vec<EmissionsData>,
    ) -> Self {
        Self {
            location: location.into(),
            generated_at,
            requested_at: None,
            data_start_at: None,
            data_end_at: None,
            window_size: Duration::zero(),
            forecast_data,
            optimal_data_points: Vec::new(),
        }
    }
}

/// Serialize a `chrono::Duration` as fractional minutes
pub mod duration_minutes {
    use chrono::Duration;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Minutes represented by `duration`
    #[must_use]
    pub fn to_minutes(duration: &Duration) -> f64 {
        duration.num_milliseconds() as f64 / 60_000.0
    }

    /// Duration for `minutes`, rounded to the millisecond
    ///
    /// `None` for non-finite values and values outside the range of `Duration`.
    #[must_use]
    pub fn from_minutes(minutes: f64) -> Option<Duration> {
        let millis = (minutes * 60_000.0).round();
        // i64::MAX as f64 rounds up to 2^63, which is itself out of range
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return None;
        }
        Duration::try_milliseconds(millis as i64)
    }

    /// Serde serializer
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(to_minutes(duration))
    }

    /// Serde deserializer
    ///
    /// # Errors
    ///
    /// Fails when the value is not a number or is out of range.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let minutes = f64::deserialize(deserializer)?;
        from_minutes(minutes)
            .ok_or_else(|| D::Error::custom(format!("duration of {minutes} minutes is out of range")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_end_saturates_instead_of_overflowing() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let sample = EmissionsData::new("eastus", t0, Duration::days(100_000_000), 10.0);
        assert!(sample.try_end().is_none());
        assert_eq!(sample.end(), DateTime::<Utc>::MAX_UTC);

        let backwards = EmissionsData::new("eastus", t0, -Duration::days(100_000_000), 10.0);
        assert_eq!(backwards.end(), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_from_minutes_rejects_unrepresentable_values() {
        assert_eq!(duration_minutes::from_minutes(1.5), Some(Duration::seconds(90)));
        assert!(duration_minutes::from_minutes(f64::NAN).is_none());
        assert!(duration_minutes::from_minutes(f64::INFINITY).is_none());
        assert!(duration_minutes::from_minutes(1e300).is_none());
    }

    #[test]
    fn test_deserialize_out_of_range_duration_is_an_error() {
        let json = r#"{"location":"eastus","time":"2024-01-01T00:00:00Z","duration":1e300,"rating":1.0}"#;
        let err = serde_json::from_str::<EmissionsData>(json).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
