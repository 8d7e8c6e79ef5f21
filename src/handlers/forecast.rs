// ABOUTME: Forecast entry points: current forecasts per location and historical forecast snapshots
// ABOUTME: Each forecast is clipped, resampled to the workload window and annotated with optimal points
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use std::sync::Arc;

use carbon_providers::CarbonIntensityProvider;
use chrono::{DateTime, Duration, Utc};
use futures_util::future::try_join_all;
use tracing::{debug, info};

use super::{provider_call, validate};
use crate::errors::{CarbonAwareError, CarbonAwareResult, ValidationErrors};
use crate::models::{EmissionsData, EmissionsForecast};
use crate::parameters::{
    DisplayNames, ForecastAsOfQuery, ForecastQuery, ParameterValidator, PropertyName,
    ValidatedParameters,
};
use crate::timeseries::{filter_by_duration, rolling_average, select_optimal};

/// Forecast handler
#[derive(Clone)]
pub struct ForecastHandler {
    provider: Arc<dyn CarbonIntensityProvider>,
    display_names: DisplayNames,
}

impl ForecastHandler {
    /// Handler over `provider`
    #[must_use]
    pub fn new(provider: Arc<dyn CarbonIntensityProvider>) -> Self {
        Self {
            provider,
            display_names: DisplayNames::default(),
        }
    }

    /// Use `display_names` in validation messages
    #[must_use]
    pub fn with_display_names(mut self, display_names: DisplayNames) -> Self {
        self.display_names = display_names;
        self
    }

    /// Latest forecast for every location, in location order
    ///
    /// # Errors
    ///
    /// Returns `CarbonAwareError::Validation` before any remote call when no
    /// location is given or start is not before end. A range outside a
    /// forecast's horizon is a validation error wrapped with its location, as
    /// is any provider failure.
    pub async fn get_current_forecast(
        &self,
        query: &ForecastQuery,
    ) -> CarbonAwareResult<Vec<EmissionsForecast>> {
        let validator = ParameterValidator::new()
            .require(&[PropertyName::MultipleLocations])
            .with_display_names(self.display_names.clone());
        let parameters = validate("get_current_forecast", &validator, query.to_parameters())?;

        let provider = self.provider.as_ref();
        let parameters = &parameters;
        try_join_all(parameters.locations().iter().map(|location| async move {
            let forecast = provider_call(
                provider,
                "fetch_current_forecast",
                location,
                provider.fetch_current_forecast(location),
            )
            .await?;
            self.process_forecast(forecast, parameters)
                .map_err(|e| e.for_location(location.as_str()))
        }))
        .await
    }

    /// Forecast for one location as generated at the requested instant
    ///
    /// Returns `None` when the provider had not produced a forecast yet.
    ///
    /// # Errors
    ///
    /// Returns `CarbonAwareError::Validation` unless the location and requested
    /// instant are set, otherwise the errors of
    /// [`ForecastHandler::get_current_forecast`].
    pub async fn get_forecast_as_of(
        &self,
        query: &ForecastAsOfQuery,
    ) -> CarbonAwareResult<Option<EmissionsForecast>> {
        let validator = ParameterValidator::new()
            .require(&[PropertyName::SingleLocation, PropertyName::Requested])
            .with_display_names(self.display_names.clone());
        let parameters = validate("get_forecast_as_of", &validator, query.to_parameters())?;

        // Both are required above
        let (Some(location), Some(requested_at)) =
            (parameters.single_location(), parameters.requested())
        else {
            return Ok(None);
        };

        let provider = self.provider.as_ref();
        let forecast = provider_call(
            provider,
            "fetch_forecast_as_of",
            location,
            provider.fetch_forecast_as_of(location, requested_at),
        )
        .await?;

        let Some(forecast) = forecast else {
            info!(location, %requested_at, "No forecast existed at the requested instant");
            return Ok(None);
        };
        self.process_forecast(forecast, &parameters)
            .map(Some)
            .map_err(|e| e.for_location(location))
    }

    /// Clip, resample and annotate one forecast
    fn process_forecast(
        &self,
        mut forecast: EmissionsForecast,
        parameters: &ValidatedParameters,
    ) -> CarbonAwareResult<EmissionsForecast> {
        let (Some(horizon_start), Some(horizon_end)) = (
            forecast.forecast_data.first().map(|sample| sample.time),
            forecast.forecast_data.last().map(EmissionsData::end),
        ) else {
            forecast.data_start_at = parameters.start();
            forecast.data_end_at = parameters.end();
            forecast.window_size = Duration::zero();
            forecast.optimal_data_points = Vec::new();
            return Ok(forecast);
        };

        let start = parameters.start_or(horizon_start);
        let end = parameters.end_or(horizon_end);
        self.check_range(start, end, horizon_start, horizon_end)?;

        let clipped = filter_by_duration(&forecast.forecast_data, start, end);
        let windowed = rolling_average(&clipped, parameters.duration(), Some(start), Some(end), None)?;

        forecast.data_start_at = Some(start);
        forecast.data_end_at = Some(end);
        forecast.optimal_data_points = select_optimal(&windowed);
        forecast.window_size = windowed.first().map_or_else(Duration::zero, |s| s.duration);
        forecast.forecast_data = windowed;

        debug!(
            location = %forecast.location,
            points = forecast.forecast_data.len(),
            optimal = forecast.optimal_data_points.len(),
            window_minutes = forecast.window_size.num_minutes(),
            "Processed forecast"
        );
        Ok(forecast)
    }

    /// Clip range must be ordered and inside the forecast horizon
    fn check_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        horizon_start: DateTime<Utc>,
        horizon_end: DateTime<Utc>,
    ) -> CarbonAwareResult<()> {
        let start_name = self.display_names.get(PropertyName::Start);
        let end_name = self.display_names.get(PropertyName::End);
        let within = |instant: DateTime<Utc>| instant >= horizon_start && instant <= horizon_end;

        let mut errors = ValidationErrors::new();
        if start >= end {
            errors.add(start_name, format!("{start_name} must be before {end_name}"));
        }
        if !within(start) {
            errors.add(
                start_name,
                format!(
                    "{start_name} must be within the forecast data range {horizon_start} to {horizon_end}"
                ),
            );
        }
        if !within(end) {
            errors.add(
                end_name,
                format!(
                    "{end_name} must be within the forecast data range {horizon_start} to {horizon_end}"
                ),
            );
        }
        errors.into_result().map_err(CarbonAwareError::from)
    }
}
