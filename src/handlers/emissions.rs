// ABOUTME: Historical emissions entry points over an injected provider and clock
// ABOUTME: Raw samples per location, the optimal subset across locations, and period averages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use std::sync::Arc;

use carbon_providers::CarbonIntensityProvider;
use futures_util::future::try_join_all;
use tracing::{debug, info};

use super::{provider_call, validate};
use crate::clock::Clock;
use crate::errors::CarbonAwareResult;
use crate::models::EmissionsData;
use crate::parameters::{
    AverageQuery, DisplayNames, EmissionsQuery, ParameterValidator, PropertyName, Relationship,
};
use crate::timeseries::{average_over_period, select_optimal};

/// Historical emissions handler
#[derive(Clone)]
pub struct EmissionsHandler {
    provider: Arc<dyn CarbonIntensityProvider>,
    clock: Arc<dyn Clock>,
    display_names: DisplayNames,
}

impl EmissionsHandler {
    /// Handler over `provider`, using `clock` for default ranges
    #[must_use]
    pub fn new(provider: Arc<dyn CarbonIntensityProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            clock,
            display_names: DisplayNames::default(),
        }
    }

    /// Use `display_names` in validation messages
    #[must_use]
    pub fn with_display_names(mut self, display_names: DisplayNames) -> Self {
        self.display_names = display_names;
        self
    }

    fn multi_location_validator(&self) -> ParameterValidator {
        ParameterValidator::new()
            .require(&[PropertyName::MultipleLocations])
            .check(&[Relationship::StartRequiredIfEnd])
            .with_display_names(self.display_names.clone())
    }

    /// Samples for every location overlapping `[start, end]`, in location order
    ///
    /// `start` defaults to now and `end` to `start`, which returns the samples
    /// covering that instant.
    ///
    /// # Errors
    ///
    /// Returns `CarbonAwareError::Validation` before any remote call when the
    /// query is invalid, otherwise the first provider failure wrapped with its
    /// location.
    pub async fn get_emissions_data(
        &self,
        query: &EmissionsQuery,
    ) -> CarbonAwareResult<Vec<EmissionsData>> {
        let parameters = validate(
            "get_emissions_data",
            &self.multi_location_validator(),
            query.to_parameters(),
        )?;
        let start = parameters.start_or(self.clock.now());
        let end = parameters.end_or(start);

        let provider = self.provider.as_ref();
        let per_location = try_join_all(parameters.locations().iter().map(|location| {
            provider_call(
                provider,
                "fetch_history",
                location,
                provider.fetch_history(location, start, end),
            )
        }))
        .await?;

        let samples: Vec<EmissionsData> = per_location.into_iter().flatten().collect();
        debug!(
            locations = parameters.locations().len(),
            samples = samples.len(),
            %start,
            %end,
            "Fetched emissions data"
        );
        Ok(samples)
    }

    /// Lowest-intensity samples across every requested location
    ///
    /// # Errors
    ///
    /// Same as [`EmissionsHandler::get_emissions_data`].
    pub async fn get_best_emissions_data(
        &self,
        query: &EmissionsQuery,
    ) -> CarbonAwareResult<Vec<EmissionsData>> {
        let samples = self.get_emissions_data(query).await?;
        Ok(select_optimal(&samples))
    }

    /// Duration-weighted mean intensity for one location over `[start, end]`
    ///
    /// # Errors
    ///
    /// Returns `CarbonAwareError::Validation` unless location, start and end are
    /// all set with start before end; otherwise provider failures and the
    /// continuity and range errors of the period average, wrapped with the
    /// location.
    pub async fn get_average_carbon_intensity(
        &self,
        query: &AverageQuery,
    ) -> CarbonAwareResult<f64> {
        let validator = ParameterValidator::new()
            .require(&[
                PropertyName::SingleLocation,
                PropertyName::Start,
                PropertyName::End,
            ])
            .with_display_names(self.display_names.clone());
        let parameters = validate(
            "get_average_carbon_intensity",
            &validator,
            query.to_parameters(),
        )?;

        // All three are required above, so the fallbacks never apply
        let location = parameters.single_location().unwrap_or_default();
        let start = parameters.start_or(self.clock.now());
        let end = parameters.end_or(start);

        let provider = self.provider.as_ref();
        let samples = provider_call(
            provider,
            "fetch_history",
            location,
            provider.fetch_history(location, start, end),
        )
        .await?;

        let average = average_over_period(&samples, start, end)
            .map_err(|e| e.for_location(location))?;
        info!(location, %start, %end, average, "Computed average carbon intensity");
        Ok(average)
    }
}
