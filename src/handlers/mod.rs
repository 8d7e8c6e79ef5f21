// ABOUTME: Pipeline entry points exposed to presentation layers
// ABOUTME: Emissions and forecast handlers validate, fetch, transform and annotate per location
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

//! Entry points
//!
//! Handlers own no state beyond the provider they wrap, the clock used for
//! default time ranges and the display names used in validation messages.
//! Parameters are validated before any remote call is issued; multi-location
//! queries run concurrently and return results in input order.

/// Historical emissions, best emissions and average intensity
pub mod emissions;

/// Current and historical forecasts
pub mod forecast;

pub use emissions::EmissionsHandler;
pub use forecast::ForecastHandler;

use std::future::Future;
use std::time::Instant;

use carbon_providers::CarbonIntensityProvider;

use crate::errors::{CarbonAwareError, CarbonAwareResult, ProviderResult};
use crate::logging::PipelineLogger;
use crate::parameters::{CarbonAwareParameters, ParameterValidator, ValidatedParameters};

/// Run `validator` over `parameters`, logging a rejection
fn validate(
    operation: &str,
    validator: &ParameterValidator,
    parameters: CarbonAwareParameters,
) -> CarbonAwareResult<ValidatedParameters> {
    validator.validate(parameters).map_err(|errors| {
        PipelineLogger::log_validation_failure(operation, &errors);
        CarbonAwareError::from(errors)
    })
}

/// Await one provider call, log its outcome and tag failures with `location`
async fn provider_call<T, F>(
    provider: &dyn CarbonIntensityProvider,
    operation: &str,
    location: &str,
    call: F,
) -> CarbonAwareResult<T>
where
    F: Future<Output = ProviderResult<T>> + Send,
{
    let started = Instant::now();
    let result = call.await;
    PipelineLogger::log_provider_call(
        provider.name(),
        operation,
        location,
        result.is_ok(),
        started.elapsed().as_millis(),
    );
    result.map_err(|e| CarbonAwareError::from(e).for_location(location))
}
