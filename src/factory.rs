// ABOUTME: Provider factory selecting emissions and forecast sources from configuration
// ABOUTME: Builds providers once over a shared location source, optionally caches emissions, and hands out handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::{CarbonAwareConfig, DataSourceKind};
use crate::handlers::{EmissionsHandler, ForecastHandler};
use crate::locations::LocationSource;
use crate::providers::{
    build_client, initialize_shared_client, CachedEmissionsProvider, CarbonIntensityProvider,
    LocationResolver,
};

/// Providers serving each data role
#[derive(Clone)]
pub struct DataSources {
    emissions: Arc<dyn CarbonIntensityProvider>,
    forecast: Arc<dyn CarbonIntensityProvider>,
}

impl std::fmt::Debug for DataSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSources").finish_non_exhaustive()
    }
}

impl DataSources {
    /// Pair explicit providers
    #[must_use]
    pub fn new(
        emissions: Arc<dyn CarbonIntensityProvider>,
        forecast: Arc<dyn CarbonIntensityProvider>,
    ) -> Self {
        Self { emissions, forecast }
    }

    /// Build providers from `config`
    ///
    /// Location files are loaded once and shared. A source selected for both
    /// roles is constructed once so it keeps one credential and one cache.
    /// When the emissions cache is enabled it wraps the emissions role only;
    /// forecasts always reach the provider directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP settings are invalid, a location file
    /// cannot be loaded, or a selected provider cannot be constructed or was
    /// compiled out.
    pub fn from_config(config: &CarbonAwareConfig) -> Result<Self> {
        build_client(&config.http)?;
        initialize_shared_client(config.http.clone());

        let locations: Arc<dyn LocationResolver> = Arc::new(LocationSource::from_files(
            &config.location_files,
            &config.location_delimiter,
        )?);

        let emissions_provider = build_provider(config.emissions_source, config, &locations)?;
        let forecast = if config.forecast_source == config.emissions_source {
            Arc::clone(&emissions_provider)
        } else {
            build_provider(config.forecast_source, config, &locations)?
        };

        let emissions: Arc<dyn CarbonIntensityProvider> = if config.emissions_cache.enabled {
            let cached = CachedEmissionsProvider::new(emissions_provider, &config.emissions_cache)?;
            info!(
                expiration_minutes = cached.expiration().num_minutes(),
                "Emissions cache enabled"
            );
            Arc::new(cached)
        } else {
            emissions_provider
        };

        info!(
            emissions = emissions.name(),
            forecast = forecast.name(),
            "Data sources ready"
        );
        Ok(Self::new(emissions, forecast))
    }

    /// Provider for historical emissions
    #[must_use]
    pub fn emissions(&self) -> &Arc<dyn CarbonIntensityProvider> {
        &self.emissions
    }

    /// Provider for forecasts
    #[must_use]
    pub fn forecast(&self) -> &Arc<dyn CarbonIntensityProvider> {
        &self.forecast
    }

    /// Emissions handler on the system clock
    #[must_use]
    pub fn emissions_handler(&self) -> EmissionsHandler {
        self.emissions_handler_with_clock(Arc::new(SystemClock))
    }

    /// Emissions handler on `clock`
    #[must_use]
    pub fn emissions_handler_with_clock(&self, clock: Arc<dyn Clock>) -> EmissionsHandler {
        EmissionsHandler::new(Arc::clone(&self.emissions), clock)
    }

    /// Forecast handler
    #[must_use]
    pub fn forecast_handler(&self) -> ForecastHandler {
        ForecastHandler::new(Arc::clone(&self.forecast))
    }
}

#[allow(unused_variables)]
fn build_provider(
    kind: DataSourceKind,
    config: &CarbonAwareConfig,
    locations: &Arc<dyn LocationResolver>,
) -> Result<Arc<dyn CarbonIntensityProvider>> {
    match kind {
        #[cfg(feature = "provider-watttime")]
        DataSourceKind::WattTime => {
            let settings = config
                .watttime
                .clone()
                .ok_or_else(|| anyhow!("WattTime selected without credentials"))?;
            Ok(Arc::new(crate::providers::WattTimeProvider::new(
                settings,
                Arc::clone(locations),
            )?))
        }
        #[cfg(feature = "provider-electricity-maps")]
        DataSourceKind::ElectricityMaps => Ok(Arc::new(
            crate::providers::ElectricityMapsProvider::new(
                config.electricity_maps.clone(),
                Arc::clone(locations),
            )?,
        )),
        #[cfg(feature = "provider-electricity-maps-free")]
        DataSourceKind::ElectricityMapsFree => Ok(Arc::new(
            crate::providers::ElectricityMapsFreeProvider::new(
                config.electricity_maps_free.clone(),
                Arc::clone(locations),
            )?,
        )),
        #[cfg(feature = "provider-json")]
        DataSourceKind::Json => {
            let path = config
                .json_data_file
                .as_ref()
                .ok_or_else(|| anyhow!("JSON data source selected without a data file"))?;
            Ok(Arc::new(crate::providers::JsonDataProvider::from_file(path)?))
        }
        #[allow(unreachable_patterns)]
        other => Err(anyhow!(
            "data source '{other}' is not available in this build"
        )),
    }
}
