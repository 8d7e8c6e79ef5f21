// ABOUTME: Electricity Maps free tier provider implementing the Remote Client Protocol over the CO2 Signal API
// ABOUTME: Serves the latest reading as a current forecast; history and forecast snapshots are unsupported
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

use super::config::ElectricityMapsFreeConfig;
use super::models::GridEmissionDataPoint;
use crate::clock::{Clock, SystemClock};
use crate::constants::electricity_maps_free::{query, LATEST_PATH, PROVIDER_NAME, TOKEN_HEADER};
use crate::core::{CarbonIntensityProvider, LocationResolver};
use crate::credentials::BearerCredential;
use crate::errors::{ProviderError, ProviderResult};
use crate::http_client::{parse_base_url, parse_json_payload, shared_client};
use crate::models::{EmissionsData, EmissionsForecast};
use crate::region_cache::RegionCache;

/// Electricity Maps free tier provider
pub struct ElectricityMapsFreeProvider {
    token: String,
    latest_url: Url,
    client: Client,
    credential: BearerCredential,
    regions: RegionCache,
    locations: Arc<dyn LocationResolver>,
    clock: Arc<dyn Clock>,
}

impl ElectricityMapsFreeProvider {
    /// Provider using the shared HTTP client and the system clock
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if `config` is invalid.
    pub fn new(
        config: ElectricityMapsFreeConfig,
        locations: Arc<dyn LocationResolver>,
    ) -> ProviderResult<Self> {
        let regions = RegionCache::with_ttl_secs(config.region_cache_ttl_secs);
        Self::with_parts(config, shared_client().clone(), regions, locations, Arc::new(SystemClock))
    }

    /// Provider with an explicit client, region cache and clock
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if `config` is invalid.
    pub fn with_parts(
        config: ElectricityMapsFreeConfig,
        client: Client,
        regions: RegionCache,
        locations: Arc<dyn LocationResolver>,
        clock: Arc<dyn Clock>,
    ) -> ProviderResult<Self> {
        config.validate()?;
        let token = config
            .token()
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::configuration(PROVIDER_NAME, "api_token is required"))?;
        let latest_url = parse_base_url(PROVIDER_NAME, &config.base_url, "base_url")?
            .join(LATEST_PATH)
            .map_err(|e| {
                ProviderError::configuration(PROVIDER_NAME, format!("cannot build url for {LATEST_PATH}: {e}"))
            })?;
        Ok(Self {
            token,
            latest_url,
            client,
            credential: BearerCredential::new(PROVIDER_NAME),
            regions,
            locations,
            clock,
        })
    }

    fn params(&self, location: &str) -> ProviderResult<Vec<(&'static str, String)>> {
        let position = self.locations.resolve(location)?;
        if let Some(coordinates) = position.coordinates() {
            return Ok(vec![
                (query::LATITUDE, coordinates.latitude.to_string()),
                (query::LONGITUDE, coordinates.longitude.to_string()),
            ]);
        }
        position
            .name
            .map(|zone| vec![(query::COUNTRY_CODE, zone)])
            .ok_or_else(|| ProviderError::LocationConversion {
                location: location.to_owned(),
                reason: "Electricity Maps free tier needs coordinates or a country code".into(),
            })
    }

    /// Latest reading for the given query, re-sending the token once on rejection
    async fn latest(&self, params: &[(&'static str, String)]) -> ProviderResult<GridEmissionDataPoint> {
        debug!(?params, "Requesting Electricity Maps free tier data");

        let response = self
            .credential
            .send_with_reauth(
                || {
                    let token = self.token.clone();
                    async move { Ok::<_, ProviderError>(token) }
                },
                |token| {
                    let request = self
                        .client
                        .get(self.latest_url.clone())
                        .query(params)
                        .header(TOKEN_HEADER, token);
                    async move {
                        request
                            .send()
                            .await
                            .map_err(|e| ProviderError::transport(PROVIDER_NAME, e))
                    }
                },
            )
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER_NAME, e))?;

        if !status.is_success() {
            error!(status = status.as_u16(), "Electricity Maps free tier request failed");
            return Err(ProviderError::Http {
                provider: PROVIDER_NAME,
                path: LATEST_PATH.to_owned(),
                status: status.as_u16(),
                message: body,
            });
        }

        parse_json_payload(PROVIDER_NAME, &body, "latest carbon intensity")
    }
}

#[async_trait]
impl CarbonIntensityProvider for ElectricityMapsFreeProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_history(
        &self,
        _location: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> ProviderResult<Vec<EmissionsData>> {
        Err(ProviderError::Unsupported {
            provider: PROVIDER_NAME,
            operation: "historical emissions",
        })
    }

    async fn fetch_current_forecast(&self, location: &str) -> ProviderResult<EmissionsForecast> {
        info!(location, "Getting Electricity Maps free tier current forecast");
        let params = self.params(location)?;
        let point = self.latest(&params).await?;

        let mut forecast = point.into_forecast(location);
        forecast.requested_at = Some(self.clock.now());
        Ok(forecast)
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
        self.regions
            .get_or_resolve(latitude, longitude, || async move {
                let params = [
                    (query::LATITUDE, latitude.to_string()),
                    (query::LONGITUDE, longitude.to_string()),
                ];
                let point = self.latest(&params).await?;
                if point.country_code.is_empty() {
                    return Err(ProviderError::malformed(
                        PROVIDER_NAME,
                        format!("no country code reported for {latitude},{longitude}"),
                    ));
                }
                Ok(point.country_code)
            })
            .await
    }
}
