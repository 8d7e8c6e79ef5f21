// ABOUTME: WattTime provider implementing the Remote Client Protocol over the v3 API
// ABOUTME: Resolves named locations to regions, converts MOER values and clips history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use async_trait::async_trait;
use chrono::{DateTime, Duration, DurationRound, SecondsFormat, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

use super::config::WattTimeConfig;
use super::models::{GridDataResponse, HistoricalForecastResponse, LoginResponse, RegionResponse};
use crate::constants::watttime::{
    paths, query, FORECAST_GRANULARITY_MINUTES, MIN_SAMPLING_WINDOW_MINUTES, PROVIDER_NAME,
    SIGNAL_TYPE,
};
use crate::core::{CarbonIntensityProvider, LocationResolver};
use crate::credentials::BearerCredential;
use crate::errors::{ProviderError, ProviderResult};
use crate::http_client::{parse_base_url, parse_json_payload, shared_client};
use crate::models::{EmissionsData, EmissionsForecast};
use crate::region_cache::RegionCache;
use crate::timeseries::{extend_time_by_window, filter_by_duration};

/// WattTime marginal-emissions provider
pub struct WattTimeProvider {
    config: WattTimeConfig,
    base_url: Url,
    auth_base_url: Url,
    client: Client,
    credential: BearerCredential,
    regions: RegionCache,
    locations: Arc<dyn LocationResolver>,
}

impl WattTimeProvider {
    /// Provider using the shared HTTP client and a private region cache
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if `config` is invalid.
    pub fn new(config: WattTimeConfig, locations: Arc<dyn LocationResolver>) -> ProviderResult<Self> {
        let regions = RegionCache::with_ttl_secs(config.region_cache_ttl_secs);
        Self::with_parts(config, shared_client().clone(), regions, locations)
    }

    /// Provider with an explicit client and region cache
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if `config` is invalid.
    pub fn with_parts(
        config: WattTimeConfig,
        client: Client,
        regions: RegionCache,
        locations: Arc<dyn LocationResolver>,
    ) -> ProviderResult<Self> {
        config.validate()?;
        let base_url = parse_base_url(PROVIDER_NAME, &config.base_url, "base_url")?;
        let auth_base_url = parse_base_url(PROVIDER_NAME, &config.auth_base_url, "auth_base_url")?;
        Ok(Self {
            config,
            base_url,
            auth_base_url,
            client,
            credential: BearerCredential::new(PROVIDER_NAME),
            regions,
            locations,
        })
    }

    /// Region cache backing [`CarbonIntensityProvider::resolve_region`]
    #[must_use]
    pub const fn region_cache(&self) -> &RegionCache {
        &self.regions
    }

    /// Whether a bearer token is currently held
    pub async fn is_authenticated(&self) -> bool {
        self.credential.is_authenticated().await
    }

    fn endpoint(base: &Url, path: &str) -> ProviderResult<Url> {
        base.join(path)
            .map_err(|e| ProviderError::configuration(PROVIDER_NAME, format!("cannot build url for {path}: {e}")))
    }

    async fn login(&self) -> ProviderResult<String> {
        let url = Self::endpoint(&self.auth_base_url, paths::LOGIN)?;
        info!(username = %self.config.username, "Logging in to WattTime");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Authentication {
                provider: PROVIDER_NAME,
                reason: format!("login for '{}' returned status {status}", self.config.username),
            });
        }

        let login: LoginResponse = response.json().await.map_err(|e| ProviderError::Authentication {
            provider: PROVIDER_NAME,
            reason: format!("unreadable login response: {e}"),
        })?;

        login
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ProviderError::Authentication {
                provider: PROVIDER_NAME,
                reason: "login response did not contain a token".into(),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        resource: &str,
    ) -> ProviderResult<T> {
        let url = Self::endpoint(&self.base_url, path)?;
        debug!(path, ?params, "Requesting WattTime data");

        let response = self
            .credential
            .send_with_reauth(
                || self.login(),
                |token| {
                    let request = self.client.get(url.clone()).query(params).bearer_auth(token);
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
            error!(path, status = status.as_u16(), "WattTime request failed");
            return Err(ProviderError::Http {
                provider: PROVIDER_NAME,
                path: path.to_owned(),
                status: status.as_u16(),
                message: body,
            });
        }

        parse_json_payload(PROVIDER_NAME, &body, resource)
    }

    async fn region_for(&self, location: &str) -> ProviderResult<String> {
        let position = self.locations.resolve(location)?;
        let coordinates = position
            .coordinates()
            .ok_or_else(|| ProviderError::LocationConversion {
                location: location.to_owned(),
                reason: "WattTime requires a latitude and longitude".into(),
            })?;

        let region = self
            .resolve_region(coordinates.latitude, coordinates.longitude)
            .await
            .map_err(|e| {
                error!(location, error = %e, "Failed to convert location into a WattTime region");
                e
            })?;
        debug!(location, region = %region, "Converted location to region");
        Ok(region)
    }
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl CarbonIntensityProvider for WattTimeProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_history(
        &self,
        location: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ProviderResult<Vec<EmissionsData>> {
        info!(location, %start, %end, "Getting WattTime carbon intensity");
        let region = self.region_for(location).await?;
        let (query_start, query_end) =
            extend_time_by_window(start, end, Duration::minutes(MIN_SAMPLING_WINDOW_MINUTES));

        let response: GridDataResponse = self
            .get_json(
                paths::HISTORICAL,
                &[
                    (query::REGION, region.clone()),
                    (query::START, timestamp(query_start)),
                    (query::END, timestamp(query_end)),
                    (query::SIGNAL_TYPE, SIGNAL_TYPE.to_owned()),
                ],
                &format!("history for region {region}"),
            )
            .await?;

        debug!(location, points = response.data.len(), "Received WattTime history");
        let clipped = filter_by_duration(&response.into_history(location), start, end);
        if clipped.is_empty() {
            info!(location, "No WattTime data overlaps the requested period");
        }
        Ok(clipped)
    }

    async fn fetch_current_forecast(&self, location: &str) -> ProviderResult<EmissionsForecast> {
        info!(location, "Getting WattTime current forecast");
        let region = self.region_for(location).await?;

        let response: GridDataResponse = self
            .get_json(
                paths::FORECAST,
                &[
                    (query::REGION, region.clone()),
                    (query::SIGNAL_TYPE, SIGNAL_TYPE.to_owned()),
                ],
                &format!("forecast for region {region}"),
            )
            .await?;

        response.into_forecast(location)
    }

    async fn fetch_forecast_as_of(
        &self,
        location: &str,
        requested_at: DateTime<Utc>,
    ) -> ProviderResult<Option<EmissionsForecast>> {
        info!(location, %requested_at, "Getting WattTime historical forecast");
        let region = self.region_for(location).await?;
        let rounded = requested_at
            .duration_trunc(Duration::minutes(FORECAST_GRANULARITY_MINUTES))
            .unwrap_or(requested_at);

        let response: HistoricalForecastResponse = self
            .get_json(
                paths::FORECAST_HISTORICAL,
                &[
                    (query::REGION, region.clone()),
                    (query::START, timestamp(rounded)),
                    (query::END, timestamp(rounded)),
                    (query::SIGNAL_TYPE, SIGNAL_TYPE.to_owned()),
                ],
                &format!("historical forecast for region {region}"),
            )
            .await?;

        let Some(snapshot) = response.data.into_iter().next() else {
            info!(location, %rounded, "No WattTime forecast was generated at the requested time");
            return Ok(None);
        };

        let mut forecast = snapshot.into_forecast(location)?;
        forecast.requested_at = Some(requested_at);
        Ok(Some(forecast))
    }

    async fn resolve_region(&self, latitude: f64, longitude: f64) -> ProviderResult<String> {
        self.regions
            .get_or_resolve(latitude, longitude, || async move {
                let response: RegionResponse = self
                    .get_json(
                        paths::REGION_FROM_LOCATION,
                        &[
                            (query::LATITUDE, latitude.to_string()),
                            (query::LONGITUDE, longitude.to_string()),
                            (query::SIGNAL_TYPE, SIGNAL_TYPE.to_owned()),
                        ],
                        &format!("region for {latitude},{longitude}"),
                    )
                    .await?;
                debug!(region = %response.region, name = %response.region_full_name, "Resolved WattTime region");
                Ok(response.region)
            })
            .await
    }
}
