// ABOUTME: Electricity Maps provider implementing the Remote Client Protocol over the v3 API
// ABOUTME: Routes recent history vs past-range by clock, checks zone entitlements before zone queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

use super::config::ElectricityMapsConfig;
use super::models::{to_history, ForecastResponse, HistoryResponse, PastRangeResponse};
use crate::clock::{Clock, SystemClock};
use crate::constants::electricity_maps::{
    paths, query, PROVIDER_NAME, RECENT_HISTORY_HOURS, UNAUTHORIZED_ENDPOINT, UNAUTHORIZED_ZONE,
};
use crate::core::{CarbonIntensityProvider, LocationResolver};
use crate::entitlements::{EntitlementSet, ZoneAccess};
use crate::errors::{ProviderError, ProviderResult};
use crate::http_client::{parse_base_url, parse_json_payload, shared_client};
use crate::models::{EmissionsData, EmissionsForecast, Geoposition};
use crate::region_cache::RegionCache;
use crate::timeseries::filter_by_duration;

/// How a location is addressed on the wire
enum Target {
    Coordinates(Geoposition),
    Zone(String),
}

impl Target {
    fn zone(&self) -> Option<&str> {
        match self {
            Self::Zone(zone) => Some(zone),
            Self::Coordinates(_) => None,
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Coordinates(position) => vec![
                (query::LATITUDE, position.latitude.to_string()),
                (query::LONGITUDE, position.longitude.to_string()),
            ],
            Self::Zone(zone) => vec![(query::ZONE, zone.clone())],
        }
    }
}

/// Electricity Maps average carbon-intensity provider
pub struct ElectricityMapsProvider {
    config: ElectricityMapsConfig,
    base_url: Url,
    client: Client,
    entitlements: EntitlementSet,
    regions: RegionCache,
    locations: Arc<dyn LocationResolver>,
    clock: Arc<dyn Clock>,
}

impl ElectricityMapsProvider {
    /// Provider using the shared HTTP client and the system clock
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if `config` is invalid.
    pub fn new(config: ElectricityMapsConfig, locations: Arc<dyn LocationResolver>) -> ProviderResult<Self> {
        let regions = RegionCache::with_ttl_secs(config.region_cache_ttl_secs);
        Self::with_parts(config, shared_client().clone(), regions, locations, Arc::new(SystemClock))
    }

    /// Provider with an explicit client, region cache and clock
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if `config` is invalid.
    pub fn with_parts(
        config: ElectricityMapsConfig,
        client: Client,
        regions: RegionCache,
        locations: Arc<dyn LocationResolver>,
        clock: Arc<dyn Clock>,
    ) -> ProviderResult<Self> {
        config.validate()?;
        let base_url = parse_base_url(PROVIDER_NAME, &config.base_url, "base_url")?;
        Ok(Self {
            config,
            base_url,
            client,
            entitlements: EntitlementSet::new(PROVIDER_NAME),
            regions,
            locations,
            clock,
        })
    }

    /// Whether the zone entitlement table has been requested
    #[must_use]
    pub fn entitlements_loaded(&self) -> bool {
        self.entitlements.is_initialized()
    }

    fn target(&self, location: &str) -> ProviderResult<Target> {
        let position = self.locations.resolve(location)?;
        if let Some(coordinates) = position.coordinates() {
            return Ok(Target::Coordinates(coordinates));
        }
        position.name.map(Target::Zone).ok_or_else(|| ProviderError::LocationConversion {
            location: location.to_owned(),
            reason: "Electricity Maps needs coordinates or a zone name".into(),
        })
    }

    fn optional_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(factor) = self.config.emission_factor_type {
            params.push((query::EMISSION_FACTOR_TYPE, factor.as_str().to_owned()));
        }
        if let Some(disable) = self.config.disable_estimations {
            params.push((query::DISABLE_ESTIMATIONS, disable.to_string()));
        }
        params
    }

    async fn fetch_zones(&self) -> ProviderResult<HashMap<String, ZoneAccess>> {
        self.request(paths::ZONES, &[], "zones").await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        target: &Target,
        extra: Vec<(&'static str, String)>,
        resource: &str,
    ) -> ProviderResult<T> {
        if let Some(zone) = target.zone() {
            self.entitlements
                .check(zone, path, || self.fetch_zones())
                .await?;
        }

        let mut params = target.params();
        params.extend(extra);
        self.request(path, &params, resource).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
        resource: &str,
    ) -> ProviderResult<T> {
        let url = self.base_url.join(path).map_err(|e| {
            ProviderError::configuration(PROVIDER_NAME, format!("cannot build url for {path}: {e}"))
        })?;
        debug!(path, ?params, "Requesting Electricity Maps data");

        let mut request = self.client.get(url).query(params);
        if let Some((header, token)) = self.config.token_header() {
            request = request.header(header, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER_NAME, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER_NAME, e))?;

        if !status.is_success() {
            return Err(http_error(path, status, body));
        }

        parse_json_payload(PROVIDER_NAME, &body, resource)
    }
}

fn http_error(path: &str, status: StatusCode, body: String) -> ProviderError {
    let message = if body.contains(UNAUTHORIZED_ZONE) {
        error!(path, status = status.as_u16(), "Electricity Maps token is not authorized for this zone");
        format!("token is not authorized for this zone: {body}")
    } else if body.contains(UNAUTHORIZED_ENDPOINT) {
        error!(path, status = status.as_u16(), "Electricity Maps token is not authorized for this endpoint");
        format!("token is not authorized for this endpoint: {body}")
    } else {
        error!(path, status = status.as_u16(), "Electricity Maps request failed");
        body
    };

    ProviderError::Http {
        provider: PROVIDER_NAME,
        path: path.to_owned(),
        status: status.as_u16(),
        message,
    }
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl CarbonIntensityProvider for ElectricityMapsProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_history(
        &self,
        location: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ProviderResult<Vec<EmissionsData>> {
        let target = self.target(location)?;
        let now = self.clock.now();
        let horizon = now - Duration::hours(RECENT_HISTORY_HOURS);
        let is_recent = |instant: DateTime<Utc>| instant > horizon && instant <= now;

        let points = if is_recent(start) && is_recent(end) {
            debug!(location, "Using Electricity Maps recent history");
            let response: HistoryResponse = self
                .get_json(paths::HISTORY, &target, self.optional_params(), "carbon intensity history")
                .await?;
            response.history
        } else {
            debug!(location, %start, %end, "Using Electricity Maps past range");
            let mut extra = vec![
                (query::START, timestamp(start)),
                (query::END, timestamp(end)),
            ];
            extra.extend(self.optional_params());
            let response: PastRangeResponse = self
                .get_json(paths::PAST_RANGE, &target, extra, "carbon intensity past range")
                .await?;
            response.data
        };

        debug!(location, points = points.len(), "Received Electricity Maps history");
        Ok(filter_by_duration(&to_history(&points, location), start, end))
    }

    async fn fetch_current_forecast(&self, location: &str) -> ProviderResult<EmissionsForecast> {
        info!(location, "Getting Electricity Maps current forecast");
        let target = self.target(location)?;
        let response: ForecastResponse = self
            .get_json(paths::FORECAST, &target, Vec::new(), "carbon intensity forecast")
            .await?;

        let mut forecast = response.into_forecast(location);
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
                let target = Target::Coordinates(Geoposition::new(latitude, longitude));
                let response: HistoryResponse = self
                    .get_json(paths::HISTORY, &target, Vec::new(), "zone lookup")
                    .await?;
                if response.zone.is_empty() {
                    return Err(ProviderError::malformed(
                        PROVIDER_NAME,
                        format!("no zone reported for {latitude},{longitude}"),
                    ));
                }
                Ok(response.zone)
            })
            .await
    }
}
