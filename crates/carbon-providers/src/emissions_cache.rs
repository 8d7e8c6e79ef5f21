// ABOUTME: Caching decorator keeping the latest emissions fetched per location for a fixed lifetime
// ABOUTME: Later history queries answered by a cached subset skip the wrapped provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

//! # Latest Emissions Cache
//!
//! [`CachedEmissionsProvider`] wraps any [`CarbonIntensityProvider`] and keeps
//! the most recent `fetch_history` result for each location name. A later
//! query for the same location is answered from the cache when the entry has
//! not expired and at least one cached sample starts inside the requested
//! range; otherwise the wrapped provider is called and its result replaces the
//! entry.
//!
//! Forecast and region lookups always go to the wrapped provider.
//!
//! ```text
//! let provider: Arc<dyn CarbonIntensityProvider> = Arc::new(WattTimeProvider::new(config, locations)?);
//! let cached = CachedEmissionsProvider::new(provider, &EmissionsCacheConfig::enabled(10))?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::core::CarbonIntensityProvider;
use crate::errors::{ProviderError, ProviderResult};
use crate::models::{EmissionsData, EmissionsForecast};

/// Name used in configuration errors raised by the cache
const CACHE_NAME: &str = "EmissionsDataCache";

/// Emissions cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmissionsCacheConfig {
    /// Wrap the emissions provider in the cache
    pub enabled: bool,
    /// Minutes a cached entry stays valid
    pub expiration_minutes: i64,
}

impl EmissionsCacheConfig {
    /// Enabled cache with the given lifetime
    #[must_use]
    pub const fn enabled(expiration_minutes: i64) -> Self {
        Self {
            enabled: true,
            expiration_minutes,
        }
    }

    /// Entry lifetime
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` unless the lifetime is a
    /// positive, representable number of minutes.
    pub fn expiration(&self) -> ProviderResult<Duration> {
        if self.expiration_minutes <= 0 {
            return Err(ProviderError::configuration(
                CACHE_NAME,
                "expiration period for the data cache must be greater than 0",
            ));
        }
        Duration::try_minutes(self.expiration_minutes).ok_or_else(|| {
            ProviderError::configuration(
                CACHE_NAME,
                format!("expiration of {} minutes is out of range", self.expiration_minutes),
            )
        })
    }

    /// Check the settings when the cache is enabled
    ///
    /// # Errors
    ///
    /// See [`EmissionsCacheConfig::expiration`].
    pub fn validate(&self) -> ProviderResult<()> {
        if self.enabled {
            self.expiration()?;
        }
        Ok(())
    }
}

struct CacheEntry {
    expires_at: DateTime<Utc>,
    data: Vec<EmissionsData>,
}

/// Provider decorator caching the latest history per location
pub struct CachedEmissionsProvider {
    inner: Arc<dyn CarbonIntensityProvider>,
    entries: RwLock<HashMap<String, CacheEntry>>,
    expiration: Duration,
    clock: Arc<dyn Clock>,
}

impl CachedEmissionsProvider {
    /// Wrap `inner` using wall-clock time
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` for an invalid lifetime.
    pub fn new(
        inner: Arc<dyn CarbonIntensityProvider>,
        config: &EmissionsCacheConfig,
    ) -> ProviderResult<Self> {
        Self::with_clock(inner, config, Arc::new(SystemClock))
    }

    /// Wrap `inner`, judging expiry against `clock`
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` for an invalid lifetime.
    pub fn with_clock(
        inner: Arc<dyn CarbonIntensityProvider>,
        config: &EmissionsCacheConfig,
        clock: Arc<dyn Clock>,
    ) -> ProviderResult<Self> {
        Ok(Self {
            inner,
            entries: RwLock::new(HashMap::new()),
            expiration: config.expiration()?,
            clock,
        })
    }

    /// Wrapped provider
    #[must_use]
    pub fn inner(&self) -> &Arc<dyn CarbonIntensityProvider> {
        &self.inner
    }

    /// Entry lifetime
    #[must_use]
    pub const fn expiration(&self) -> Duration {
        self.expiration
    }

    async fn cached(
        &self,
        location: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Option<Vec<EmissionsData>> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        let entry = entries.get(location).filter(|entry| now < entry.expires_at)?;
        let hits: Vec<EmissionsData> = entry
            .data
            .iter()
            .filter(|sample| sample.time_between(start, end))
            .cloned()
            .collect();
        (!hits.is_empty()).then_some(hits)
    }
}

impl fmt::Debug for CachedEmissionsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedEmissionsProvider")
            .field("inner", &self.inner.name())
            .field("expiration_minutes", &self.expiration.num_minutes())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CarbonIntensityProvider for CachedEmissionsProvider {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch_history(
        &self,
        location: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ProviderResult<Vec<EmissionsData>> {
        // Unnamed locations have no stable key
        if location.trim().is_empty() {
            return self.inner.fetch_history(location, start, end).await;
        }

        if let Some(hits) = self.cached(location, start, end).await {
            debug!(location, samples = hits.len(), "Emissions cache hit");
            return Ok(hits);
        }

        debug!(location, "Emissions cache miss");
        let data = self.inner.fetch_history(location, start, end).await?;
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.expiration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.write().await.insert(
            location.to_owned(),
            CacheEntry {
                expires_at,
                data: data.clone(),
            },
        );
        Ok(data)
    }

    async fn fetch_current_forecast(&self, location: &str) -> ProviderResult<EmissionsForecast> {
        self.inner.fetch_current_forecast(location).await
    }

    async fn fetch_forecast_as_of(
        &self,
        location: &str,
        requested_at: DateTime<Utc>,
    ) -> ProviderResult<Option<EmissionsForecast>> {
        self.inner.fetch_forecast_as_of(location, requested_at).await
    }

    async fn resolve_region(&self, latitude: f64, longitude: f64) -> ProviderResult<String> {
        self.inner.resolve_region(latitude, longitude).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiration_must_be_positive() {
        assert!(EmissionsCacheConfig::enabled(0).expiration().is_err());
        assert!(EmissionsCacheConfig::enabled(-5).validate().is_err());
        assert!(EmissionsCacheConfig::enabled(i64::MAX).expiration().is_err());
        assert_eq!(
            EmissionsCacheConfig::enabled(10).expiration().ok(),
            Some(Duration::minutes(10))
        );
    }

    #[test]
    fn test_disabled_cache_skips_validation() {
        assert!(EmissionsCacheConfig::default().validate().is_ok());
    }
}
