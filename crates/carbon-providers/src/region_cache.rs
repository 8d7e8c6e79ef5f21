// ABOUTME: TTL-bounded cache mapping rounded geopositions to provider regions
// ABOUTME: Cloneable handle over shared state so one cache can back several clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::errors::ProviderResult;

/// Coordinates are compared at this many decimal places
const KEY_PRECISION: f64 = 10_000.0;

/// Geoposition rounded to four decimal places (about 11 m)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RegionKey {
    latitude_e4: i64,
    longitude_e4: i64,
}

impl RegionKey {
    /// Key for a coordinate pair
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude_e4: (latitude * KEY_PRECISION).round() as i64,
            longitude_e4: (longitude * KEY_PRECISION).round() as i64,
        }
    }
}

/// Cache entry with expiration
struct CacheEntry {
    region: String,
    expires_at: DateTime<Utc>,
}

/// Region lookups cached for a fixed time-to-live
///
/// Expiry is judged against the injected [`Clock`], so tests can move time
/// forward without sleeping.
#[derive(Clone)]
pub struct RegionCache {
    entries: Arc<RwLock<HashMap<RegionKey, CacheEntry>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl RegionCache {
    /// Cache using wall-clock time
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Cache using wall-clock time and a TTL in whole seconds
    #[must_use]
    pub fn with_ttl_secs(ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self::new(ttl)
    }

    /// Cache using a caller-supplied clock
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// Configured time-to-live
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached region for the coordinates, if present and not expired
    pub async fn get(&self, latitude: f64, longitude: f64) -> Option<String> {
        let key = RegionKey::new(latitude, longitude);
        let now = self.clock.now();
        let entries = self.entries.read().await;
        entries
            .get(&key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.region.clone())
    }

    /// Store a region for the coordinates
    ///
    /// Entries whose time-to-live has elapsed are dropped first, so the map
    /// never grows past the set of live keys plus the new one.
    pub async fn insert(&self, latitude: f64, longitude: f64, region: String) {
        let key = RegionKey::new(latitude, longitude);
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, "Purged expired region cache entries");
        }
        entries.insert(key, CacheEntry { region, expires_at });
    }

    /// Cached region, or the result of `resolve` stored for later lookups
    ///
    /// Failed resolutions are not cached.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `resolve`.
    pub async fn get_or_resolve<F, Fut>(
        &self,
        latitude: f64,
        longitude: f64,
        resolve: F,
    ) -> ProviderResult<String>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = ProviderResult<String>> + Send,
    {
        if let Some(region) = self.get(latitude, longitude).await {
            debug!(latitude, longitude, region = %region, "Region cache hit");
            return Ok(region);
        }

        debug!(latitude, longitude, "Region cache miss");
        let region = resolve().await?;
        self.insert(latitude, longitude, region.clone()).await;
        Ok(region)
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
