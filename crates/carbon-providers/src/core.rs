// ABOUTME: Core provider traits for unified carbon-intensity data access
// ABOUTME: Defines the Remote Client Protocol and the location resolver collaborator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

//! # Remote Client Protocol
//!
//! Every provider exposes the same four operations so handlers can swap data
//! sources without changing pipeline code:
//!
//! - **history**: samples overlapping a range for one location
//! - **current forecast**: the most recent forecast
//! - **forecast as of**: the forecast generated at or before an instant, or
//!   `None` when no forecast existed yet
//! - **region resolution**: geoposition to provider-native region or zone
//!
//! Providers own their authentication and entitlement concerns. Calls never
//! mutate provider state, but may refresh credentials and populate caches.
//!
//! ## Example: Adding a New Provider
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use carbon_providers::core::CarbonIntensityProvider;
//! use carbon_providers::errors::{ProviderError, ProviderResult};
//! use carbon_providers::models::{EmissionsData, EmissionsForecast};
//! use chrono::{DateTime, Utc};
//!
//! pub struct FlatProvider;
//!
//! #[async_trait]
//! impl CarbonIntensityProvider for FlatProvider {
//!     fn name(&self) -> &'static str {
//!         "flat"
//!     }
//!
//!     async fn fetch_history(
//!         &self,
//!         _location: &str,
//!         _start: DateTime<Utc>,
//!         _end: DateTime<Utc>,
//!     ) -> ProviderResult<Vec<EmissionsData>> {
//!         Ok(Vec::new())
//!     }
//!
//!     async fn fetch_current_forecast(&self, location: &str) -> ProviderResult<EmissionsForecast> {
//!         Ok(EmissionsForecast::new(location, Utc::now(), Vec::new()))
//!     }
//!
//!     async fn fetch_forecast_as_of(
//!         &self,
//!         _location: &str,
//!         _requested_at: DateTime<Utc>,
//!     ) -> ProviderResult<Option<EmissionsForecast>> {
//!         Ok(None)
//!     }
//!
//!     async fn resolve_region(&self, _latitude: f64, _longitude: f64) -> ProviderResult<String> {
//!         Err(ProviderError::Unsupported { provider: "flat", operation: "region resolution" })
//!     }
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::ProviderResult;
use crate::models::{EmissionsData, EmissionsForecast, NamedGeoposition};

/// Contract every carbon-intensity provider implements
#[async_trait]
pub trait CarbonIntensityProvider: Send + Sync {
    /// Provider name for logs and errors
    fn name(&self) -> &'static str;

    /// Samples whose interval overlaps `[start, end]` for `location`
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport, HTTP, entitlement or payload failures.
    async fn fetch_history(
        &self,
        location: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ProviderResult<Vec<EmissionsData>>;

    /// Most recent forecast for `location`
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport, HTTP, entitlement or payload failures.
    async fn fetch_current_forecast(&self, location: &str) -> ProviderResult<EmissionsForecast>;

    /// Forecast generated at or before `requested_at`
    ///
    /// `Ok(None)` means no forecast existed yet, which is distinct from a
    /// forecast with an empty series.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport, HTTP or payload failures, or
    /// `ProviderError::Unsupported` when the provider keeps no forecast history.
    async fn fetch_forecast_as_of(
        &self,
        location: &str,
        requested_at: DateTime<Utc>,
    ) -> ProviderResult<Option<EmissionsForecast>>;

    /// Provider-native region or zone for a geoposition
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when the provider cannot map the coordinates.
    async fn resolve_region(&self, latitude: f64, longitude: f64) -> ProviderResult<String>;
}

/// Maps a caller-facing location name to a geoposition
pub trait LocationResolver: Send + Sync {
    /// Resolve `name` (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::UnknownLocation` for unrecognized names.
    fn resolve(&self, name: &str) -> ProviderResult<NamedGeoposition>;
}
