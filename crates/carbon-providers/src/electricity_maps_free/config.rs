// ABOUTME: Electricity Maps free tier client configuration: API token, base URL and region cache lifetime
// ABOUTME: The token is mandatory and never printed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use std::fmt;

use crate::constants::electricity_maps_free::{
    DEFAULT_BASE_URL, DEFAULT_REGION_CACHE_TTL_SECS, PROVIDER_NAME,
};
use crate::errors::{ProviderError, ProviderResult};
use crate::http_client::parse_base_url;

/// Settings for an [`super::ElectricityMapsFreeProvider`]
#[derive(Clone, PartialEq, Eq)]
pub struct ElectricityMapsFreeConfig {
    /// API token sent in the `auth-token` header
    pub api_token: Option<String>,
    /// Base URL of the API
    pub base_url: String,
    /// Region cache time-to-live in seconds
    pub region_cache_ttl_secs: u64,
}

impl Default for ElectricityMapsFreeConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            region_cache_ttl_secs: DEFAULT_REGION_CACHE_TTL_SECS,
        }
    }
}

impl ElectricityMapsFreeConfig {
    /// Configuration authenticating with `token`
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            api_token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Replace the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Configured token, if non-empty
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    /// Check the token and base URL
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` naming the first invalid setting.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.token().is_none() {
            return Err(ProviderError::configuration(PROVIDER_NAME, "api_token is required"));
        }
        parse_base_url(PROVIDER_NAME, &self.base_url, "base_url")?;
        Ok(())
    }
}

impl fmt::Debug for ElectricityMapsFreeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElectricityMapsFreeConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("region_cache_ttl_secs", &self.region_cache_ttl_secs)
            .finish()
    }
}
