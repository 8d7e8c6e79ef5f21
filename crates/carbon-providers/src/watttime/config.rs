// ABOUTME: WattTime client configuration with defaults for the v3 API
// ABOUTME: Validates credentials and base URLs before a client is built
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use std::fmt;

use crate::constants::watttime::{
    DEFAULT_AUTH_BASE_URL, DEFAULT_BASE_URL, DEFAULT_REGION_CACHE_TTL_SECS, PROVIDER_NAME,
};
use crate::errors::{ProviderError, ProviderResult};
use crate::http_client::parse_base_url;

/// Settings for a [`super::WattTimeProvider`]
#[derive(Clone, PartialEq, Eq)]
pub struct WattTimeConfig {
    /// Account username
    pub username: String,
    /// Account password
    pub password: String,
    /// Base URL for data endpoints
    pub base_url: String,
    /// Base URL for the login endpoint
    pub auth_base_url: String,
    /// Region cache time-to-live in seconds
    pub region_cache_ttl_secs: u64,
}

impl WattTimeConfig {
    /// Configuration with default endpoints for the given account
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_owned(),
            region_cache_ttl_secs: DEFAULT_REGION_CACHE_TTL_SECS,
        }
    }

    /// Point both data and login endpoints at `base_url`
    #[must_use]
    pub fn with_base_urls(mut self, base_url: impl Into<String>, auth_base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self.auth_base_url = auth_base_url.into();
        self
    }

    /// Check required fields are present and URLs are absolute
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` naming the first invalid setting.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.username.trim().is_empty() {
            return Err(ProviderError::configuration(PROVIDER_NAME, "username is required"));
        }
        if self.password.is_empty() {
            return Err(ProviderError::configuration(PROVIDER_NAME, "password is required"));
        }
        parse_base_url(PROVIDER_NAME, &self.base_url, "base_url")?;
        parse_base_url(PROVIDER_NAME, &self.auth_base_url, "auth_base_url")?;
        Ok(())
    }
}

impl fmt::Debug for WattTimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WattTimeConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("auth_base_url", &self.auth_base_url)
            .field("region_cache_ttl_secs", &self.region_cache_ttl_secs)
            .finish()
    }
}
