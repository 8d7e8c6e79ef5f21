// ABOUTME: Electricity Maps client configuration: token header, base URL and query options
// ABOUTME: Token header and token must be configured together or not at all
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::electricity_maps::{DEFAULT_BASE_URL, DEFAULT_REGION_CACHE_TTL_SECS, PROVIDER_NAME};
use crate::errors::{ProviderError, ProviderResult};
use crate::http_client::parse_base_url;

/// Which emission factors intensity values are computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionFactorType {
    /// Full life-cycle emissions
    Lifecycle,
    /// Direct combustion emissions only
    Direct,
}

impl EmissionFactorType {
    /// Query-string value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lifecycle => "lifecycle",
            Self::Direct => "direct",
        }
    }
}

impl FromStr for EmissionFactorType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lifecycle" => Ok(Self::Lifecycle),
            "direct" => Ok(Self::Direct),
            other => Err(ProviderError::configuration(
                PROVIDER_NAME,
                format!("unknown emission factor type '{other}', expected 'lifecycle' or 'direct'"),
            )),
        }
    }
}

/// Settings for an [`super::ElectricityMapsProvider`]
#[derive(Clone, PartialEq, Eq)]
pub struct ElectricityMapsConfig {
    /// Header carrying the API token
    pub api_token_header: Option<String>,
    /// API token value
    pub api_token: Option<String>,
    /// Base URL for every endpoint
    pub base_url: String,
    /// Optional `emissionFactorType` for history queries
    pub emission_factor_type: Option<EmissionFactorType>,
    /// Optional `disableEstimations` for history queries
    pub disable_estimations: Option<bool>,
    /// Region cache time-to-live in seconds
    pub region_cache_ttl_secs: u64,
}

impl Default for ElectricityMapsConfig {
    fn default() -> Self {
        Self {
            api_token_header: None,
            api_token: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            emission_factor_type: None,
            disable_estimations: None,
            region_cache_ttl_secs: DEFAULT_REGION_CACHE_TTL_SECS,
        }
    }
}

impl ElectricityMapsConfig {
    /// Configuration authenticating with `header: token`
    #[must_use]
    pub fn with_token(header: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_token_header: Some(header.into()),
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

    /// Header name and value to attach, if configured
    #[must_use]
    pub fn token_header(&self) -> Option<(&str, &str)> {
        match (&self.api_token_header, &self.api_token) {
            (Some(header), Some(token)) if !header.trim().is_empty() => Some((header.as_str(), token.as_str())),
            _ => None,
        }
    }

    /// Check the token pair and base URL
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` naming the first invalid setting.
    pub fn validate(&self) -> ProviderResult<()> {
        let has_header = self
            .api_token_header
            .as_deref()
            .is_some_and(|header| !header.trim().is_empty());
        let has_token = self
            .api_token
            .as_deref()
            .is_some_and(|token| !token.is_empty());

        if has_header && !has_token {
            return Err(ProviderError::configuration(
                PROVIDER_NAME,
                "api_token is required when api_token_header is set",
            ));
        }
        if has_token && !has_header {
            return Err(ProviderError::configuration(
                PROVIDER_NAME,
                "api_token_header is required when api_token is set",
            ));
        }
        parse_base_url(PROVIDER_NAME, &self.base_url, "base_url")?;
        Ok(())
    }
}

impl fmt::Debug for ElectricityMapsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElectricityMapsConfig")
            .field("api_token_header", &self.api_token_header)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("emission_factor_type", &self.emission_factor_type)
            .field("disable_estimations", &self.disable_estimations)
            .field("region_cache_ttl_secs", &self.region_cache_ttl_secs)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_must_be_complete() {
        let header_only = ElectricityMapsConfig {
            api_token_header: Some("auth-token".into()),
            ..ElectricityMapsConfig::default()
        };
        assert!(header_only.validate().is_err());

        let token_only = ElectricityMapsConfig {
            api_token: Some("secret".into()),
            ..ElectricityMapsConfig::default()
        };
        assert!(token_only.validate().is_err());

        assert!(ElectricityMapsConfig::default().validate().is_ok());
        assert!(ElectricityMapsConfig::with_token("auth-token", "secret").validate().is_ok());
    }

    #[test]
    fn test_emission_factor_type_parses_case_insensitively() {
        assert_eq!("Direct".parse::<EmissionFactorType>().unwrap(), EmissionFactorType::Direct);
        assert!("gross".parse::<EmissionFactorType>().is_err());
    }
}
