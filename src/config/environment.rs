// ABOUTME: Environment configuration for data sources, location files and outbound HTTP
// ABOUTME: Parses and validates at load time so a misconfigured provider fails before first use
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

//! Environment-based configuration

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::{
    electricity_maps, electricity_maps_free, emissions_cache, env_config, locations, watttime,
};
use crate::locations::LocationFile;
use crate::providers::{
    ElectricityMapsConfig, ElectricityMapsFreeConfig, EmissionFactorType, EmissionsCacheConfig,
    HttpClientConfig, ProxyConfig, WattTimeConfig,
};

/// Provider selected for a data role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// `WattTime` marginal emissions
    WattTime,
    /// Electricity Maps average intensity
    ElectricityMaps,
    /// Electricity Maps free tier latest intensity, forecasts only
    ElectricityMapsFree,
    /// Static JSON data file
    #[default]
    Json,
}

impl DataSourceKind {
    /// Configuration value naming this source
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WattTime => "watttime",
            Self::ElectricityMaps => "electricitymaps",
            Self::ElectricityMapsFree => "electricitymapsfree",
            Self::Json => "json",
        }
    }
}

impl FromStr for DataSourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "watttime" => Ok(Self::WattTime),
            "electricitymaps" | "electricity-maps" | "electricity_maps" => Ok(Self::ElectricityMaps),
            "electricitymapsfree" | "electricity-maps-free" | "electricity_maps_free" => {
                Ok(Self::ElectricityMapsFree)
            }
            "json" => Ok(Self::Json),
            other => Err(anyhow!(
                "unknown data source '{other}', expected watttime, electricitymaps, electricitymapsfree or json"
            )),
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct CarbonAwareConfig {
    /// Provider serving historical emissions
    pub emissions_source: DataSourceKind,
    /// Provider serving forecasts
    pub forecast_source: DataSourceKind,
    /// `WattTime` settings, present when credentials were supplied
    pub watttime: Option<WattTimeConfig>,
    /// Electricity Maps settings
    pub electricity_maps: ElectricityMapsConfig,
    /// Electricity Maps free tier settings
    pub electricity_maps_free: ElectricityMapsFreeConfig,
    /// Latest-emissions cache wrapped around the emissions source
    pub emissions_cache: EmissionsCacheConfig,
    /// Data file for the JSON source
    pub json_data_file: Option<PathBuf>,
    /// Location files, loaded in order
    pub location_files: Vec<LocationFile>,
    /// Separator between a location file prefix and its keys
    pub location_delimiter: String,
    /// Outbound HTTP settings
    pub http: HttpClientConfig,
}

impl CarbonAwareConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or a selected data
    /// source is missing required settings.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    ///
    /// # Errors
    ///
    /// See [`CarbonAwareConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let emissions_source = parse_or(&var, env_config::EMISSIONS_DATA_SOURCE, DataSourceKind::Json)?;
        let forecast_source = parse_or(&var, env_config::FORECAST_DATA_SOURCE, DataSourceKind::Json)?;

        let watttime = match (var(env_config::WATTTIME_USERNAME), var(env_config::WATTTIME_PASSWORD)) {
            (Some(username), Some(password)) => {
                let mut config = WattTimeConfig::new(username, password).with_base_urls(
                    env_var_or(&var, env_config::WATTTIME_BASE_URL, watttime::DEFAULT_BASE_URL),
                    env_var_or(&var, env_config::WATTTIME_AUTH_BASE_URL, watttime::DEFAULT_AUTH_BASE_URL),
                );
                config.region_cache_ttl_secs = parse_or(
                    &var,
                    env_config::WATTTIME_REGION_CACHE_TTL_SECS,
                    watttime::DEFAULT_REGION_CACHE_TTL_SECS,
                )?;
                Some(config)
            }
            (None, None) => None,
            _ => {
                warn!("Only one of WATTTIME_USERNAME and WATTTIME_PASSWORD is set, ignoring WattTime credentials");
                None
            }
        };

        let electricity_maps = ElectricityMapsConfig {
            api_token_header: var(env_config::ELECTRICITYMAPS_API_TOKEN_HEADER),
            api_token: var(env_config::ELECTRICITYMAPS_API_TOKEN),
            base_url: env_var_or(
                &var,
                env_config::ELECTRICITYMAPS_BASE_URL,
                electricity_maps::DEFAULT_BASE_URL,
            ),
            emission_factor_type: var(env_config::ELECTRICITYMAPS_EMISSION_FACTOR_TYPE)
                .map(|value| value.parse::<EmissionFactorType>())
                .transpose()
                .with_context(|| format!("invalid {}", env_config::ELECTRICITYMAPS_EMISSION_FACTOR_TYPE))?,
            disable_estimations: var(env_config::ELECTRICITYMAPS_DISABLE_ESTIMATIONS)
                .map(|value| parse_bool(env_config::ELECTRICITYMAPS_DISABLE_ESTIMATIONS, &value))
                .transpose()?,
            ..ElectricityMapsConfig::default()
        };

        let electricity_maps_free = ElectricityMapsFreeConfig {
            api_token: var(env_config::ELECTRICITYMAPSFREE_API_TOKEN),
            base_url: env_var_or(
                &var,
                env_config::ELECTRICITYMAPSFREE_BASE_URL,
                electricity_maps_free::DEFAULT_BASE_URL,
            ),
            ..ElectricityMapsFreeConfig::default()
        };

        let emissions_cache = EmissionsCacheConfig {
            enabled: var(env_config::EMISSIONS_CACHE_ENABLED)
                .map(|value| parse_bool(env_config::EMISSIONS_CACHE_ENABLED, &value))
                .transpose()?
                .unwrap_or(false),
            expiration_minutes: parse_or(
                &var,
                env_config::EMISSIONS_CACHE_EXPIRATION_MIN,
                emissions_cache::DEFAULT_EXPIRATION_MINUTES,
            )?,
        };

        let location_files = var(env_config::LOCATION_FILES)
            .map(|value| parse_location_files(&value))
            .transpose()?
            .unwrap_or_default();

        let proxy = var(env_config::PROXY_URL).map(|url| ProxyConfig {
            url,
            username: var(env_config::PROXY_USERNAME),
            password: var(env_config::PROXY_PASSWORD),
        });
        let defaults = HttpClientConfig::default();
        let http = HttpClientConfig {
            timeout_secs: parse_or(&var, env_config::HTTP_CLIENT_TIMEOUT_SECS, defaults.timeout_secs)?,
            connect_timeout_secs: parse_or(
                &var,
                env_config::HTTP_CLIENT_CONNECT_TIMEOUT_SECS,
                defaults.connect_timeout_secs,
            )?,
            proxy,
        };

        let config = Self {
            emissions_source,
            forecast_source,
            watttime,
            electricity_maps,
            electricity_maps_free,
            emissions_cache,
            json_data_file: var(env_config::JSON_DATA_FILE).map(PathBuf::from),
            location_files,
            location_delimiter: env_var_or(
                &var,
                env_config::LOCATION_DELIMITER,
                locations::DEFAULT_DELIMITER,
            ),
            http,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every selected data source has what it needs
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.emissions_source == DataSourceKind::ElectricityMapsFree {
            return Err(anyhow!(
                "the Electricity Maps free tier only serves forecasts and cannot be the {} source",
                env_config::EMISSIONS_DATA_SOURCE
            ));
        }

        for kind in self.selected_sources() {
            match kind {
                DataSourceKind::WattTime => {
                    let config = self.watttime.as_ref().ok_or_else(|| {
                        anyhow!(
                            "{} and {} are required when WattTime is selected",
                            env_config::WATTTIME_USERNAME,
                            env_config::WATTTIME_PASSWORD
                        )
                    })?;
                    config.validate()?;
                }
                DataSourceKind::ElectricityMaps => self.electricity_maps.validate()?,
                DataSourceKind::ElectricityMapsFree => {
                    self.electricity_maps_free.validate().with_context(|| {
                        format!(
                            "invalid Electricity Maps free tier settings, check {} and {}",
                            env_config::ELECTRICITYMAPSFREE_API_TOKEN,
                            env_config::ELECTRICITYMAPSFREE_BASE_URL
                        )
                    })?;
                }
                DataSourceKind::Json => {
                    if self.json_data_file.is_none() {
                        return Err(anyhow!(
                            "{} is required when the JSON data source is selected",
                            env_config::JSON_DATA_FILE
                        ));
                    }
                }
            }
        }

        self.emissions_cache.validate().with_context(|| {
            format!("invalid {}", env_config::EMISSIONS_CACHE_EXPIRATION_MIN)
        })?;

        if self.http.timeout_secs == 0 || self.http.connect_timeout_secs == 0 {
            return Err(anyhow!("HTTP client timeouts must be greater than zero"));
        }
        Ok(())
    }

    /// Distinct sources in emissions, forecast order
    #[must_use]
    pub fn selected_sources(&self) -> Vec<DataSourceKind> {
        if self.emissions_source == self.forecast_source {
            vec![self.emissions_source]
        } else {
            vec![self.emissions_source, self.forecast_source]
        }
    }

    /// Human-readable summary with secrets left out
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Carbon Aware Configuration:\n\
             - Emissions Source: {}\n\
             - Forecast Source: {}\n\
             - WattTime: {}\n\
             - Electricity Maps Token: {}\n\
             - Electricity Maps Free Token: {}\n\
             - Emissions Cache: {}\n\
             - JSON Data File: {}\n\
             - Location Files: {}\n\
             - HTTP Timeout: {}s (connect {}s)\n\
             - Proxy: {}",
            self.emissions_source,
            self.forecast_source,
            self.watttime
                .as_ref()
                .map_or("Not configured", |_| "Configured"),
            if self.electricity_maps.token_header().is_some() {
                "Configured"
            } else {
                "Not configured"
            },
            if self.electricity_maps_free.token().is_some() {
                "Configured"
            } else {
                "Not configured"
            },
            if self.emissions_cache.enabled {
                format!("Enabled ({} min)", self.emissions_cache.expiration_minutes)
            } else {
                "Disabled".to_owned()
            },
            self.json_data_file
                .as_ref()
                .map_or_else(|| "None".to_owned(), |path| path.display().to_string()),
            self.location_files.len(),
            self.http.timeout_secs,
            self.http.connect_timeout_secs,
            if self.http.proxy.is_some() { "Enabled" } else { "Disabled" },
        )
    }
}

/// Value of `key`, or `default` when unset
fn env_var_or<F>(var: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    var(key).unwrap_or_else(|| default.to_owned())
}

/// Parsed value of `key`, or `default` when unset
fn parse_or<F, T>(var: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    var(key).map_or(Ok(default), |value| {
        value
            .parse()
            .map_err(|e| anyhow!("invalid {key} value '{value}': {e}"))
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(anyhow!("invalid {key} value '{value}', expected true or false")),
    }
}

/// Parse comma-separated `path` or `prefix=path` entries
fn parse_location_files(value: &str) -> Result<Vec<LocationFile>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<LocationFile>()
                .with_context(|| format!("invalid {} entry '{entry}'", env_config::LOCATION_FILES))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location_files_skips_blanks() {
        let files = parse_location_files("a.json, ,az=b.json").unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].prefix.as_deref(), Some("az"));
    }

    #[test]
    fn test_parse_bool_values() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }
}
