// ABOUTME: Integration tests for environment configuration loading and validation
// ABOUTME: Source selection, per-source requirements, parsing failures and the redacted summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::Result;
use carbon_aware::config::{CarbonAwareConfig, DataSourceKind};
use carbon_aware::providers::EmissionFactorType;
use serial_test::serial;

fn load(vars: &[(&str, &str)]) -> Result<CarbonAwareConfig> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    CarbonAwareConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_data_source_parsing() {
    assert_eq!("WattTime".parse::<DataSourceKind>().unwrap(), DataSourceKind::WattTime);
    assert_eq!(
        "electricity-maps".parse::<DataSourceKind>().unwrap(),
        DataSourceKind::ElectricityMaps
    );
    assert_eq!(" json ".parse::<DataSourceKind>().unwrap(), DataSourceKind::Json);
    assert!("carbonara".parse::<DataSourceKind>().is_err());
    assert_eq!(DataSourceKind::ElectricityMaps.to_string(), "electricitymaps");
}

#[test]
fn test_json_source_is_the_default_and_needs_a_file() {
    let error = load(&[]).unwrap_err();
    assert!(error.to_string().contains("CARBON_JSON_DATA_FILE"));

    let config = load(&[("CARBON_JSON_DATA_FILE", "data/emissions.json")]).unwrap();
    assert_eq!(config.emissions_source, DataSourceKind::Json);
    assert_eq!(config.forecast_source, DataSourceKind::Json);
    assert_eq!(config.json_data_file, Some(PathBuf::from("data/emissions.json")));
    assert_eq!(config.selected_sources(), vec![DataSourceKind::Json]);
    assert_eq!(config.location_delimiter, "-");
}

#[test]
fn test_watttime_requires_both_credentials() {
    let error = load(&[
        ("CARBON_EMISSIONS_DATA_SOURCE", "watttime"),
        ("CARBON_FORECAST_DATA_SOURCE", "watttime"),
        ("WATTTIME_USERNAME", "user"),
    ])
    .unwrap_err();
    assert!(error.to_string().contains("WATTTIME_PASSWORD"));

    let config = load(&[
        ("CARBON_EMISSIONS_DATA_SOURCE", "watttime"),
        ("CARBON_FORECAST_DATA_SOURCE", "watttime"),
        ("WATTTIME_USERNAME", "user"),
        ("WATTTIME_PASSWORD", "secret"),
        ("WATTTIME_REGION_CACHE_TTL_SECS", "600"),
    ])
    .unwrap();
    let watttime = config.watttime.as_ref().unwrap();
    assert_eq!(watttime.username, "user");
    assert_eq!(watttime.region_cache_ttl_secs, 600);
    assert!(watttime.base_url.starts_with("https://"));
}

#[test]
fn test_electricity_maps_options_are_parsed() {
    let config = load(&[
        ("CARBON_EMISSIONS_DATA_SOURCE", "electricitymaps"),
        ("CARBON_FORECAST_DATA_SOURCE", "json"),
        ("CARBON_JSON_DATA_FILE", "forecast.json"),
        ("ELECTRICITYMAPS_API_TOKEN_HEADER", "auth-token"),
        ("ELECTRICITYMAPS_API_TOKEN", "secret"),
        ("ELECTRICITYMAPS_EMISSION_FACTOR_TYPE", "Direct"),
        ("ELECTRICITYMAPS_DISABLE_ESTIMATIONS", "yes"),
    ])
    .unwrap();

    assert_eq!(
        config.selected_sources(),
        vec![DataSourceKind::ElectricityMaps, DataSourceKind::Json]
    );
    assert_eq!(config.electricity_maps.token_header(), Some(("auth-token", "secret")));
    assert_eq!(
        config.electricity_maps.emission_factor_type,
        Some(EmissionFactorType::Direct)
    );
    assert_eq!(config.electricity_maps.disable_estimations, Some(true));
}

#[test]
fn test_invalid_values_are_rejected_at_load_time() {
    let half_token = load(&[
        ("CARBON_EMISSIONS_DATA_SOURCE", "electricitymaps"),
        ("CARBON_FORECAST_DATA_SOURCE", "electricitymaps"),
        ("ELECTRICITYMAPS_API_TOKEN", "secret"),
    ]);
    assert!(half_token.is_err());

    let bad_timeout = load(&[
        ("CARBON_JSON_DATA_FILE", "data.json"),
        ("HTTP_CLIENT_TIMEOUT_SECS", "soon"),
    ]);
    assert!(bad_timeout.unwrap_err().to_string().contains("HTTP_CLIENT_TIMEOUT_SECS"));

    let zero_timeout = load(&[
        ("CARBON_JSON_DATA_FILE", "data.json"),
        ("HTTP_CLIENT_CONNECT_TIMEOUT_SECS", "0"),
    ]);
    assert!(zero_timeout.is_err());

    let bad_source = load(&[("CARBON_EMISSIONS_DATA_SOURCE", "coal")]);
    assert!(bad_source.is_err());
}

#[test]
fn test_free_tier_is_forecast_only_and_needs_a_token() {
    assert_eq!(
        "electricity_maps_free".parse::<DataSourceKind>().unwrap(),
        DataSourceKind::ElectricityMapsFree
    );
    assert_eq!(DataSourceKind::ElectricityMapsFree.to_string(), "electricitymapsfree");

    let as_emissions = load(&[
        ("CARBON_EMISSIONS_DATA_SOURCE", "electricitymapsfree"),
        ("ELECTRICITYMAPSFREE_API_TOKEN", "secret"),
    ])
    .unwrap_err();
    assert!(as_emissions.to_string().contains("only serves forecasts"));

    let without_token = load(&[
        ("CARBON_FORECAST_DATA_SOURCE", "electricitymapsfree"),
        ("CARBON_JSON_DATA_FILE", "data.json"),
    ])
    .unwrap_err();
    assert!(without_token.to_string().contains("ELECTRICITYMAPSFREE_API_TOKEN"));

    let config = load(&[
        ("CARBON_FORECAST_DATA_SOURCE", "electricitymapsfree"),
        ("CARBON_JSON_DATA_FILE", "data.json"),
        ("ELECTRICITYMAPSFREE_API_TOKEN", "free-secret"),
        ("ELECTRICITYMAPSFREE_BASE_URL", "http://localhost:9000/v1/"),
    ])
    .unwrap();
    assert_eq!(config.electricity_maps_free.token(), Some("free-secret"));
    assert_eq!(config.electricity_maps_free.base_url, "http://localhost:9000/v1/");
    assert!(!config.summary().contains("free-secret"));
}

#[test]
fn test_emissions_cache_settings() {
    let disabled = load(&[("CARBON_JSON_DATA_FILE", "data.json")]).unwrap();
    assert!(!disabled.emissions_cache.enabled);

    let enabled = load(&[
        ("CARBON_JSON_DATA_FILE", "data.json"),
        ("CARBON_EMISSIONS_CACHE_ENABLED", "true"),
        ("CARBON_EMISSIONS_CACHE_EXPIRATION_MIN", "15"),
    ])
    .unwrap();
    assert!(enabled.emissions_cache.enabled);
    assert_eq!(enabled.emissions_cache.expiration_minutes, 15);
    assert!(enabled.summary().contains("Emissions Cache: Enabled (15 min)"));

    let zero = load(&[
        ("CARBON_JSON_DATA_FILE", "data.json"),
        ("CARBON_EMISSIONS_CACHE_ENABLED", "1"),
        ("CARBON_EMISSIONS_CACHE_EXPIRATION_MIN", "0"),
    ])
    .unwrap_err();
    assert!(zero.to_string().contains("CARBON_EMISSIONS_CACHE_EXPIRATION_MIN"));
}

#[test]
fn test_location_files_and_proxy() {
    let config = load(&[
        ("CARBON_JSON_DATA_FILE", "data.json"),
        ("CARBON_LOCATION_FILES", "azure=azure.json, aws.json"),
        ("CARBON_LOCATION_DELIMITER", "/"),
        ("CARBON_PROXY_URL", "http://proxy.internal:3128"),
        ("CARBON_PROXY_USERNAME", "proxy-user"),
    ])
    .unwrap();

    assert_eq!(config.location_files.len(), 2);
    assert_eq!(config.location_files[0].prefix.as_deref(), Some("azure"));
    assert_eq!(config.location_files[1].prefix, None);
    assert_eq!(config.location_delimiter, "/");

    let proxy = config.http.proxy.as_ref().unwrap();
    assert_eq!(proxy.url, "http://proxy.internal:3128");
    assert_eq!(proxy.username.as_deref(), Some("proxy-user"));
    assert_eq!(proxy.password, None);
}

#[test]
fn test_summary_leaves_out_secrets() {
    let config = load(&[
        ("CARBON_EMISSIONS_DATA_SOURCE", "watttime"),
        ("CARBON_FORECAST_DATA_SOURCE", "electricitymaps"),
        ("WATTTIME_USERNAME", "user"),
        ("WATTTIME_PASSWORD", "hunter2"),
        ("ELECTRICITYMAPS_API_TOKEN_HEADER", "auth-token"),
        ("ELECTRICITYMAPS_API_TOKEN", "em-secret"),
    ])
    .unwrap();

    let summary = config.summary();
    assert!(summary.contains("Emissions Source: watttime"));
    assert!(summary.contains("Forecast Source: electricitymaps"));
    assert!(!summary.contains("hunter2"));
    assert!(!summary.contains("em-secret"));
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    env::set_var("CARBON_EMISSIONS_DATA_SOURCE", "json");
    env::set_var("CARBON_FORECAST_DATA_SOURCE", "json");
    env::set_var("CARBON_JSON_DATA_FILE", "  env-data.json  ");
    env::set_var("WATTTIME_USERNAME", "");

    let config = CarbonAwareConfig::from_env();

    env::remove_var("CARBON_EMISSIONS_DATA_SOURCE");
    env::remove_var("CARBON_FORECAST_DATA_SOURCE");
    env::remove_var("CARBON_JSON_DATA_FILE");
    env::remove_var("WATTTIME_USERNAME");

    let config = config.unwrap();
    assert_eq!(config.json_data_file, Some(PathBuf::from("env-data.json")));
    assert!(config.watttime.is_none());
}
