// ABOUTME: Carbon-intensity provider implementations for WattTime, Electricity Maps (paid and free tier) and static JSON
// ABOUTME: Core provider trait, credential lifecycle, caches, entitlements and shared HTTP client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

//! Carbon-intensity provider implementations and core abstractions.
//!
//! This crate provides the Remote Client Protocol ([`CarbonIntensityProvider`])
//! and the shared resilience pieces each provider is built from: a bearer
//! credential with retry-once-on-rejection, a TTL-bounded region cache and a
//! lazily populated entitlement set. [`CachedEmissionsProvider`] decorates any
//! provider with a per-location cache of its latest history.

// Re-export carbon-core modules so provider code can keep `use crate::errors::*` etc.
pub use carbon_core::clock;
pub use carbon_core::constants;
pub use carbon_core::errors;
pub use carbon_core::models;
pub use carbon_core::timeseries;

// Core provider infrastructure
/// Core provider traits and interfaces
pub mod core;
/// Bearer credential lifecycle with a single re-authentication retry
pub mod credentials;
/// Latest-emissions caching decorator
pub mod emissions_cache;
/// Lazily populated zone/endpoint entitlements
pub mod entitlements;
/// Shared HTTP client for provider API calls
pub mod http_client;
/// TTL-bounded geoposition to region cache
pub mod region_cache;

// Provider implementations (clients conditionally compiled, configuration always available)

/// Electricity Maps API provider
pub mod electricity_maps;
/// Electricity Maps free tier (CO2 Signal) provider
pub mod electricity_maps_free;
/// Static JSON file provider
#[cfg(feature = "provider-json")]
pub mod json_source;
/// WattTime API provider
pub mod watttime;

// Re-export key types for convenience

pub use core::{CarbonIntensityProvider, LocationResolver};
pub use credentials::{is_auth_rejection, BearerCredential};
pub use electricity_maps::{ElectricityMapsConfig, EmissionFactorType};
#[cfg(feature = "provider-electricity-maps")]
pub use electricity_maps::ElectricityMapsProvider;
pub use electricity_maps_free::ElectricityMapsFreeConfig;
#[cfg(feature = "provider-electricity-maps-free")]
pub use electricity_maps_free::ElectricityMapsFreeProvider;
pub use emissions_cache::{CachedEmissionsProvider, EmissionsCacheConfig};
pub use entitlements::{EntitlementSet, ZoneAccess};
pub use http_client::{
    build_client, initialize_shared_client, parse_base_url, parse_json_payload, shared_client,
    HttpClientConfig, ProxyConfig,
};
#[cfg(feature = "provider-json")]
pub use json_source::JsonDataProvider;
pub use region_cache::RegionCache;
pub use watttime::WattTimeConfig;
#[cfg(feature = "provider-watttime")]
pub use watttime::WattTimeProvider;
