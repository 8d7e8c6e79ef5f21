// ABOUTME: Electricity Maps free tier (CO2 Signal) provider module for latest-intensity forecasts
// ABOUTME: Static token authentication with one retry on a rejected request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

/// Client configuration
pub mod config;
/// Wire payloads
pub mod models;
/// Provider implementation
#[cfg(feature = "provider-electricity-maps-free")]
pub mod provider;

pub use config::ElectricityMapsFreeConfig;
#[cfg(feature = "provider-electricity-maps-free")]
pub use provider::ElectricityMapsFreeProvider;
