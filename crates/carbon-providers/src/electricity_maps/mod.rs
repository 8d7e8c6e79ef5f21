// ABOUTME: Electricity Maps v3 provider module for average carbon-intensity data
// ABOUTME: Token-header authentication with lazily loaded zone entitlements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

/// Client configuration
pub mod config;
/// Wire payloads
pub mod models;
/// Provider implementation
#[cfg(feature = "provider-electricity-maps")]
pub mod provider;

pub use config::{ElectricityMapsConfig, EmissionFactorType};
#[cfg(feature = "provider-electricity-maps")]
pub use provider::ElectricityMapsProvider;
