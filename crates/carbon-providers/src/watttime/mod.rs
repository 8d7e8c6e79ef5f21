// ABOUTME: WattTime v3 provider module for marginal-emissions data
// ABOUTME: Basic-auth login, bearer data calls, region lookup through the region cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

/// Client configuration
pub mod config;
/// Wire payloads
pub mod models;
/// Provider implementation
#[cfg(feature = "provider-watttime")]
pub mod provider;

pub use config::WattTimeConfig;
#[cfg(feature = "provider-watttime")]
pub use provider::WattTimeProvider;
