// ABOUTME: Core data models for carbon-intensity samples, forecasts and locations
// ABOUTME: Re-exports emissions and location types used across the workspace
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

/// Emissions samples and forecasts
pub mod emissions;
/// Geopositions and named locations
pub mod location;

pub use emissions::{duration_minutes, EmissionsData, EmissionsForecast};
pub use location::{Geoposition, NamedGeoposition};
