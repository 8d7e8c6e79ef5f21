// ABOUTME: Core types and time-series engine for the carbon-aware data pipeline
// ABOUTME: Foundation crate with emissions models, error taxonomy, clock and interval math
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

#![deny(unsafe_code)]

//! # Carbon Core
//!
//! Foundation crate for the carbon-aware pipeline. It holds everything that does
//! not perform I/O, so it can be shared by the provider clients and the
//! application layer without dragging the HTTP stack along.
//!
//! ## Modules
//!
//! - **models**: `EmissionsData` samples, `EmissionsForecast`, geopositions
//! - **errors**: `CarbonAwareError`, `ProviderError` and `ValidationErrors`
//! - **clock**: injectable source of "now"
//! - **timeseries**: boundary clipping, rolling windows, period averages, optimal points
//! - **constants**: provider defaults and unit conversion factors

/// Injectable time source
pub mod clock;

/// Application constants organized by domain
pub mod constants;

/// Unified error taxonomy for the pipeline
pub mod errors;

/// Emissions samples, forecasts and locations
pub mod models;

/// Pure transforms over emissions series
pub mod timeseries;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{CarbonAwareError, CarbonAwareResult, ProviderError, ProviderResult, ValidationErrors};
pub use models::{EmissionsData, EmissionsForecast, Geoposition, NamedGeoposition};
