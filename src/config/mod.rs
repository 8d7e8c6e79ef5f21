// ABOUTME: Configuration module for data source selection and provider settings
// ABOUTME: Environment-only configuration, validated at load time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

//! Configuration
//!
//! - **Environment**: data sources, provider credentials, location files and
//!   outbound HTTP settings read from environment variables

/// Environment configuration
pub mod environment;

pub use environment::{CarbonAwareConfig, DataSourceKind};
