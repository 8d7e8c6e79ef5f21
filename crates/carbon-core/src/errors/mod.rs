// ABOUTME: Unified error taxonomy for the carbon-aware pipeline
// ABOUTME: Validation, provider, data-shape and configuration failures with source chaining
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

//! # Error Handling
//!
//! Lower layers never swallow errors. Provider failures travel as
//! [`ProviderError`], parameter problems as [`ValidationErrors`], and the
//! time-series engine reports data-shape violations directly on
//! [`CarbonAwareError`]. Multi-location calls wrap the failing location around
//! the original error with [`CarbonAwareError::ForLocation`].

/// Provider-layer errors
pub mod provider;
/// Multi-map of parameter validation failures
pub mod validation;

pub use provider::{ProviderError, ProviderResult};
pub use validation::ValidationErrors;

use chrono::{DateTime, Utc};

/// Top-level error for every pipeline entry point
#[derive(Debug, thiserror::Error)]
pub enum CarbonAwareError {
    /// Caller-fixable parameter problems, reported before any remote call
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Failure inside a provider client
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Adjacent samples neither abut nor are in a single chronological direction
    #[error(
        "Data is not continuous: [{previous_start}, {previous_end}) does not abut [{current_start}, {current_end})"
    )]
    DiscontinuousData {
        /// Start of the earlier sample in iteration order
        previous_start: DateTime<Utc>,
        /// End of the earlier sample in iteration order
        previous_end: DateTime<Utc>,
        /// Start of the offending sample
        current_start: DateTime<Utc>,
        /// End of the offending sample
        current_end: DateTime<Utc>,
    },

    /// Requested period is not covered by the series
    #[error(
        "Period [{start}, {end}] is outside the data range [{data_start}, {data_end}]"
    )]
    PeriodOutOfRange {
        /// Requested start
        start: DateTime<Utc>,
        /// Requested end
        end: DateTime<Utc>,
        /// First instant covered by the data
        data_start: DateTime<Utc>,
        /// Last instant covered by the data
        data_end: DateTime<Utc>,
    },

    /// Series cannot be windowed as given
    #[error("Invalid series: {reason}")]
    InvalidSeries {
        /// What is wrong with the series
        reason: String,
    },

    /// Context wrapper naming the location whose request failed
    #[error("Request for location '{location}' failed: {source}")]
    ForLocation {
        /// Location that triggered the failure
        location: String,
        /// Original error
        #[source]
        source: Box<CarbonAwareError>,
    },

    /// Application configuration is incomplete or invalid
    #[error("Configuration error: {reason}")]
    Configuration {
        /// Which setting is wrong
        reason: String,
    },
}

impl CarbonAwareError {
    /// Wrap `self` with the location that triggered it
    #[must_use]
    pub fn for_location(self, location: impl Into<String>) -> Self {
        Self::ForLocation {
            location: location.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping location wrappers
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::ForLocation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Provider error at the root of this error, if any
    #[must_use]
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self.root() {
            Self::Provider(error) => Some(error),
            _ => None,
        }
    }

    /// Validation errors at the root of this error, if any
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self.root() {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result alias for pipeline operations
pub type CarbonAwareResult<T> = Result<T, CarbonAwareError>;
