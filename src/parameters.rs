// ABOUTME: Parameter contract validation gating every pipeline entry point
// ABOUTME: Required-field pass first, then cross-field relationship rules, collected into ValidationErrors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

//! # Parameter Validation
//!
//! Entry points describe their inputs with a typed query ([`EmissionsQuery`],
//! [`AverageQuery`], [`ForecastQuery`], [`ForecastAsOfQuery`]) and turn it into
//! [`CarbonAwareParameters`] with `to_parameters()`. A [`ParameterValidator`]
//! then checks the parameters in two passes:
//!
//! 1. every required property must be set; all misses are reported together
//! 2. only when the first pass is clean, relationship rules run
//!
//! Messages are keyed by display names, which default to the property names
//! and can be renamed with [`DisplayNames`] for presentation layers that use
//! different field names.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::limits::MAX_WINDOW_MINUTES;
use crate::errors::ValidationErrors;

/// Properties an entry point can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropertyName {
    /// One or more location names
    MultipleLocations,
    /// Exactly one location name
    SingleLocation,
    /// Start of the query range
    Start,
    /// End of the query range
    End,
    /// Window size used for resampling
    Duration,
    /// Instant a historical forecast is requested for
    Requested,
}

impl PropertyName {
    /// Every property, in reporting order
    pub const ALL: [Self; 6] = [
        Self::MultipleLocations,
        Self::SingleLocation,
        Self::Start,
        Self::End,
        Self::Duration,
        Self::Requested,
    ];

    /// Default display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MultipleLocations => "MultipleLocations",
            Self::SingleLocation => "SingleLocation",
            Self::Start => "Start",
            Self::End => "End",
            Self::Duration => "Duration",
            Self::Requested => "Requested",
        }
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-field rules evaluated after the required-field pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    /// When both are set, start must be strictly before end
    StartBeforeEnd,
    /// End may only be given together with start
    StartRequiredIfEnd,
}

/// Presentation names for properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayNames {
    overrides: HashMap<PropertyName, String>,
}

impl DisplayNames {
    /// Display names equal to the property names
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename `property`
    #[must_use]
    pub fn with(mut self, property: PropertyName, display_name: impl Into<String>) -> Self {
        self.overrides.insert(property, display_name.into());
        self
    }

    /// Display name for `property`
    #[must_use]
    pub fn get(&self, property: PropertyName) -> &str {
        self.overrides
            .get(&property)
            .map_or_else(|| property.as_str(), String::as_str)
    }
}

/// Untyped parameter record shared by all entry points
///
/// A property counts as set when it holds a value; empty location names are
/// dropped during construction and never count as set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarbonAwareParameters {
    /// Locations for multi-location queries
    pub multiple_locations: Vec<String>,
    /// Location for single-location queries
    pub single_location: Option<String>,
    /// Start of the range
    pub start: Option<DateTime<Utc>>,
    /// End of the range
    pub end: Option<DateTime<Utc>>,
    /// Resampling window
    pub duration: Option<Duration>,
    /// Historical forecast instant
    pub requested: Option<DateTime<Utc>>,
}

impl CarbonAwareParameters {
    /// Set the multi-location list, skipping empty names
    #[must_use]
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.multiple_locations = locations
            .into_iter()
            .map(Into::into)
            .filter(|location| !location.trim().is_empty())
            .collect();
        self
    }

    /// Set the single location, ignoring an empty name
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        self.single_location = Some(location).filter(|l| !l.trim().is_empty());
        self
    }

    /// Whether `property` holds a value
    #[must_use]
    pub fn is_set(&self, property: PropertyName) -> bool {
        match property {
            PropertyName::MultipleLocations => !self.multiple_locations.is_empty(),
            PropertyName::SingleLocation => self.single_location.is_some(),
            PropertyName::Start => self.start.is_some(),
            PropertyName::End => self.end.is_some(),
            PropertyName::Duration => self.duration.is_some(),
            PropertyName::Requested => self.requested.is_some(),
        }
    }
}

/// Declarative validator: required properties plus relationship rules
#[derive(Debug, Clone)]
pub struct ParameterValidator {
    required: Vec<PropertyName>,
    relationships: Vec<Relationship>,
    display_names: DisplayNames,
}

impl Default for ParameterValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterValidator {
    /// Validator with no required properties and the start-before-end rule
    #[must_use]
    pub fn new() -> Self {
        Self {
            required: Vec::new(),
            relationships: vec![Relationship::StartBeforeEnd],
            display_names: DisplayNames::default(),
        }
    }

    /// Mark properties as required
    #[must_use]
    pub fn require(mut self, properties: &[PropertyName]) -> Self {
        for property in properties {
            if !self.required.contains(property) {
                self.required.push(*property);
            }
        }
        self
    }

    /// Add relationship rules
    #[must_use]
    pub fn check(mut self, relationships: &[Relationship]) -> Self {
        for relationship in relationships {
            if !self.relationships.contains(relationship) {
                self.relationships.push(*relationship);
            }
        }
        self
    }

    /// Use `display_names` in error keys and messages
    #[must_use]
    pub fn with_display_names(mut self, display_names: DisplayNames) -> Self {
        self.display_names = display_names;
        self
    }

    /// Display names in use
    #[must_use]
    pub const fn display_names(&self) -> &DisplayNames {
        &self.display_names
    }

    /// Validate `parameters`
    ///
    /// # Errors
    ///
    /// Returns every missing required property, or, when none are missing,
    /// every violated relationship rule together with an out-of-range
    /// duration. A duration must lie within zero and one year.
    pub fn validate(
        &self,
        parameters: CarbonAwareParameters,
    ) -> Result<ValidatedParameters, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for property in PropertyName::ALL {
            if self.required.contains(&property) && !parameters.is_set(property) {
                let name = self.display_names.get(property);
                errors.add(name, format!("{name} is not set"));
            }
        }
        errors.into_result()?;

        let mut errors = ValidationErrors::new();
        for relationship in &self.relationships {
            self.check_relationship(*relationship, &parameters, &mut errors);
        }
        self.check_duration(&parameters, &mut errors);
        errors.into_result()?;

        Ok(ValidatedParameters { parameters })
    }

    fn check_duration(&self, parameters: &CarbonAwareParameters, errors: &mut ValidationErrors) {
        let Some(duration) = parameters.duration else {
            return;
        };
        let name = self.display_names.get(PropertyName::Duration);
        if duration < Duration::zero() {
            errors.add(name, format!("{name} must not be negative"));
        } else if duration.num_minutes() > MAX_WINDOW_MINUTES {
            errors.add(
                name,
                format!("{name} must not exceed {MAX_WINDOW_MINUTES} minutes"),
            );
        }
    }

    fn check_relationship(
        &self,
        relationship: Relationship,
        parameters: &CarbonAwareParameters,
        errors: &mut ValidationErrors,
    ) {
        let start_name = self.display_names.get(PropertyName::Start);
        let end_name = self.display_names.get(PropertyName::End);
        match relationship {
            Relationship::StartBeforeEnd => {
                if let (Some(start), Some(end)) = (parameters.start, parameters.end) {
                    if start >= end {
                        errors.add(start_name, format!("{start_name} must be before {end_name}"));
                    }
                }
            }
            Relationship::StartRequiredIfEnd => {
                if parameters.end.is_some() && parameters.start.is_none() {
                    errors.add(
                        start_name,
                        format!("{start_name} must be defined if {end_name} is defined"),
                    );
                }
            }
        }
    }
}

/// Parameters that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedParameters {
    parameters: CarbonAwareParameters,
}

impl ValidatedParameters {
    /// Multi-location list, empty when not required and not given
    #[must_use]
    pub fn locations(&self) -> &[String] {
        &self.parameters.multiple_locations
    }

    /// Single location, if given
    #[must_use]
    pub fn single_location(&self) -> Option<&str> {
        self.parameters.single_location.as_deref()
    }

    /// Start, if given
    #[must_use]
    pub const fn start(&self) -> Option<DateTime<Utc>> {
        self.parameters.start
    }

    /// End, if given
    #[must_use]
    pub const fn end(&self) -> Option<DateTime<Utc>> {
        self.parameters.end
    }

    /// Start, or `default` when unset
    #[must_use]
    pub fn start_or(&self, default: DateTime<Utc>) -> DateTime<Utc> {
        self.parameters.start.unwrap_or(default)
    }

    /// End, or `default` when unset
    #[must_use]
    pub fn end_or(&self, default: DateTime<Utc>) -> DateTime<Utc> {
        self.parameters.end.unwrap_or(default)
    }

    /// Window size; zero means keep the data's own granularity
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.parameters.duration.unwrap_or_else(Duration::zero)
    }

    /// Requested instant, if given
    #[must_use]
    pub const fn requested(&self) -> Option<DateTime<Utc>> {
        self.parameters.requested
    }
}

/// Raw emissions lookup over one or more locations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmissionsQuery {
    /// Location names
    pub locations: Vec<String>,
    /// Start of the range; defaults to now
    pub start: Option<DateTime<Utc>>,
    /// End of the range; defaults to start
    pub end: Option<DateTime<Utc>>,
}

impl EmissionsQuery {
    /// Query for `locations` with no range
    #[must_use]
    pub fn new<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locations: locations.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the range
    #[must_use]
    pub const fn between(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Untyped parameters for validation
    #[must_use]
    pub fn to_parameters(&self) -> CarbonAwareParameters {
        CarbonAwareParameters {
            start: self.start,
            end: self.end,
            ..CarbonAwareParameters::default()
        }
        .with_locations(self.locations.iter().cloned())
    }
}

/// Average intensity for one location over a closed period
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AverageQuery {
    /// Location name
    pub location: String,
    /// Start of the period
    pub start: Option<DateTime<Utc>>,
    /// End of the period
    pub end: Option<DateTime<Utc>>,
}

impl AverageQuery {
    /// Query for `location` over `[start, end]`
    #[must_use]
    pub fn new(location: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            location: location.into(),
            start: Some(start),
            end: Some(end),
        }
    }

    /// Untyped parameters for validation
    #[must_use]
    pub fn to_parameters(&self) -> CarbonAwareParameters {
        CarbonAwareParameters {
            start: self.start,
            end: self.end,
            ..CarbonAwareParameters::default()
        }
        .with_location(self.location.clone())
    }
}

/// Current forecast over one or more locations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastQuery {
    /// Location names
    pub locations: Vec<String>,
    /// Clip start; defaults to the first forecast point
    pub start: Option<DateTime<Utc>>,
    /// Clip end; defaults to the end of the last forecast point
    pub end: Option<DateTime<Utc>>,
    /// Workload duration used as the resampling window
    pub window_size: Option<Duration>,
}

impl ForecastQuery {
    /// Query for `locations` over the full forecast horizon
    #[must_use]
    pub fn new<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locations: locations.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the clip range
    #[must_use]
    pub const fn between(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set the resampling window
    #[must_use]
    pub const fn with_window_size(mut self, window_size: Duration) -> Self {
        self.window_size = Some(window_size);
        self
    }

    /// Untyped parameters for validation
    #[must_use]
    pub fn to_parameters(&self) -> CarbonAwareParameters {
        CarbonAwareParameters {
            start: self.start,
            end: self.end,
            duration: self.window_size,
            ..CarbonAwareParameters::default()
        }
        .with_locations(self.locations.iter().cloned())
    }
}

/// Forecast for one location as it was generated at a past instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastAsOfQuery {
    /// Location name
    pub location: String,
    /// Instant the forecast is requested for
    pub requested_at: Option<DateTime<Utc>>,
    /// Clip start
    pub start: Option<DateTime<Utc>>,
    /// Clip end
    pub end: Option<DateTime<Utc>>,
    /// Resampling window
    pub window_size: Option<Duration>,
}

impl ForecastAsOfQuery {
    /// Query for `location` as of `requested_at`
    #[must_use]
    pub fn new(location: impl Into<String>, requested_at: DateTime<Utc>) -> Self {
        Self {
            location: location.into(),
            requested_at: Some(requested_at),
            ..Self::default()
        }
    }

    /// Set the clip range
    #[must_use]
    pub const fn between(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set the resampling window
    #[must_use]
    pub const fn with_window_size(mut self, window_size: Duration) -> Self {
        self.window_size = Some(window_size);
        self
    }

    /// Untyped parameters for validation
    #[must_use]
    pub fn to_parameters(&self) -> CarbonAwareParameters {
        CarbonAwareParameters {
            start: self.start,
            end: self.end,
            duration: self.window_size,
            requested: self.requested_at,
            ..CarbonAwareParameters::default()
        }
        .with_location(self.location.clone())
    }
}
