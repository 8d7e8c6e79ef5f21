// ABOUTME: Geoposition types produced by location sources and consumed by providers
// ABOUTME: Coordinates may arrive as numbers or numeric strings in location files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geoposition {
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
}

impl Geoposition {
    /// Create a geoposition
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Geoposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A named location with optional coordinates
///
/// Providers that key on coordinates use `latitude`/`longitude`; providers that
/// key on zone names fall back to `name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedGeoposition {
    /// Provider-facing name (zone key or region name)
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    /// Latitude in decimal degrees
    #[serde(default, alias = "Latitude", deserialize_with = "number_or_string")]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees
    #[serde(default, alias = "Longitude", deserialize_with = "number_or_string")]
    pub longitude: Option<f64>,
}

impl NamedGeoposition {
    /// Both coordinates, when present
    #[must_use]
    pub fn coordinates(&self) -> Option<Geoposition> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Geoposition::new(latitude, longitude)),
            _ => None,
        }
    }

    /// An entry needs a non-empty name or a full coordinate pair
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.name.as_deref().is_some_and(|name| !name.trim().is_empty())
            || self.coordinates().is_some()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(value)) => Ok(Some(value)),
        Some(NumberOrString::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
