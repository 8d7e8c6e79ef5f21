// ABOUTME: Location source resolving caller-facing names to geopositions from JSON files
// ABOUTME: Keys are case-insensitive and optionally namespaced by a per-file prefix
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

//! Named location registry
//!
//! A location file is a JSON object mapping keys to
//! `{ "name": ..., "latitude": ..., "longitude": ... }`. A file registered with
//! a prefix exposes its keys as `{prefix}{delimiter}{key}`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use carbon_providers::LocationResolver;
use tracing::{debug, info, warn};

use crate::constants::locations::{DEFAULT_DELIMITER, SOURCE_NAME};
use crate::errors::{ProviderError, ProviderResult};
use crate::models::NamedGeoposition;

/// One location file and the prefix its keys are registered under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationFile {
    /// Optional namespace for the file's keys
    pub prefix: Option<String>,
    /// Path to the JSON file
    pub path: PathBuf,
}

impl FromStr for LocationFile {
    type Err = ProviderError;

    /// Parse `path` or `prefix=path`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (prefix, path) = match s.split_once('=') {
            Some((prefix, path)) => (Some(prefix.trim()).filter(|p| !p.is_empty()), path.trim()),
            None => (None, s),
        };
        if path.is_empty() {
            return Err(ProviderError::configuration(
                SOURCE_NAME,
                format!("location file entry '{s}' has no path"),
            ));
        }
        Ok(Self {
            prefix: prefix.map(str::to_owned),
            path: PathBuf::from(path),
        })
    }
}

impl fmt::Display for LocationFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}={}", self.path.display()),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

/// In-memory registry of named locations
#[derive(Debug, Clone, Default)]
pub struct LocationSource {
    entries: HashMap<String, NamedGeoposition>,
}

impl LocationSource {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every file in order, later files overriding earlier keys
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if a file cannot be read, is not
    /// a JSON object of locations, or holds an entry with neither a name nor
    /// coordinates.
    pub fn from_files(files: &[LocationFile], delimiter: &str) -> ProviderResult<Self> {
        let mut source = Self::new();
        for file in files {
            source.load_file(&file.path, file.prefix.as_deref(), delimiter)?;
        }
        info!(locations = source.len(), files = files.len(), "Location source loaded");
        Ok(source)
    }

    /// Load one file
    ///
    /// # Errors
    ///
    /// See [`LocationSource::from_files`].
    pub fn load_file(&mut self, path: &Path, prefix: Option<&str>, delimiter: &str) -> ProviderResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(SOURCE_NAME, format!("cannot read {}: {e}", path.display()))
        })?;
        self.load_json(&contents, prefix, delimiter)
            .map_err(|e| match e {
                ProviderError::Configuration { reason, .. } => ProviderError::configuration(
                    SOURCE_NAME,
                    format!("{}: {reason}", path.display()),
                ),
                other => other,
            })
    }

    /// Load locations from a JSON string
    ///
    /// # Errors
    ///
    /// See [`LocationSource::from_files`].
    pub fn load_json(&mut self, json: &str, prefix: Option<&str>, delimiter: &str) -> ProviderResult<()> {
        let parsed: HashMap<String, NamedGeoposition> = serde_json::from_str(json)
            .map_err(|e| ProviderError::configuration(SOURCE_NAME, format!("invalid location data: {e}")))?;

        if let Some((key, _)) = parsed.iter().find(|(_, position)| !position.is_valid()) {
            return Err(ProviderError::configuration(
                SOURCE_NAME,
                format!("location '{key}' needs a name or a latitude and longitude"),
            ));
        }

        let delimiter = if delimiter.is_empty() {
            DEFAULT_DELIMITER
        } else {
            delimiter
        };
        for (key, position) in parsed {
            let full_key = prefix.map_or_else(|| key.clone(), |prefix| format!("{prefix}{delimiter}{key}"));
            self.insert(&full_key, position);
        }
        Ok(())
    }

    /// Register `position` under `key`, replacing any previous entry
    pub fn insert(&mut self, key: &str, position: NamedGeoposition) {
        let normalized = key.to_lowercase();
        if self.entries.insert(normalized, position).is_some() {
            warn!(location = key, "Location key redefined, keeping the latest definition");
        } else {
            debug!(location = key, "Registered location");
        }
    }

    /// Number of registered keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LocationResolver for LocationSource {
    fn resolve(&self, name: &str) -> ProviderResult<NamedGeoposition> {
        self.entries
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| ProviderError::UnknownLocation {
                location: name.to_owned(),
            })
    }
}
