// ABOUTME: Structured multi-error value produced by parameter validation
// ABOUTME: Maps a parameter display name to every message collected for it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// All validation failures found in one pass, keyed by parameter display name
///
/// Keys are ordered so the rendered message is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Empty error set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message under `parameter`
    pub fn add(&mut self, parameter: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(parameter.into())
            .or_default()
            .push(message.into());
    }

    /// True when nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of parameters with at least one message
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Messages recorded for `parameter`
    #[must_use]
    pub fn messages(&self, parameter: &str) -> Option<&[String]> {
        self.errors.get(parameter).map(Vec::as_slice)
    }

    /// Iterate `(parameter, messages)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(key, messages)| (key.as_str(), messages.as_slice()))
    }

    /// `Err(self)` when any message was recorded, otherwise `Ok(())`
    ///
    /// # Errors
    ///
    /// Returns the collected errors if the set is not empty.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid parameters")?;
        let mut separator = ": ";
        for (parameter, messages) in &self.errors {
            write!(f, "{separator}{parameter} [{}]", messages.join(", "))?;
            separator = "; ";
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
