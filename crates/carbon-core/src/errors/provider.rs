// ABOUTME: Provider error types for remote carbon-intensity data sources
// ABOUTME: Covers authentication, HTTP, entitlement, transport and payload failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use std::error::Error;

/// Errors raised while talking to a carbon-intensity provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Login failed; the client stays without a credential
    #[error("{provider} authentication failed: {reason}")]
    Authentication {
        /// Provider name
        provider: &'static str,
        /// Why the login was rejected
        reason: String,
    },

    /// Non-success HTTP response after any built-in recovery
    #[error("{provider} request to {path} failed with status {status}: {message}")]
    Http {
        /// Provider name
        provider: &'static str,
        /// Endpoint path that failed
        path: String,
        /// HTTP status code
        status: u16,
        /// Human readable message, including the response body
        message: String,
    },

    /// Zone or endpoint not permitted for the current credential
    #[error("{provider} entitlement check failed: {message}")]
    Entitlement {
        /// Provider name
        provider: &'static str,
        /// Which zone or path was rejected
        message: String,
    },

    /// Network, DNS or TLS failure before a response was received
    #[error("{provider} transport error: {reason}")]
    Transport {
        /// Provider name
        provider: &'static str,
        /// Short description of the failure
        reason: String,
        /// Underlying transport error
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },

    /// Response could not be parsed or violates the expected shape
    #[error("{provider} returned a malformed response: {reason}")]
    MalformedResponse {
        /// Provider name
        provider: &'static str,
        /// What was wrong with the payload
        reason: String,
    },

    /// Response parsed as an explicit null where data was required
    #[error("{provider} returned no payload for {resource}")]
    NullPayload {
        /// Provider name
        provider: &'static str,
        /// Resource that was requested
        resource: String,
    },

    /// Operation not offered by this provider
    #[error("{provider} does not support {operation}")]
    Unsupported {
        /// Provider name
        provider: &'static str,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Location name not present in any location source
    #[error("Unknown location: '{location}'")]
    UnknownLocation {
        /// Requested name
        location: String,
    },

    /// Location is known but cannot be expressed the way the provider needs
    #[error("Cannot convert location '{location}': {reason}")]
    LocationConversion {
        /// Requested name
        location: String,
        /// Why the conversion failed
        reason: String,
    },

    /// Provider configuration is incomplete or invalid
    #[error("{provider} configuration error: {reason}")]
    Configuration {
        /// Provider name
        provider: &'static str,
        /// Which setting is wrong
        reason: String,
    },
}

impl ProviderError {
    /// Wrap a transport-level failure
    pub fn transport(
        provider: &'static str,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            provider,
            reason: source.to_string(),
            source: Box::new(source),
        }
    }

    /// Build a malformed-response error
    pub fn malformed(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider,
            reason: reason.into(),
        }
    }

    /// Build a configuration error
    pub fn configuration(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            provider,
            reason: reason.into(),
        }
    }

    /// HTTP status carried by this error, if any
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;
