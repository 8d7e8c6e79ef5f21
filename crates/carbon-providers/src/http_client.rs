// ABOUTME: Shared HTTP client with connection pooling for provider API calls
// ABOUTME: Configurable timeouts and optional proxy, initialized once at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use reqwest::{Client, ClientBuilder, Proxy};
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::errors::{ProviderError, ProviderResult};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Name used for configuration errors raised here
const COMPONENT: &str = "http-client";

/// Outbound proxy settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy URL applied to every scheme
    pub url: String,
    /// Optional basic-auth username
    pub username: Option<String>,
    /// Optional basic-auth password
    pub password: Option<String>,
}

/// Transport settings for provider clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,
    /// Optional outbound proxy
    pub proxy: Option<ProxyConfig>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            proxy: None,
        }
    }
}

/// Configured values for the shared client
static CLIENT_CONFIG: OnceLock<HttpClientConfig> = OnceLock::new();

/// Global shared HTTP client
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Initialize the shared HTTP client configuration
///
/// Must be called once at startup before any provider creates HTTP clients.
/// If not called, defaults are used (30s timeout, 10s connect timeout, no proxy).
pub fn initialize_shared_client(config: HttpClientConfig) {
    let _ = CLIENT_CONFIG.set(config);
}

/// Build a client from `config`
///
/// # Errors
///
/// Returns `ProviderError::Configuration` when the proxy URL is invalid or the
/// TLS backend cannot be initialized.
pub fn build_client(config: &HttpClientConfig) -> ProviderResult<Client> {
    let mut builder = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs));

    if let Some(proxy_config) = &config.proxy {
        let mut proxy = Proxy::all(&proxy_config.url).map_err(|e| {
            ProviderError::configuration(COMPONENT, format!("invalid proxy url: {e}"))
        })?;
        if let Some(username) = &proxy_config.username {
            proxy = proxy.basic_auth(username, proxy_config.password.as_deref().unwrap_or(""));
        }
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ProviderError::configuration(COMPONENT, e.to_string()))
}

/// Get the shared HTTP client for provider API calls
///
/// Falls back to a default client if the configured one cannot be built.
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        let config = CLIENT_CONFIG.get().cloned().unwrap_or_default();
        build_client(&config).unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
    })
}

/// Parse a response body, treating a literal `null` as a missing payload
///
/// # Errors
///
/// Returns `ProviderError::NullPayload` for `null` and
/// `ProviderError::MalformedResponse` when the body does not match `T`.
pub fn parse_json_payload<T: DeserializeOwned>(
    provider: &'static str,
    body: &str,
    resource: &str,
) -> ProviderResult<T> {
    if body.trim() == "null" {
        return Err(ProviderError::NullPayload {
            provider,
            resource: resource.to_owned(),
        });
    }
    serde_json::from_str(body)
        .map_err(|e| ProviderError::malformed(provider, format!("{resource}: {e}")))
}

/// Parse an absolute base URL, adding the trailing slash `Url::join` needs
///
/// # Errors
///
/// Returns `ProviderError::Configuration` when `raw` is not an absolute URL.
pub fn parse_base_url(provider: &'static str, raw: &str, setting: &str) -> ProviderResult<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized).map_err(|e| {
        ProviderError::configuration(
            provider,
            format!("{setting} '{raw}' is not a valid absolute url: {e}"),
        )
    })?;
    if url.cannot_be_a_base() {
        return Err(ProviderError::configuration(
            provider,
            format!("{setting} '{raw}' cannot be used as a base url"),
        ));
    }
    Ok(url)
}
