// ABOUTME: Lazily populated zone and endpoint entitlements for zone-scoped providers
// ABOUTME: Population happens at most once per client; a failed population disables checking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::constants::electricity_maps::WILDCARD_ACCESS;
use crate::errors::{ProviderError, ProviderResult};

/// Endpoints a credential may call for one zone
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ZoneAccess {
    /// Display name of the zone
    #[serde(rename = "zoneName", default)]
    pub zone_name: String,
    /// Endpoint paths, or `*` for every endpoint
    #[serde(default)]
    pub access: Vec<String>,
}

impl ZoneAccess {
    /// Whether `path` is granted explicitly or through the wildcard
    #[must_use]
    pub fn allows(&self, path: &str) -> bool {
        self.access
            .iter()
            .any(|granted| granted == path || granted == WILDCARD_ACCESS)
    }
}

/// Zone table fetched on first use
///
/// If the first population attempt fails the table is recorded as unavailable
/// and every later check passes without asking the provider again.
#[derive(Debug)]
pub struct EntitlementSet {
    provider: &'static str,
    zones: OnceCell<Option<HashMap<String, ZoneAccess>>>,
}

impl EntitlementSet {
    /// Empty set for `provider`
    #[must_use]
    pub const fn new(provider: &'static str) -> Self {
        Self {
            provider,
            zones: OnceCell::const_new(),
        }
    }

    /// Whether population has been attempted
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.zones.initialized()
    }

    /// Check `zone` may call `path`, populating the table with `populate` first if needed
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Entitlement` when the zone is missing from the
    /// table or none of its grants cover `path`.
    pub async fn check<F, Fut>(&self, zone: &str, path: &str, populate: F) -> ProviderResult<()>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = ProviderResult<HashMap<String, ZoneAccess>>> + Send,
    {
        let zones = self
            .zones
            .get_or_init(|| async {
                match populate().await {
                    Ok(zones) => {
                        debug!(provider = self.provider, zones = zones.len(), "Loaded zone entitlements");
                        Some(zones)
                    }
                    Err(e) => {
                        warn!(
                            provider = self.provider,
                            error = %e,
                            "Zone entitlements unavailable, skipping entitlement checks"
                        );
                        None
                    }
                }
            })
            .await;

        let Some(zones) = zones else {
            return Ok(());
        };

        let Some(access) = zones.get(zone) else {
            return Err(ProviderError::Entitlement {
                provider: self.provider,
                message: format!("zone '{zone}' is not available for this token"),
            });
        };

        if access.allows(path) {
            Ok(())
        } else {
            Err(ProviderError::Entitlement {
                provider: self.provider,
                message: format!("endpoint '{path}' is not available for zone '{zone}'"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_exact_path_and_wildcard() {
        let scoped = ZoneAccess {
            zone_name: "Denmark".into(),
            access: vec!["carbon-intensity/history".into()],
        };
        assert!(scoped.allows("carbon-intensity/history"));
        assert!(!scoped.allows("carbon-intensity/forecast"));

        let wildcard = ZoneAccess {
            zone_name: "Denmark".into(),
            access: vec!["*".into()],
        };
        assert!(wildcard.allows("carbon-intensity/forecast"));
    }
}
