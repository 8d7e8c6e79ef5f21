// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Quiet logging, series builders, location fixtures and local mock HTTP servers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `carbon_aware`

use std::sync::{Arc, Once};

use carbon_aware::locations::LocationSource;
use carbon_aware::models::EmissionsData;
use carbon_aware::providers::LocationResolver;
use chrono::{DateTime, Duration, TimeZone, Utc};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Fixed reference instant used across tests
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Continuous series of `step`-minute samples starting at `start`
pub fn series(location: &str, start: DateTime<Utc>, step: i64, ratings: &[f64]) -> Vec<EmissionsData> {
    ratings
        .iter()
        .zip(0_i32..)
        .map(|(rating, index)| {
            EmissionsData::new(
                location,
                start + Duration::minutes(step * i64::from(index)),
                Duration::minutes(step),
                *rating,
            )
        })
        .collect()
}

/// Location source with one coordinate location and one zone-only location
pub fn test_locations() -> Arc<dyn LocationResolver> {
    let mut source = LocationSource::new();
    source
        .load_json(
            r#"{
                "eastus": { "name": "eastus", "latitude": 37.3719, "longitude": -79.8164 },
                "westus": { "name": "westus", "latitude": "37.783", "longitude": "-122.417" },
                "de": { "name": "DE" }
            }"#,
            None,
            "-",
        )
        .unwrap();
    Arc::new(source)
}

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{address}/")
}
