// ABOUTME: Integration tests for the Electricity Maps provider against a local mock of the v3 API
// ABOUTME: Zone entitlements, history routing by clock, token header and forecast conversion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use carbon_aware::clock::{Clock, ManualClock};
use carbon_aware::errors::ProviderError;
use carbon_aware::locations::LocationSource;
use carbon_aware::providers::{
    CarbonIntensityProvider, ElectricityMapsConfig, ElectricityMapsProvider, LocationResolver,
    RegionCache,
};
use chrono::Duration;
use common::{spawn_server, t0, test_locations};
use serde_json::json;

const TOKEN_HEADER: &str = "auth-token";
const TOKEN: &str = "secret";

#[derive(Default)]
struct MockElectricityMaps {
    zones_fail: bool,
    zones: AtomicUsize,
    history: AtomicUsize,
    past_range: AtomicUsize,
    forecasts: AtomicUsize,
}

type Shared = State<Arc<MockElectricityMaps>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        == Some(TOKEN)
}

fn points(start_hours_ago: i64, ratings: &[f64]) -> serde_json::Value {
    let start = t0() - Duration::hours(start_hours_ago);
    ratings
        .iter()
        .zip(0_i64..)
        .map(|(rating, hour)| {
            json!({
                "carbonIntensity": rating,
                "datetime": (start + Duration::hours(hour)).to_rfc3339(),
                "isEstimated": false
            })
        })
        .collect()
}

async fn zones(State(mock): Shared, headers: HeaderMap) -> Response {
    mock.zones.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if mock.zones_fail {
        return (StatusCode::INTERNAL_SERVER_ERROR, "zones unavailable").into_response();
    }
    Json(json!({
        "DE": { "zoneName": "Germany", "access": ["carbon-intensity/history", "carbon-intensity/past-range"] },
        "DK-DK1": { "zoneName": "West Denmark", "access": ["*"] }
    }))
    .into_response()
}

async fn history(
    State(mock): Shared,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    mock.history.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let zone = params.get("zone").cloned().unwrap_or_else(|| "US-MIDA-PJM".to_owned());
    Json(json!({ "zone": zone, "history": points(3, &[300.0, 200.0, 100.0]) })).into_response()
}

async fn past_range(State(mock): Shared, headers: HeaderMap) -> Response {
    mock.past_range.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "zone": "DE", "data": points(48, &[410.0, 420.0, 430.0]) })).into_response()
}

async fn forecast(State(mock): Shared, headers: HeaderMap) -> Response {
    mock.forecasts.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "zone": "DK-DK1",
        "forecast": points(0, &[250.0, 150.0, 350.0]),
        "updatedAt": (t0() - Duration::minutes(30)).to_rfc3339()
    }))
    .into_response()
}

fn zone_locations() -> Arc<dyn LocationResolver> {
    let mut source = LocationSource::new();
    source
        .load_json(
            r#"{
                "de": { "name": "DE" },
                "dk": { "name": "DK-DK1" },
                "fr": { "name": "FR" },
                "eastus": { "latitude": 37.3719, "longitude": -79.8164 }
            }"#,
            None,
            "-",
        )
        .unwrap();
    Arc::new(source)
}

async fn start_provider(
    mock: MockElectricityMaps,
    locations: Arc<dyn LocationResolver>,
    config: ElectricityMapsConfig,
) -> (ElectricityMapsProvider, Arc<MockElectricityMaps>, Arc<ManualClock>) {
    common::init_test_logging();
    let mock = Arc::new(mock);
    let router = Router::new()
        .route("/v3/zones", get(zones))
        .route("/v3/carbon-intensity/history", get(history))
        .route("/v3/carbon-intensity/past-range", get(past_range))
        .route("/v3/carbon-intensity/forecast", get(forecast))
        .with_state(Arc::clone(&mock));
    let base = spawn_server(router).await;

    let clock = Arc::new(ManualClock::new(t0()));
    let shared_clock: Arc<dyn Clock> = Arc::<ManualClock>::clone(&clock);
    let provider = ElectricityMapsProvider::with_parts(
        config.with_base_url(format!("{base}v3/")),
        reqwest::Client::new(),
        RegionCache::new(Duration::hours(1)),
        locations,
        shared_clock,
    )
    .unwrap();
    (provider, mock, clock)
}

fn token_config() -> ElectricityMapsConfig {
    ElectricityMapsConfig::with_token(TOKEN_HEADER, TOKEN)
}

#[tokio::test]
async fn test_endpoint_not_granted_for_zone_is_rejected_locally() {
    let (provider, mock, _clock) =
        start_provider(MockElectricityMaps::default(), zone_locations(), token_config()).await;

    let error = provider.fetch_current_forecast("de").await.unwrap_err();

    assert!(matches!(error, ProviderError::Entitlement { .. }));
    assert_eq!(mock.forecasts.load(Ordering::SeqCst), 0);
    assert!(provider.entitlements_loaded());
}

#[tokio::test]
async fn test_zone_missing_from_entitlements_is_rejected() {
    let (provider, mock, _clock) =
        start_provider(MockElectricityMaps::default(), zone_locations(), token_config()).await;

    let error = provider
        .fetch_history("fr", t0() - Duration::hours(2), t0() - Duration::hours(1))
        .await
        .unwrap_err();

    assert!(error.to_string().contains("zone 'FR'"));
    assert_eq!(mock.history.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_wildcard_grant_and_single_population() {
    let (provider, mock, _clock) =
        start_provider(MockElectricityMaps::default(), zone_locations(), token_config()).await;

    let forecast = provider.fetch_current_forecast("dk").await.unwrap();
    provider.fetch_current_forecast("dk").await.unwrap();

    assert_eq!(mock.zones.load(Ordering::SeqCst), 1);
    assert_eq!(mock.forecasts.load(Ordering::SeqCst), 2);
    assert_eq!(forecast.location, "dk");
    assert_eq!(forecast.generated_at, t0() - Duration::minutes(30));
    assert_eq!(forecast.requested_at, Some(t0()));
    assert_eq!(forecast.forecast_data[0].duration, Duration::hours(1));
}

#[tokio::test]
async fn test_unavailable_zone_table_disables_checks() {
    let (provider, mock, _clock) = start_provider(
        MockElectricityMaps {
            zones_fail: true,
            ..MockElectricityMaps::default()
        },
        zone_locations(),
        token_config(),
    )
    .await;

    provider.fetch_current_forecast("de").await.unwrap();
    provider.fetch_current_forecast("fr").await.unwrap();

    assert_eq!(mock.zones.load(Ordering::SeqCst), 1);
    assert_eq!(mock.forecasts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_coordinates_skip_entitlements() {
    let (provider, mock, _clock) =
        start_provider(MockElectricityMaps::default(), test_locations(), token_config()).await;

    let history = provider
        .fetch_history("eastus", t0() - Duration::hours(2), t0() - Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(history.len(), 1);
    assert!((history[0].rating - 200.0).abs() < f64::EPSILON);
    assert!(!provider.entitlements_loaded());
    assert_eq!(mock.zones.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_history_routes_by_age_of_range() {
    let (provider, mock, clock) =
        start_provider(MockElectricityMaps::default(), zone_locations(), token_config()).await;

    provider
        .fetch_history("de", t0() - Duration::hours(3), t0() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(mock.history.load(Ordering::SeqCst), 1);
    assert_eq!(mock.past_range.load(Ordering::SeqCst), 0);

    let old = provider
        .fetch_history("de", t0() - Duration::hours(48), t0() - Duration::hours(46))
        .await
        .unwrap();
    assert_eq!(old.len(), 2);
    assert_eq!(mock.past_range.load(Ordering::SeqCst), 1);

    // The same range becomes past-range once the clock moves a day on
    clock.advance(Duration::hours(24));
    provider
        .fetch_history("de", t0() - Duration::hours(3), t0() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(mock.history.load(Ordering::SeqCst), 1);
    assert_eq!(mock.past_range.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_missing_token_surfaces_http_error() {
    let (provider, _mock, _clock) = start_provider(
        MockElectricityMaps::default(),
        test_locations(),
        ElectricityMapsConfig::default(),
    )
    .await;

    let error = provider.fetch_current_forecast("eastus").await.unwrap_err();

    assert_eq!(error.status(), Some(401));
}

#[tokio::test]
async fn test_region_resolution_uses_history_zone() {
    let (provider, mock, _clock) =
        start_provider(MockElectricityMaps::default(), test_locations(), token_config()).await;

    let zone = provider.resolve_region(37.3719, -79.8164).await.unwrap();
    let again = provider.resolve_region(37.3719, -79.8164).await.unwrap();

    assert_eq!(zone, "US-MIDA-PJM");
    assert_eq!(again, zone);
    assert_eq!(mock.history.load(Ordering::SeqCst), 1);
}
