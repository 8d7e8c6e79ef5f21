// ABOUTME: Integration tests for the Electricity Maps free tier provider against a local mock of the CO2 Signal API
// ABOUTME: Token header, coordinate vs country-code queries, single retry on rejection and unsupported operations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use carbon_aware::clock::{Clock, ManualClock};
use carbon_aware::errors::ProviderError;
use carbon_aware::handlers::ForecastHandler;
use carbon_aware::parameters::ForecastQuery;
use carbon_aware::providers::{
    CarbonIntensityProvider, ElectricityMapsFreeConfig, ElectricityMapsFreeProvider, RegionCache,
};
use chrono::Duration;
use common::{spawn_server, t0, test_locations};
use serde_json::json;

const TOKEN: &str = "free-secret";

#[derive(Default)]
struct MockCo2Signal {
    /// Requests answered with 401 before serving data
    rejections: AtomicUsize,
    calls: AtomicUsize,
    queries: Mutex<Vec<HashMap<String, String>>>,
}

impl MockCo2Signal {
    fn rejecting(times: usize) -> Self {
        Self {
            rejections: AtomicUsize::new(times),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn latest(
    State(mock): State<Arc<MockCo2Signal>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    mock.calls.fetch_add(1, Ordering::SeqCst);
    mock.queries.lock().unwrap().push(params.clone());

    let authorized = headers.get("auth-token").and_then(|v| v.to_str().ok()) == Some(TOKEN);
    let rejected = mock
        .rejections
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        .is_ok();
    if !authorized || rejected {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }

    let country = params.get("countryCode").cloned().unwrap_or_else(|| "US-MIDA-PJM".to_owned());
    Json(json!({
        "_disclaimer": "This data is the exclusive property of Electricity Maps",
        "status": "ok",
        "countryCode": country,
        "data": {
            "datetime": (t0() - Duration::minutes(15)).to_rfc3339(),
            "carbonIntensity": 312.0,
            "fossilFuelPercentage": 55.2
        },
        "units": { "carbonIntensity": "gCO2eq/kWh" }
    }))
    .into_response()
}

async fn start_provider(
    mock: MockCo2Signal,
    token: &str,
) -> (ElectricityMapsFreeProvider, Arc<MockCo2Signal>) {
    common::init_test_logging();
    let mock = Arc::new(mock);
    let router = Router::new()
        .route("/v1/latest", get(latest))
        .with_state(Arc::clone(&mock));
    let base = spawn_server(router).await;

    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(t0()));
    let provider = ElectricityMapsFreeProvider::with_parts(
        ElectricityMapsFreeConfig::with_token(token).with_base_url(format!("{base}v1/")),
        reqwest::Client::new(),
        RegionCache::new(Duration::hours(1)),
        test_locations(),
        clock,
    )
    .unwrap();
    (provider, mock)
}

#[tokio::test]
async fn test_coordinates_are_sent_as_lat_lon() {
    let (provider, mock) = start_provider(MockCo2Signal::default(), TOKEN).await;

    let forecast = provider.fetch_current_forecast("eastus").await.unwrap();

    let queries = mock.queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].get("lat").map(String::as_str), Some("37.3719"));
    assert_eq!(queries[0].get("lon").map(String::as_str), Some("-79.8164"));
    assert!(!queries[0].contains_key("countryCode"));

    assert_eq!(forecast.location, "eastus");
    assert_eq!(forecast.requested_at, Some(t0()));
    assert_eq!(forecast.generated_at, t0() - Duration::minutes(15));
    assert_eq!(forecast.forecast_data.len(), 1);
    assert_eq!(forecast.forecast_data[0].duration, Duration::hours(2));
    assert!((forecast.forecast_data[0].rating - 312.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_named_zone_is_sent_as_country_code() {
    let (provider, mock) = start_provider(MockCo2Signal::default(), TOKEN).await;

    let forecast = provider.fetch_current_forecast("de").await.unwrap();

    let queries = mock.queries.lock().unwrap().clone();
    assert_eq!(queries[0].get("countryCode").map(String::as_str), Some("DE"));
    assert_eq!(forecast.forecast_data[0].location, "DE");
}

#[tokio::test]
async fn test_rejected_request_is_retried_once() {
    let (provider, mock) = start_provider(MockCo2Signal::rejecting(1), TOKEN).await;

    let forecast = provider.fetch_current_forecast("de").await.unwrap();

    assert_eq!(forecast.forecast_data.len(), 1);
    assert_eq!(mock.calls(), 2);
}

#[tokio::test]
async fn test_second_rejection_is_returned() {
    let (provider, mock) = start_provider(MockCo2Signal::default(), "wrong-token").await;

    let error = provider.fetch_current_forecast("de").await.unwrap_err();

    assert!(matches!(error, ProviderError::Http { status: 401, .. }));
    assert_eq!(mock.calls(), 2);
}

#[tokio::test]
async fn test_history_and_snapshots_are_unsupported() {
    let (provider, mock) = start_provider(MockCo2Signal::default(), TOKEN).await;

    let history = provider
        .fetch_history("de", t0() - Duration::hours(1), t0())
        .await
        .unwrap_err();
    assert!(matches!(history, ProviderError::Unsupported { .. }));

    let snapshot = provider.fetch_forecast_as_of("de", t0()).await.unwrap_err();
    assert!(matches!(snapshot, ProviderError::Unsupported { .. }));

    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_region_lookup_is_cached() {
    let (provider, mock) = start_provider(MockCo2Signal::default(), TOKEN).await;

    let first = provider.resolve_region(37.3719, -79.8164).await.unwrap();
    let second = provider.resolve_region(37.3719, -79.8164).await.unwrap();

    assert_eq!(first, "US-MIDA-PJM");
    assert_eq!(first, second);
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_forecast_handler_over_free_tier() {
    let (provider, _mock) = start_provider(MockCo2Signal::default(), TOKEN).await;
    let handler = ForecastHandler::new(Arc::new(provider));

    let forecasts = handler
        .get_current_forecast(&ForecastQuery::new(["de", "eastus"]))
        .await
        .unwrap();

    assert_eq!(forecasts.len(), 2);
    assert_eq!(forecasts[0].location, "de");
    assert_eq!(forecasts[0].optimal_data_points.len(), 1);
    assert_eq!(
        forecasts[1].data_end_at,
        Some(t0() - Duration::minutes(15) + Duration::hours(2))
    );
}
