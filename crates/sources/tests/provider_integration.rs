//! Integration tests for the HTTP flight provider.
//!
//! A mock provider is served on a random local port so the real client code
//! path (query string, timeout, body decoding) is exercised end to end.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use flight_data::{FlightRecordBuilder, SearchParams};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sources::{FlightProvider, FlightSearcher, HttpFlightProvider, SourceError};
use tokio::net::TcpListener;

async fn start_mock_provider(app: Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock provider");
    let addr = listener.local_addr().expect("Failed to get local address");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock provider failed");
    });

    (format!("http://{}", addr), handle)
}

/// Returns two flights for CWB -> GRU and nothing for other routes
async fn flights_handler(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    if query.get("from").map(String::as_str) != Some("CWB")
        || query.get("to").map(String::as_str) != Some("GRU")
        || query.get("date").map(String::as_str) != Some("2024-08-01")
    {
        return Json(json!({ "flights": [] }));
    }

    Json(json!({
        "flights": [
            {
                "name": "Azul",
                "price": "R$218",
                "departure": "6:00 AM on Thu, Aug 1",
                "arrival": "7:05 AM on Thu, Aug 1",
                "duration": "1 hr 5 min",
                "stops": 0,
                "is_best": true
            },
            {
                "name": "LATAM",
                "price": "R$189,50",
                "departure": "10:40 PM on Thu, Aug 1",
                "duration": "1 hr 10 min",
                "stops": 0
            }
        ]
    }))
}

fn params() -> SearchParams {
    SearchParams::new("CWB", "GRU", NaiveDate::from_ymd_opt(2024, 8, 1).unwrap())
}

#[tokio::test]
async fn test_http_provider_returns_raw_rows() {
    let (addr, handle) = start_mock_provider(Router::new().route("/flights", get(flights_handler))).await;

    let provider = HttpFlightProvider::new(addr);
    let rows = provider.search(&params()).await.expect("search failed");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Azul");
    assert_eq!(rows[0].arrival.as_deref(), Some("7:05 AM on Thu, Aug 1"));
    assert!(rows[0].is_best);
    assert_eq!(rows[1].arrival, None);

    handle.abort();
}

#[tokio::test]
async fn test_searcher_over_http_builds_flights() {
    let (addr, handle) = start_mock_provider(Router::new().route("/flights", get(flights_handler))).await;

    let searcher = FlightSearcher::new(Arc::new(HttpFlightProvider::new(addr)))
        .with_builder(FlightRecordBuilder::new().with_reference_year(2024));
    let flights = searcher.search(&params()).await.expect("search failed");

    assert_eq!(flights.len(), 2);
    assert_eq!(flights[1].airline, "LATAM");
    assert_eq!(flights[1].price, Decimal::new(18950, 2));
    assert_eq!(
        flights[1].departure_date,
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap().and_hms_opt(22, 40, 0).unwrap()
    );

    handle.abort();
}

#[tokio::test]
async fn test_body_without_flights_field_is_invalid() {
    let app = Router::new().route("/flights", get(|| async { Json(json!({ "results": [] })) }));
    let (addr, handle) = start_mock_provider(app).await;

    let err = HttpFlightProvider::new(addr).search(&params()).await.unwrap_err();
    assert!(matches!(err, SourceError::InvalidResponse(_)));

    handle.abort();
}

#[tokio::test]
async fn test_error_status_is_provider_error() {
    let app = Router::new().route(
        "/flights",
        get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let (addr, handle) = start_mock_provider(app).await;

    let err = HttpFlightProvider::new(addr).search(&params()).await.unwrap_err();
    assert!(matches!(err, SourceError::ProviderError(ref msg) if msg.contains("upstream down")));

    handle.abort();
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let app = Router::new().route(
        "/flights",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "flights": [] }))
        }),
    );
    let (addr, handle) = start_mock_provider(app).await;

    let provider = HttpFlightProvider::new(addr).with_timeout(Duration::from_millis(100));
    let err = provider.search(&params()).await.unwrap_err();
    assert!(matches!(err, SourceError::Timeout(_)));

    handle.abort();
}
