//! Flight provider - the external flight-search service.
//!
//! The provider is a black box returning raw, locale-formatted rows for a
//! one-way economy search with one adult. `HttpFlightProvider` talks to it
//! over HTTP:
//!
//! ```text
//! GET {base}/flights?from=CWB&to=GRU&date=2024-08-01&trip=one-way&seat=economy&adults=1
//! 200 {"flights": [{"name": "...", "price": "R$218", ...}]}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use flight_data::{RawFlight, SearchParams};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::error::{Result, SourceError};

/// Default per-request timeout for provider calls
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Core trait for anything that can answer a flight search.
///
/// `Send + Sync` so a single provider can be shared by concurrent requests.
#[async_trait]
pub trait FlightProvider: Send + Sync {
    /// Returns the name of this provider (for logging/debugging)
    fn name(&self) -> &str;

    /// Run one search and return the provider's rows in its own order
    async fn search(&self, params: &SearchParams) -> Result<Vec<RawFlight>>;
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    flights: Option<Vec<RawFlight>>,
}

/// HTTP client for the flight-search provider
#[derive(Clone)]
pub struct HttpFlightProvider {
    http_client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpFlightProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Configure the per-request timeout (default: 30s)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl FlightProvider for HttpFlightProvider {
    fn name(&self) -> &str {
        "HttpFlightProvider"
    }

    #[instrument(skip(self), fields(from = %params.from_airport, to = %params.to_airport))]
    async fn search(&self, params: &SearchParams) -> Result<Vec<RawFlight>> {
        let date = params.departure_date.format("%Y-%m-%d").to_string();

        let response = self
            .http_client
            .get(format!("{}/flights", self.base_url))
            .query(&[
                ("from", params.from_airport.as_str()),
                ("to", params.to_airport.as_str()),
                ("date", date.as_str()),
                ("trip", "one-way"),
                ("seat", "economy"),
                ("adults", "1"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Flight provider request failed: {}", e);
                if e.is_timeout() {
                    SourceError::Timeout(self.timeout)
                } else {
                    SourceError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_text, "Flight provider error");
            return Err(SourceError::ProviderError(format!("{}: {}", status, error_text)));
        }

        let body: ProviderResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout)
            } else {
                SourceError::InvalidResponse(e.to_string())
            }
        })?;

        let flights = body
            .flights
            .ok_or_else(|| SourceError::InvalidResponse("response has no 'flights' field".into()))?;

        debug!("Provider returned {} raw flights", flights.len());
        Ok(flights)
    }
}
