//! Exchange rates - cache first, exchange API on a miss.
//!
//! ## Algorithm
//! 1. Look up the cache key (default `currency_rates`)
//! 2. On a hit, decode the cached `{code: "rate"}` object
//! 3. On a miss (or an undecodable entry), call the exchange API, require a
//!    `data` object holding every supported currency, and store it with the
//!    configured TTL
//!
//! Rates are relative to the API's base currency, so only ratios between
//! two of them are meaningful.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::cache::{CacheError, KeyValueCache};

/// Currencies the converter answers for
pub const SUPPORTED_CURRENCIES: [&str; 3] = ["BRL", "EUR", "USD"];

#[derive(Error, Debug)]
pub enum RatesError {
    #[error("Exchange rate request failed: {0}")]
    RequestFailed(String),

    #[error("Exchange rate API timed out after {0:?}")]
    Timeout(Duration),

    #[error("Exchange rate API returned an error: {0}")]
    ApiError(String),

    #[error("Invalid response from the exchange rate API: {0}")]
    InvalidResponse(String),

    #[error("No rate for currency {0}")]
    MissingRate(String),

    #[error("Amount {0} is too large to convert")]
    AmountOutOfRange(Decimal),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

pub type Result<T> = std::result::Result<T, RatesError>;

/// Currency code -> rate against the API's base currency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRates {
    rates: BTreeMap<String, Decimal>,
}

impl ExchangeRates {
    pub fn new(rates: BTreeMap<String, Decimal>) -> Self {
        Self { rates }
    }

    pub fn rate(&self, code: &str) -> Result<Decimal> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| RatesError::MissingRate(code.to_string()))
    }

    /// `amount * rate[to] / rate[from]`, rounded up to cents
    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal> {
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        if from_rate.is_zero() {
            return Err(RatesError::InvalidResponse(format!("zero rate for {}", from)));
        }
        convert_amount(amount, from_rate, to_rate).ok_or(RatesError::AmountOutOfRange(amount))
    }

    fn has_supported_currencies(&self) -> bool {
        SUPPORTED_CURRENCIES.iter().all(|code| self.rates.contains_key(*code))
    }
}

/// `None` when the result does not fit in a `Decimal` (or `from_rate` is zero)
pub fn convert_amount(amount: Decimal, from_rate: Decimal, to_rate: Decimal) -> Option<Decimal> {
    let converted = amount.checked_mul(to_rate.checked_div(from_rate)?)?;
    Some(converted.round_dp_with_strategy(2, RoundingStrategy::ToPositiveInfinity))
}

/// Anything that can produce a fresh set of rates
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<ExchangeRates>;
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    data: Option<BTreeMap<String, serde_json::Number>>,
}

/// Client for a freecurrencyapi-compatible `latest` endpoint
/// (`GET {url}?apikey=...` -> `{"data": {"BRL": 5.43, ...}}`)
#[derive(Clone)]
pub struct ExchangeRateClient {
    http_client: Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl ExchangeRateClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            url: url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<ExchangeRates> {
        let response = self
            .http_client
            .get(&self.url)
            .query(&[("apikey", self.api_key.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Exchange rate request failed: {}", e);
                if e.is_timeout() {
                    RatesError::Timeout(self.timeout)
                } else {
                    RatesError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_text, "Exchange rate API error");
            return Err(RatesError::ApiError(format!("{}: {}", status, error_text)));
        }

        let body: LatestRatesResponse = response
            .json()
            .await
            .map_err(|e| RatesError::InvalidResponse(e.to_string()))?;

        let data = body
            .data
            .ok_or_else(|| RatesError::InvalidResponse("response has no 'data' field".into()))?;

        let rates = data
            .into_iter()
            .filter_map(|(code, number)| match Decimal::from_str(&number.to_string()) {
                Ok(rate) => Some((code, rate)),
                Err(_) => Decimal::from_scientific(&number.to_string()).ok().map(|rate| (code, rate)),
            })
            .collect();

        Ok(ExchangeRates::new(rates))
    }
}

/// Cached access to exchange rates
#[derive(Clone)]
pub struct RateProvider {
    source: Arc<dyn RateSource>,
    cache: Arc<dyn KeyValueCache>,
    cache_key: String,
    ttl: Duration,
}

impl RateProvider {
    pub fn new(
        source: Arc<dyn RateSource>,
        cache: Arc<dyn KeyValueCache>,
        cache_key: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            cache_key: cache_key.into(),
            ttl,
        }
    }

    pub async fn rates(&self) -> Result<ExchangeRates> {
        if let Some(cached) = self.cache.get(&self.cache_key).await? {
            match serde_json::from_str::<ExchangeRates>(&cached) {
                Ok(rates) => {
                    debug!("Using cached exchange rates");
                    return Ok(rates);
                }
                Err(e) => warn!("Ignoring undecodable cached rates: {}", e),
            }
        }

        let rates = self.source.fetch().await?;
        if !rates.has_supported_currencies() {
            return Err(RatesError::InvalidResponse(format!(
                "rates must include {}",
                SUPPORTED_CURRENCIES.join(", ")
            )));
        }

        let payload = serde_json::to_string(&rates)
            .map_err(|e| RatesError::InvalidResponse(e.to_string()))?;
        self.cache.set_ex(&self.cache_key, payload, self.ttl).await?;

        info!("Fetched exchange rates, cached for {:?}", self.ttl);
        Ok(rates)
    }
}
