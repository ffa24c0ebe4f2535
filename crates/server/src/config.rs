use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub exchange_rate_api_key: String,
    pub exchange_rate_api_url: String,
    pub cache_url: String,
    pub currency_cache_key: String,
    pub currency_cache_ttl: Duration,
    /// How long an unfinished trip-planning session can be resumed
    pub checkpoint_ttl: Duration,
    pub llm_base_url: String,
    pub llm_model: String,
    pub flight_provider_url: String,
    /// Applied to every outbound call
    pub http_timeout: Duration,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build a configuration from any variable lookup (used by tests)
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Ok(Self {
            exchange_rate_api_key: lookup("EXCHANGE_RATE_API_KEY")
                .context("EXCHANGE_RATE_API_KEY must be set")?,
            exchange_rate_api_url: or(
                "EXCHANGE_RATE_API_URL",
                "https://api.freecurrencyapi.com/v1/latest",
            ),
            cache_url: lookup("CACHE_URL").context("CACHE_URL must be set")?,
            currency_cache_key: or("CURRENCY_CACHE_KEY", "currency_rates"),
            currency_cache_ttl: Duration::from_secs(
                or("CURRENCY_CACHE_EXPIRE_SECONDS", "3600")
                    .parse()
                    .context("CURRENCY_CACHE_EXPIRE_SECONDS must be a number of seconds")?,
            ),
            checkpoint_ttl: Duration::from_secs(
                or("CHECKPOINT_TTL_SECONDS", "3600")
                    .parse()
                    .context("CHECKPOINT_TTL_SECONDS must be a number of seconds")?,
            ),
            llm_base_url: or("LLM_BASE_URL", "http://localhost:11434"),
            llm_model: or("LLM_MODEL", "qwen3:14b"),
            flight_provider_url: or("FLIGHT_PROVIDER_URL", "http://localhost:8090"),
            http_timeout: Duration::from_secs(
                or("HTTP_TIMEOUT_SECS", "30")
                    .parse()
                    .context("HTTP_TIMEOUT_SECS must be a number of seconds")?,
            ),
            port: or("PORT", "8000")
                .parse()
                .context("PORT must be a valid number")?,
        })
    }
}
