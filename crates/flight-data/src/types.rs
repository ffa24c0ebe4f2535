//! Core domain types shared by every crate in the workspace.
//!
//! `RawFlight` is what the provider hands us (all text), `Flight` is what the
//! rest of the system works with (all typed).

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// IATA airport code, e.g. "GRU"
pub type AirportCode = String;

/// ISO-like currency code ("BRL", "EUR"), or the raw symbol when unmapped
pub type CurrencyCode = String;

// =============================================================================
// Canonical Flight
// =============================================================================

/// A normalized flight offer.
///
/// Built once by the record builder and only read afterwards. `price` is an
/// exact decimal and serializes as a string; `departure_date` serializes as
/// ISO-8601.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Flight {
    pub from_airport: AirportCode,
    pub to_airport: AirportCode,
    pub departure_date: NaiveDateTime,
    pub airline: String,
    pub price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: CurrencyCode,
    pub stops: u32,
    pub duration_in_minutes: u32,
}

fn default_currency() -> CurrencyCode {
    "USD".to_string()
}

impl Flight {
    /// Composite ranking key: cheaper first, then shorter, then fewer stops
    pub fn ranking_key(&self) -> (Decimal, u32, u32) {
        (self.price, self.duration_in_minutes, self.stops)
    }
}

/// Wrapper used wherever a list of flights crosses a JSON boundary
/// (structured LLM output, checkpoint payloads).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FlightList {
    #[serde(default)]
    pub flights: Vec<Flight>,
}

// =============================================================================
// Provider-side Types
// =============================================================================

/// One unparsed result row from the flight-search provider.
///
/// Text fields keep the provider's locale formatting, for example
/// `price = "R$218"`, `departure = "8:15 AM on Tue, Aug 1"`,
/// `duration = "3 hr 20 min"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFlight {
    pub name: String,
    pub price: String,
    pub departure: String,
    #[serde(default)]
    pub arrival: Option<String>,
    pub duration: String,
    pub stops: u32,
    #[serde(default)]
    pub is_best: bool,
}

/// Arguments of a single one-way provider search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub from_airport: AirportCode,
    pub to_airport: AirportCode,
    pub departure_date: NaiveDate,
}

impl SearchParams {
    pub fn new(
        from_airport: impl Into<AirportCode>,
        to_airport: impl Into<AirportCode>,
        departure_date: NaiveDate,
    ) -> Self {
        Self {
            from_airport: from_airport.into(),
            to_airport: to_airport.into(),
            departure_date,
        }
    }
}
