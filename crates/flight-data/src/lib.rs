//! # Flight Data Crate
//!
//! Turns the flight provider's locale-formatted rows into typed records.
//!
//! ## Main Components
//!
//! - **types**: `Flight`, `RawFlight`, `SearchParams`, `FlightList`
//! - **parser**: duration, timestamp and price normalizers
//! - **builder**: maps raw rows to flights, capped at 10 per search
//! - **error**: error types for normalization
//!
//! ## Example Usage
//!
//! ```ignore
//! use flight_data::{FlightRecordBuilder, SearchParams};
//!
//! let params = SearchParams::new("CWB", "GRU", date);
//! let flights = FlightRecordBuilder::new().build(&raw_rows, &params)?;
//!
//! for flight in &flights {
//!     println!("{} {} {}", flight.airline, flight.price, flight.currency);
//! }
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod builder;

// Re-export commonly used types for convenience
pub use error::{FlightDataError, Result};
pub use types::{
    // Type aliases
    AirportCode,
    CurrencyCode,
    // Core types
    Flight,
    FlightList,
    RawFlight,
    SearchParams,
};
pub use parser::{
    currency_code, parse_duration, parse_price_and_currency, parse_timestamp,
    parse_timestamp_in_year,
};
pub use builder::{build_flights, FlightRecordBuilder, MAX_FLIGHT_RESULTS};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn sample_flight() -> Flight {
        Flight {
            from_airport: "CWB".to_string(),
            to_airport: "GRU".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2024, 8, 1)
                .unwrap()
                .and_hms_opt(8, 15, 0)
                .unwrap(),
            airline: "Azul".to_string(),
            price: Decimal::new(21850, 2),
            currency: "BRL".to_string(),
            stops: 0,
            duration_in_minutes: 65,
        }
    }

    #[test]
    fn test_flight_json_shape() {
        let json = serde_json::to_value(sample_flight()).unwrap();

        // Price keeps its exact decimal form as a string
        assert_eq!(json["price"], "218.50");
        assert_eq!(json["departure_date"], "2024-08-01T08:15:00");
        assert_eq!(json["stops"], 0);
        assert_eq!(json["duration_in_minutes"], 65);
        assert_eq!(json["currency"], "BRL");
    }

    #[test]
    fn test_flight_accepts_numeric_price_and_default_currency() {
        let flight: Flight = serde_json::from_str(
            r#"{
                "from_airport": "CWB",
                "to_airport": "GRU",
                "departure_date": "2024-08-01T08:15:00",
                "airline": "Azul",
                "price": 218.5,
                "stops": 0,
                "duration_in_minutes": 65
            }"#,
        )
        .unwrap();

        assert_eq!(flight.price, Decimal::new(2185, 1));
        assert_eq!(flight.currency, "USD");
    }

    #[test]
    fn test_flight_rejects_negative_stops() {
        let result: std::result::Result<Flight, _> = serde_json::from_str(
            r#"{
                "from_airport": "CWB",
                "to_airport": "GRU",
                "departure_date": "2024-08-01T08:15:00",
                "airline": "Azul",
                "price": "10",
                "stops": -1,
                "duration_in_minutes": 65
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_ranking_key_orders_price_then_duration_then_stops() {
        let base = sample_flight();
        let slower = Flight { duration_in_minutes: 90, ..base.clone() };
        let cheaper = Flight { price: Decimal::from(100), duration_in_minutes: 500, ..base.clone() };

        assert!(cheaper.ranking_key() < base.ranking_key());
        assert!(base.ranking_key() < slower.ranking_key());
    }

    #[test]
    fn test_raw_flight_optional_fields() {
        let raw: RawFlight = serde_json::from_str(
            r#"{"name": "GOL", "price": "R$300", "departure": "8:00 AM on Thu, Aug 1", "duration": "1 hr", "stops": 0}"#,
        )
        .unwrap();

        assert_eq!(raw.arrival, None);
        assert!(!raw.is_best);
    }
}
