//! Flight record builder.
//!
//! Maps raw provider rows through the normalizers into canonical `Flight`s.
//! The provider can return dozens of rows; only the first
//! [`MAX_FLIGHT_RESULTS`] are kept, in provider order, which bounds the
//! ranking work and the size of the ranking prompt downstream.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::Result;
use crate::parser::{
    parse_duration, parse_price_and_currency, parse_timestamp, parse_timestamp_in_year,
};
use crate::types::{Flight, RawFlight, SearchParams};

/// Maximum number of provider rows turned into flights per search
pub const MAX_FLIGHT_RESULTS: usize = 10;

/// Builds `Flight`s from raw provider rows.
///
/// ## Usage
/// ```ignore
/// let flights = FlightRecordBuilder::new().build(&raw_rows, &params)?;
/// ```
#[derive(Debug, Clone)]
pub struct FlightRecordBuilder {
    /// Maximum number of rows to translate
    limit: usize,

    /// Year assumed for year-less departures (None = current year)
    reference_year: Option<i32>,
}

impl FlightRecordBuilder {
    pub fn new() -> Self {
        Self {
            limit: MAX_FLIGHT_RESULTS,
            reference_year: None,
        }
    }

    /// Configure how many rows are kept (default: 10)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Pin the year used for departures that omit it (default: current year)
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    /// Translate the first `limit` rows, preserving their order.
    ///
    /// A single unparseable departure fails the whole batch; rows are never
    /// skipped silently.
    pub fn build(&self, raw_flights: &[RawFlight], params: &SearchParams) -> Result<Vec<Flight>> {
        if raw_flights.len() > self.limit {
            warn!(
                "Provider returned {} flights, keeping the first {}",
                raw_flights.len(),
                self.limit
            );
        }

        let flights: Vec<Flight> = raw_flights
            .par_iter()
            .take(self.limit)
            .map(|raw| self.build_one(raw, params))
            .collect::<Result<Vec<Flight>>>()?;

        debug!(
            "Built {} flights for {} -> {}",
            flights.len(),
            params.from_airport,
            params.to_airport
        );
        Ok(flights)
    }

    /// Translate a single provider row
    pub fn build_one(&self, raw: &RawFlight, params: &SearchParams) -> Result<Flight> {
        let (price, currency) = parse_price_and_currency(&raw.price);
        let departure_date = match self.reference_year {
            Some(year) => parse_timestamp_in_year(&raw.departure, year)?,
            None => parse_timestamp(&raw.departure)?,
        };

        Ok(Flight {
            from_airport: params.from_airport.clone(),
            to_airport: params.to_airport.clone(),
            departure_date,
            airline: raw.name.clone(),
            price,
            currency,
            stops: raw.stops,
            duration_in_minutes: parse_duration(&raw.duration),
        })
    }
}

impl Default for FlightRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build flights with the default settings
pub fn build_flights(raw_flights: &[RawFlight], params: &SearchParams) -> Result<Vec<Flight>> {
    FlightRecordBuilder::new().build(raw_flights, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlightDataError;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn params() -> SearchParams {
        SearchParams::new("GRU", "LIS", NaiveDate::from_ymd_opt(2024, 8, 1).unwrap())
    }

    fn raw(name: &str, price: &str, departure: &str, duration: &str, stops: u32) -> RawFlight {
        RawFlight {
            name: name.to_string(),
            price: price.to_string(),
            departure: departure.to_string(),
            arrival: None,
            duration: duration.to_string(),
            stops,
            is_best: false,
        }
    }

    #[test]
    fn test_build_maps_every_field() {
        let rows = vec![
            raw("LATAM", "R$500", "8:15 AM on Tue, Aug 1, 2024", "3 hr 20 min", 0),
            raw("TAP Air Portugal", "€320", "2:45 PM on Tue, Aug 1, 2024", "5 hr", 2),
        ];

        let flights = build_flights(&rows, &params()).unwrap();
        assert_eq!(flights.len(), 2);

        let first = &flights[0];
        assert_eq!(first.from_airport, "GRU");
        assert_eq!(first.to_airport, "LIS");
        assert_eq!(
            first.departure_date,
            NaiveDate::from_ymd_opt(2024, 8, 1).unwrap().and_hms_opt(8, 15, 0).unwrap()
        );
        assert_eq!(first.airline, "LATAM");
        assert_eq!(first.price, Decimal::from(500));
        assert_eq!(first.currency, "BRL");
        assert_eq!(first.stops, 0);
        assert_eq!(first.duration_in_minutes, 200);

        let second = &flights[1];
        assert_eq!(second.airline, "TAP Air Portugal");
        assert_eq!(second.price, Decimal::from(320));
        assert_eq!(second.currency, "EUR");
        assert_eq!(second.stops, 2);
        assert_eq!(second.duration_in_minutes, 300);
    }

    #[test]
    fn test_build_caps_at_ten_in_provider_order() {
        let rows: Vec<RawFlight> = (0..15)
            .map(|i| {
                raw(
                    &format!("Airline {}", i + 1),
                    &format!("${}", 100 + i * 10),
                    &format!("10:00 AM on Mon, Jul {}, 2024", i + 1),
                    &format!("{} hr", i + 1),
                    (i % 3) as u32,
                )
            })
            .collect();

        let flights = build_flights(&rows, &params()).unwrap();
        assert_eq!(flights.len(), 10);
        assert_eq!(flights[0].airline, "Airline 1");
        assert_eq!(flights[9].airline, "Airline 10");
        assert_eq!(flights[9].price, Decimal::from(190));
    }

    #[test]
    fn test_build_empty_input() {
        let flights = build_flights(&[], &params()).unwrap();
        assert!(flights.is_empty());
    }

    #[test]
    fn test_build_fails_on_bad_departure() {
        let rows = vec![
            raw("LATAM", "R$500", "8:15 AM on Tue, Aug 1, 2024", "3 hr", 0),
            raw("Broken", "R$400", "tomorrow morning", "2 hr", 0),
        ];

        let err = build_flights(&rows, &params()).unwrap_err();
        assert!(matches!(err, FlightDataError::ParseError { .. }));
    }

    #[test]
    fn test_bad_row_past_the_cap_is_never_parsed() {
        let mut rows: Vec<RawFlight> = (0..10)
            .map(|i| raw("Ok", "$100", "10:00 AM on Mon, Jul 1, 2024", &format!("{} hr", i), 0))
            .collect();
        rows.push(raw("Broken", "$1", "garbage", "1 hr", 0));

        let flights = build_flights(&rows, &params()).unwrap();
        assert_eq!(flights.len(), 10);
    }

    #[test]
    fn test_reference_year_applies_to_year_less_departures() {
        let rows = vec![raw("Azul", "R$218", "11:40 AM on Tue, Jul 1", "1 hr 15 min", 1)];

        let flights = FlightRecordBuilder::new()
            .with_reference_year(2025)
            .build(&rows, &params())
            .unwrap();

        assert_eq!(
            flights[0].departure_date,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap().and_hms_opt(11, 40, 0).unwrap()
        );
        assert_eq!(flights[0].duration_in_minutes, 75);
    }

    #[test]
    fn test_lenient_fields_default_to_zero() {
        let rows = vec![raw("Mystery Air", "", "6:00 AM on Fri, Nov 1, 2024", "", 0)];

        let flights = build_flights(&rows, &params()).unwrap();
        assert_eq!(flights[0].price, Decimal::ZERO);
        assert_eq!(flights[0].currency, "");
        assert_eq!(flights[0].duration_in_minutes, 0);
    }
}
