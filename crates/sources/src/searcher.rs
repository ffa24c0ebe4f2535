//! Flight searcher - provider call plus record building.
//!
//! ## Algorithm
//! 1. Ask the provider for raw rows
//! 2. Keep the first 10 and normalize them into `Flight`s
//! 3. Return them in provider order (ranking happens later)

use std::sync::Arc;
use std::time::Instant;

use flight_data::{Flight, FlightRecordBuilder, SearchParams};
use tracing::{info, instrument};

use crate::error::Result;
use crate::provider::FlightProvider;

/// Runs searches against a shared provider
#[derive(Clone)]
pub struct FlightSearcher {
    /// Shared provider (read-only, so no Mutex needed)
    provider: Arc<dyn FlightProvider>,

    builder: FlightRecordBuilder,
}

impl FlightSearcher {
    pub fn new(provider: Arc<dyn FlightProvider>) -> Self {
        Self {
            provider,
            builder: FlightRecordBuilder::new(),
        }
    }

    /// Replace the record builder (e.g. to pin the reference year in tests)
    pub fn with_builder(mut self, builder: FlightRecordBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Search and normalize. A malformed departure fails the whole search.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<Flight>> {
        let start = Instant::now();

        let raw_flights = self.provider.search(params).await?;
        let flights = self.builder.build(&raw_flights, params)?;

        info!(
            "Search {} -> {} on {}: {} raw rows, {} flights in {:.2?}",
            params.from_airport,
            params.to_airport,
            params.departure_date,
            raw_flights.len(),
            flights.len(),
            start.elapsed()
        );
        Ok(flights)
    }
}
