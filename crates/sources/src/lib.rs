//! # Sources Crate
//!
//! Where candidate flights come from.
//!
//! ## Components
//!
//! ### FlightProvider
//! The external flight-search service. `HttpFlightProvider` calls it over
//! HTTP; tests plug in their own implementations.
//!
//! ### FlightSearcher
//! Calls a provider and normalizes the first 10 rows into `Flight`s.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{FlightSearcher, HttpFlightProvider};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(HttpFlightProvider::new("http://localhost:8090"));
//! let searcher = FlightSearcher::new(provider);
//!
//! let flights = searcher.search(&params).await?;
//! ```

// Public modules
pub mod error;
pub mod provider;
pub mod searcher;
pub mod booking;

// Re-export commonly used types
pub use error::{Result, SourceError};
pub use provider::{FlightProvider, HttpFlightProvider, DEFAULT_PROVIDER_TIMEOUT};
pub use searcher::FlightSearcher;
pub use booking::booking_url;
