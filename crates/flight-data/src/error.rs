//! Error types for the flight-data crate.
//!
//! Only timestamps fail loudly. Durations and prices fall back to zero
//! when their tokens are missing, so they have no error variant here.

use thiserror::Error;

/// Errors raised while turning provider text into typed flight records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlightDataError {
    /// A departure timestamp matched neither accepted format
    #[error("Could not parse timestamp '{input}': {reason}")]
    ParseError { input: String, reason: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, FlightDataError>;
