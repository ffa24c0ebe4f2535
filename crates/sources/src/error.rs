//! Error types for flight sources.

use std::time::Duration;

use flight_data::FlightDataError;
use thiserror::Error;

/// Errors raised while fetching and normalizing provider results
#[derive(Error, Debug)]
pub enum SourceError {
    /// The request never produced a response (DNS, connection refused, ...)
    #[error("Flight provider request failed: {0}")]
    RequestFailed(String),

    #[error("Flight provider timed out after {0:?}")]
    Timeout(Duration),

    /// Non-2xx answer from the provider
    #[error("Flight provider returned an error: {0}")]
    ProviderError(String),

    /// The body was not JSON or lacked the expected fields
    #[error("Unexpected flight provider response: {0}")]
    InvalidResponse(String),

    /// A row could not be normalized (malformed departure)
    #[error(transparent)]
    Data(#[from] FlightDataError),
}

pub type Result<T> = std::result::Result<T, SourceError>;
