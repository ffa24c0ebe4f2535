//! Error types for the search-and-rank pipeline.

use flight_data::FlightDataError;
use llm_client::LlmClientError;
use sources::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// A provider row could not be normalized (strict timestamp parsing)
    #[error(transparent)]
    Parse(#[from] FlightDataError),

    #[error("No flights found to rank")]
    EmptyInput,

    /// An external collaborator failed or answered with an unexpected shape
    #[error("{service} call failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("{service} call timed out")]
    Timeout { service: &'static str },

    #[error("Checkpoint store failed: {0}")]
    Checkpoint(String),

    #[error("Failed to serialize pipeline data: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        PipelineError::Upstream {
            service,
            message: message.into(),
        }
    }
}

impl From<SourceError> for PipelineError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Data(e) => PipelineError::Parse(e),
            SourceError::Timeout(_) => PipelineError::Timeout {
                service: "flight provider",
            },
            other => PipelineError::upstream("flight provider", other.to_string()),
        }
    }
}

impl From<LlmClientError> for PipelineError {
    fn from(err: LlmClientError) -> Self {
        if err.is_timeout() {
            PipelineError::Timeout { service: "llm" }
        } else {
            PipelineError::upstream("llm", err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
