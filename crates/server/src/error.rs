//! HTTP-facing error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use llm_client::LlmClientError;
use pipeline::PipelineError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::rates::RatesError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Llm(#[from] LlmClientError),

    #[error(transparent)]
    Rates(#[from] RatesError),

    #[error("Unsupported request: {0}")]
    Unroutable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Pipeline(err) => match err {
                PipelineError::EmptyInput => StatusCode::NOT_FOUND,
                PipelineError::Parse(_) | PipelineError::Upstream { .. } => StatusCode::BAD_GATEWAY,
                PipelineError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                PipelineError::Checkpoint(_) | PipelineError::Serialization(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Llm(err) if err.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Rates(RatesError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Rates(RatesError::Cache(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Rates(RatesError::AmountOutOfRange(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Rates(_) => StatusCode::BAD_GATEWAY,
            AppError::Unroutable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Stable machine-readable name, used in error bodies and stream lines
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Pipeline(PipelineError::EmptyInput) => "empty_input",
            AppError::Pipeline(PipelineError::Parse(_)) => "parse_error",
            AppError::Pipeline(PipelineError::Timeout { .. }) => "upstream_timeout",
            AppError::Pipeline(PipelineError::Upstream { .. }) => "upstream_error",
            AppError::Pipeline(_) => "internal_error",
            AppError::Llm(err) if err.is_timeout() => "upstream_timeout",
            AppError::Llm(_) => "upstream_error",
            AppError::Rates(RatesError::Timeout(_)) => "upstream_timeout",
            AppError::Rates(RatesError::Cache(_)) => "internal_error",
            AppError::Rates(RatesError::AmountOutOfRange(_)) => "invalid_amount",
            AppError::Rates(_) => "upstream_error",
            AppError::Unroutable(_) => "unroutable",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), "Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
