//! HTTP server for the travel assistant.
//!
//! This crate wires the pipeline and the single-shot assistants behind an
//! axum router:
//! - `POST /trip/planning` streams the traveller graph as NDJSON
//! - `POST /questions` routes free text to translation, currency
//!   conversion or flight search
//! - `GET /healthz` reports liveness

pub mod config;
pub mod error;
pub mod cache;
pub mod rates;
pub mod routing;
pub mod chains;
pub mod assistant;
pub mod app;

pub use config::Config;
pub use error::AppError;
pub use routing::{Intent, IntentClassifier, LlmIntentClassifier};
pub use assistant::{Answer, FlightOffer, TravelAssistant};
pub use app::{build_router, serve, AppState};

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info,server=debug,pipeline=debug,sources=debug";

/// Install the global tracing subscriber (stdout, `RUST_LOG` aware)
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
