//! Application setup and HTTP handlers.
//!
//! ```text
//! POST /trip/planning  {trip_details, session_id?}  -> NDJSON, one line per state
//! POST /questions      {input}                      -> {response, flights?}
//! GET  /healthz                                     -> {status, timestamp}
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use llm_client::{LanguageModel, OllamaClient};
use pipeline::{
    FlightSearchAgent, GraphState, GraphUpdate, LlmRanker, MemoryCheckpointStore, RankingEngine,
    TravellerGraph,
};
use serde::{Deserialize, Serialize};
use sources::{FlightSearcher, HttpFlightProvider};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::assistant::{offers, Answer, FlightOffer, TravelAssistant};
use crate::cache;
use crate::chains::{CurrencyConverter, Translator};
use crate::config::Config;
use crate::error::AppError;
use crate::rates::{ExchangeRateClient, RateProvider};
use crate::routing::LlmIntentClassifier;

/// Upper bound for producing response headers (the first NDJSON line for
/// trip planning). Streamed bodies are not cut off.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

const NDJSON: &str = "application/x-ndjson";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub graph: TravellerGraph,
    pub assistant: Arc<TravelAssistant>,
}

impl AppState {
    pub fn new(graph: TravellerGraph, assistant: Arc<TravelAssistant>) -> Self {
        Self { graph, assistant }
    }

    /// Wire every production collaborator from the configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        let llm: Arc<dyn LanguageModel> = Arc::new(
            OllamaClient::new(&config.llm_base_url, &config.llm_model).with_timeout(config.http_timeout),
        );

        let provider = HttpFlightProvider::new(&config.flight_provider_url).with_timeout(config.http_timeout);
        let searcher = FlightSearcher::new(Arc::new(provider));

        let graph = TravellerGraph::new(
            Arc::new(FlightSearchAgent::new(llm.clone(), searcher)),
            RankingEngine::new().with_primary(Arc::new(LlmRanker::new(llm.clone()))),
        )
        .with_checkpoints(Arc::new(MemoryCheckpointStore::new().with_ttl(config.checkpoint_ttl)));

        let cache = cache::connect(&config.cache_url)
            .await
            .context("Failed to open the rate cache")?;
        let rate_source = ExchangeRateClient::new(&config.exchange_rate_api_url, &config.exchange_rate_api_key)
            .with_timeout(config.http_timeout);
        let rates = RateProvider::new(
            Arc::new(rate_source),
            cache,
            &config.currency_cache_key,
            config.currency_cache_ttl,
        );

        let assistant = TravelAssistant::new(
            Arc::new(LlmIntentClassifier::new(llm.clone())),
            Translator::new(llm.clone()),
            CurrencyConverter::new(llm, rates),
            graph.clone(),
        );

        Ok(Self::new(graph, Arc::new(assistant)))
    }
}

/// Build the Axum application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/trip/planning", post(trip_planning))
        .route("/questions", post(questions))
        .route("/healthz", get(healthz))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured port and serve until Ctrl-C
pub async fn serve(config: Config) -> Result<()> {
    let state = AppState::from_config(&config).await?;
    let router = build_router(state);

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to listen on port {}", config.port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server has been shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Starting graceful shutdown...");
}

// =============================================================================
// Trip planning
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct TripPlanningRequest {
    pub trip_details: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// One NDJSON line of the planning stream
#[derive(Debug, Clone, Serialize)]
pub struct PlanningLine {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flights: Option<Vec<FlightOffer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    pub session_id: String,
}

impl PlanningLine {
    fn from_update(update: &GraphUpdate, session_id: &str) -> Self {
        let (response, flights) = match &update.state {
            GraphState::Initial(_) => ("Planning your trip.".to_string(), None),
            GraphState::Searched(state) => (
                format!("Found {} flights for your trip.", state.flights.len()),
                Some(offers(&state.flights)),
            ),
            GraphState::Ranked(state) => (
                state.friendly_greeting.clone().unwrap_or_default(),
                Some(offers(&state.ranked_flights)),
            ),
        };

        Self {
            response,
            flights,
            error: None,
            session_id: session_id.to_string(),
        }
    }

    fn failure(err: &AppError, session_id: &str) -> Self {
        Self {
            response: err.to_string(),
            flights: None,
            error: Some(err.kind()),
            session_id: session_id.to_string(),
        }
    }

    fn to_ndjson(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Run the traveller graph and stream one line per completed state.
///
/// The first transition is awaited before responding, so an early failure
/// becomes a regular error response. Later failures end the stream with an
/// error line.
async fn trip_planning(
    State(state): State<AppState>,
    Json(request): Json<TripPlanningRequest>,
) -> Result<Response, AppError> {
    let session_id = request
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    info!(session_id = %session_id, "Trip planning requested");

    let mut updates = state.graph.stream(Some(session_id.clone()), request.trip_details);
    let first = updates.next().await.transpose()?;

    let head_session = session_id.clone();
    let head = stream::iter(first.map(|update| PlanningLine::from_update(&update, &head_session)));
    let tail = updates.map(move |update| match update {
        Ok(update) => PlanningLine::from_update(&update, &session_id),
        Err(e) => {
            let err = AppError::from(e);
            error!(kind = err.kind(), "Trip planning failed mid-stream: {}", err);
            PlanningLine::failure(&err, &session_id)
        }
    });

    let body = head.chain(tail).map(|line| line.to_ndjson());
    Ok(([(header::CONTENT_TYPE, NDJSON)], Body::from_stream(body)).into_response())
}

// =============================================================================
// Questions and health
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub input: String,
}

async fn questions(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<Answer>, AppError> {
    Ok(Json(state.assistant.answer(&request.input).await?))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
