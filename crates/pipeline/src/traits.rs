//! Seams of the pipeline.
//!
//! The graph only knows these traits. Production wiring plugs in the LLM
//! backed implementations; tests plug in scripted ones.

use async_trait::async_trait;
use flight_data::Flight;

use crate::error::Result;
use crate::state::GraphState;

/// Turns free-text trip details into candidate flights.
#[async_trait]
pub trait FlightSearch: Send + Sync {
    /// Zero flights is a valid answer (e.g. the trip details were incomplete)
    async fn search(&self, trip_details: &str) -> Result<Vec<Flight>>;
}

/// Primary ranking path.
///
/// Implementations return an ordered subset of `candidates`, best first. The
/// `RankingEngine` validates and caps whatever comes back.
#[async_trait]
pub trait RankingService: Send + Sync {
    /// Returns the name of this service (for logging/debugging)
    fn name(&self) -> &str;

    async fn rank(&self, candidates: &[Flight]) -> Result<Vec<Flight>>;
}

/// Persists graph states between transitions, keyed by session id.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn save(&self, session_id: &str, state: &GraphState) -> Result<()>;

    async fn load(&self, session_id: &str) -> Result<Option<GraphState>>;
}
