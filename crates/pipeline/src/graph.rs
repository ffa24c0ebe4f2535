//! The traveller graph - search then rank, one transition per state.
//!
//! ## Algorithm
//! 1. Load the session's checkpoint; resume from it when it is unfinished,
//!    was made for the same trip details and is not an empty search
//! 2. While the state is not terminal, `advance` it by one transition
//! 3. Save a checkpoint and emit a `GraphUpdate` after every transition
//!
//! A failing transition ends the run. Checkpoints already written stay, so
//! the next run for the same session picks up where this one stopped.

use std::sync::Arc;
use std::time::Instant;

use async_stream::try_stream;
use futures::stream::{BoxStream, StreamExt};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::ranking::RankingEngine;
use crate::state::{GraphState, GraphUpdate, TravellerState};
use crate::traits::{CheckpointStore, FlightSearch};

/// Greeting attached to every ranked result
pub const RANKED_GREETING: &str = "Here are the top ranked flights based on your preferences.";

#[derive(Clone)]
pub struct TravellerGraph {
    search: Arc<dyn FlightSearch>,
    ranking: RankingEngine,
    checkpoints: Option<Arc<dyn CheckpointStore>>,
}

impl TravellerGraph {
    pub fn new(search: Arc<dyn FlightSearch>, ranking: RankingEngine) -> Self {
        Self {
            search,
            ranking,
            checkpoints: None,
        }
    }

    pub fn with_checkpoints(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoints = Some(store);
        self
    }

    /// `Initial -> Searched`
    #[instrument(skip_all)]
    pub async fn search(&self, mut state: TravellerState) -> Result<TravellerState> {
        let start = Instant::now();
        state.flights = self.search.search(&state.trip_details).await?;
        info!("Search step found {} flights in {:.2?}", state.flights.len(), start.elapsed());
        Ok(state)
    }

    /// `Searched -> Ranked`
    #[instrument(skip_all, fields(candidates = state.flights.len()))]
    pub async fn rank(&self, mut state: TravellerState) -> Result<TravellerState> {
        let start = Instant::now();
        state.ranked_flights = self.ranking.rank(&state.flights).await?;
        state.friendly_greeting = Some(RANKED_GREETING.to_string());
        info!(
            "Rank step kept {} flights in {:.2?}",
            state.ranked_flights.len(),
            start.elapsed()
        );
        Ok(state)
    }

    /// Run the transition for the current state. Terminal states are
    /// returned unchanged.
    pub async fn advance(&self, current: GraphState) -> Result<GraphState> {
        match current {
            GraphState::Initial(state) => Ok(GraphState::Searched(self.search(state).await?)),
            GraphState::Searched(state) => Ok(GraphState::Ranked(self.rank(state).await?)),
            GraphState::Ranked(state) => Ok(GraphState::Ranked(state)),
        }
    }

    /// Stream one update per completed transition.
    ///
    /// Dropping the stream abandons the run at its current state.
    pub fn stream(
        &self,
        session_id: Option<String>,
        trip_details: String,
    ) -> BoxStream<'static, Result<GraphUpdate>> {
        let graph = self.clone();

        try_stream! {
            let mut current = graph.resume_or_start(session_id.as_deref(), trip_details).await?;

            while !current.is_terminal() {
                current = graph.step(session_id.as_deref(), current).await?;

                yield GraphUpdate {
                    session_id: session_id.clone(),
                    state: current.clone(),
                };
            }
        }
        .boxed()
    }

    /// Drive the graph to its terminal state
    pub async fn run(&self, session_id: Option<String>, trip_details: String) -> Result<GraphState> {
        let start = Instant::now();
        let mut current = self.resume_or_start(session_id.as_deref(), trip_details).await?;

        while !current.is_terminal() {
            current = self.step(session_id.as_deref(), current).await?;
        }

        info!("Graph run finished at {} in {:.2?}", current.stage(), start.elapsed());
        Ok(current)
    }

    /// One transition followed by its checkpoint
    async fn step(&self, session_id: Option<&str>, current: GraphState) -> Result<GraphState> {
        let next = self.advance(current).await?;
        self.checkpoint(session_id, &next).await?;
        Ok(next)
    }

    async fn resume_or_start(&self, session_id: Option<&str>, trip_details: String) -> Result<GraphState> {
        if let (Some(store), Some(session_id)) = (&self.checkpoints, session_id) {
            match store.load(session_id).await? {
                Some(saved) if saved.is_terminal() => {
                    debug!(session_id, "Previous run finished, starting a new one")
                }
                Some(saved) if saved.state().trip_details != trip_details => {
                    debug!(session_id, "Trip details changed, starting a new run")
                }
                Some(GraphState::Searched(state)) if state.flights.is_empty() => {
                    debug!(session_id, "Previous search found nothing, searching again")
                }
                Some(saved) => {
                    info!(session_id, stage = %saved.stage(), "Resuming from checkpoint");
                    return Ok(saved);
                }
                None => {}
            }
        }
        Ok(GraphState::start(trip_details))
    }

    async fn checkpoint(&self, session_id: Option<&str>, state: &GraphState) -> Result<()> {
        match (&self.checkpoints, session_id) {
            (Some(store), Some(session_id)) => store.save(session_id, state).await,
            _ => Ok(()),
        }
    }
}
