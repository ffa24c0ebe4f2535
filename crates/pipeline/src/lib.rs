//! Search-and-rank pipeline for trip planning.
//!
//! This crate provides:
//! - `TravellerGraph`, an explicit `Initial -> Searched -> Ranked` state
//!   machine with checkpointing and per-transition streaming
//! - `RankingEngine`, LLM ranking with a deterministic local fallback
//! - `FlightSearchAgent`, which extracts search parameters from free text
//!   and runs the flight search
//!
//! ## Architecture
//! Every external collaborator sits behind a trait (`FlightSearch`,
//! `RankingService`, `CheckpointStore`), so the graph can be driven with
//! scripted implementations in tests.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FlightSearchAgent, LlmRanker, RankingEngine, TravellerGraph};
//!
//! let search = Arc::new(FlightSearchAgent::new(llm.clone(), searcher));
//! let ranking = RankingEngine::new().with_primary(Arc::new(LlmRanker::new(llm)));
//! let graph = TravellerGraph::new(search, ranking)
//!     .with_checkpoints(Arc::new(MemoryCheckpointStore::new()));
//!
//! let finished = graph.run(Some(session_id), trip_details).await?;
//! println!("{}", finished.state().output().friendly_greeting);
//! ```

pub mod error;
pub mod traits;
pub mod state;
pub mod prompts;
pub mod ranking;
pub mod search;
pub mod checkpoint;
pub mod graph;

// Re-export main types
pub use error::{PipelineError, Result};
pub use traits::{CheckpointStore, FlightSearch, RankingService};
pub use state::{GraphState, GraphUpdate, Stage, TravellerOutput, TravellerState};
pub use ranking::{rank_locally, LlmRanker, RankingEngine, MAX_RANKED_FLIGHTS};
pub use search::{FlightSearchAgent, TripQuery};
pub use checkpoint::{MemoryCheckpointStore, DEFAULT_CHECKPOINT_TTL};
pub use graph::{TravellerGraph, RANKED_GREETING};
