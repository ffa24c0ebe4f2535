//! Pipeline state and the explicit graph state machine.
//!
//! ```text
//! Initial --search--> Searched --rank--> Ranked (terminal)
//! ```
//!
//! Each variant carries the accumulated `TravellerState`, so a checkpointed
//! `GraphState` is all that is needed to resume a run.

use std::fmt;

use flight_data::Flight;
use serde::{Deserialize, Serialize};

/// Everything a single planning run accumulates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravellerState {
    pub trip_details: String,
    /// Candidates in provider order
    #[serde(default)]
    pub flights: Vec<Flight>,
    /// Best first, at most 3
    #[serde(default)]
    pub ranked_flights: Vec<Flight>,
    #[serde(default)]
    pub friendly_greeting: Option<String>,
}

impl TravellerState {
    pub fn new(trip_details: impl Into<String>) -> Self {
        Self {
            trip_details: trip_details.into(),
            ..Default::default()
        }
    }

    /// The externally visible part of a finished run
    pub fn output(&self) -> TravellerOutput {
        TravellerOutput {
            friendly_greeting: self.friendly_greeting.clone().unwrap_or_default(),
            ranked_flights: self.ranked_flights.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravellerOutput {
    pub friendly_greeting: String,
    pub ranked_flights: Vec<Flight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initial,
    Searched,
    Ranked,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Initial => "initial",
            Stage::Searched => "searched",
            Stage::Ranked => "ranked",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "state", rename_all = "snake_case")]
pub enum GraphState {
    Initial(TravellerState),
    Searched(TravellerState),
    Ranked(TravellerState),
}

impl GraphState {
    pub fn start(trip_details: impl Into<String>) -> Self {
        GraphState::Initial(TravellerState::new(trip_details))
    }

    pub fn stage(&self) -> Stage {
        match self {
            GraphState::Initial(_) => Stage::Initial,
            GraphState::Searched(_) => Stage::Searched,
            GraphState::Ranked(_) => Stage::Ranked,
        }
    }

    pub fn state(&self) -> &TravellerState {
        match self {
            GraphState::Initial(state) | GraphState::Searched(state) | GraphState::Ranked(state) => state,
        }
    }

    pub fn into_state(self) -> TravellerState {
        match self {
            GraphState::Initial(state) | GraphState::Searched(state) | GraphState::Ranked(state) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GraphState::Ranked(_))
    }
}

/// Emitted by `TravellerGraph::stream` after each completed transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphUpdate {
    pub session_id: Option<String>,
    pub state: GraphState,
}

impl GraphUpdate {
    pub fn stage(&self) -> Stage {
        self.state.stage()
    }
}
