//! In-memory checkpoint store.
//!
//! States are kept as JSON so the store behaves like an external one: what
//! comes back is a deserialized copy, never a shared reference. Entries
//! expire after a TTL; expired ones are dropped on the next save.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::state::GraphState;
use crate::traits::CheckpointStore;

/// How long a session can be resumed after its last transition
pub const DEFAULT_CHECKPOINT_TTL: Duration = Duration::from_secs(60 * 60);

struct Checkpoint {
    payload: String,
    saved_at: Instant,
}

pub struct MemoryCheckpointStore {
    states: RwLock<HashMap<String, Checkpoint>>,
    ttl: Duration,
}

impl Default for MemoryCheckpointStore {
    fn default() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            ttl: DEFAULT_CHECKPOINT_TTL,
        }
    }
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Number of stored sessions, expired ones included until the next save
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn save(&self, session_id: &str, state: &GraphState) -> Result<()> {
        let checkpoint = Checkpoint {
            payload: serde_json::to_string(state)?,
            saved_at: Instant::now(),
        };

        let mut states = self.states.write().await;
        let before = states.len();
        states.retain(|_, saved| saved.saved_at.elapsed() < self.ttl);
        if states.len() < before {
            debug!(expired = before - states.len(), "Dropped expired checkpoints");
        }
        states.insert(session_id.to_string(), checkpoint);

        debug!(session_id, stage = %state.stage(), "Checkpoint saved");
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<GraphState>> {
        let states = self.states.read().await;
        match states.get(session_id) {
            Some(saved) if saved.saved_at.elapsed() < self.ttl => {
                Ok(Some(serde_json::from_str(&saved.payload)?))
            }
            _ => Ok(None),
        }
    }
}
