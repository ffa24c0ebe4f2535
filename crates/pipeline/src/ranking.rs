//! Ranking engine - picks the best 3 flights out of a search.
//!
//! ## Algorithm
//! 1. Reject an empty candidate list (`EmptyInput`)
//! 2. Ask the primary `RankingService`, if one is configured
//! 3. Keep only answers that are genuine candidates (no duplicates)
//! 4. If nothing survives, sort locally by `(price, duration, stops)`
//! 5. Cap at 3, best first
//!
//! Errors from the primary service are propagated, not papered over by the
//! local sort. An empty or unusable answer is what triggers the fallback.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use flight_data::{Flight, FlightList};
use llm_client::{extract, LanguageModel};
use tracing::{debug, info, instrument, warn};

use crate::error::{PipelineError, Result};
use crate::prompts::flight_ranking_prompt;
use crate::traits::RankingService;

/// Maximum number of flights a ranking returns
pub const MAX_RANKED_FLIGHTS: usize = 3;

#[derive(Clone)]
pub struct RankingEngine {
    primary: Option<Arc<dyn RankingService>>,
    limit: usize,
}

impl RankingEngine {
    /// Engine without a primary service: always ranks locally
    pub fn new() -> Self {
        Self {
            primary: None,
            limit: MAX_RANKED_FLIGHTS,
        }
    }

    pub fn with_primary(mut self, service: Arc<dyn RankingService>) -> Self {
        self.primary = Some(service);
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub async fn rank(&self, candidates: &[Flight]) -> Result<Vec<Flight>> {
        if candidates.is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let start = Instant::now();

        if let Some(primary) = &self.primary {
            let answer = primary.rank(candidates).await?;
            let answered = answer.len();
            let ranked = reconcile(answer, candidates, self.limit);

            if !ranked.is_empty() {
                info!(
                    "Ranked {} candidates with {} in {:.2?}",
                    candidates.len(),
                    primary.name(),
                    start.elapsed()
                );
                return Ok(ranked);
            }

            warn!(
                service = primary.name(),
                answered, "Primary ranking produced no usable flights, sorting locally"
            );
        }

        let ranked = rank_locally(candidates, self.limit);
        debug!("Ranked {} candidates locally in {:.2?}", candidates.len(), start.elapsed());
        Ok(ranked)
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable ascending sort on `Flight::ranking_key`, truncated to `limit`
pub fn rank_locally(candidates: &[Flight], limit: usize) -> Vec<Flight> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by_key(Flight::ranking_key);
    sorted.truncate(limit);
    sorted
}

/// Keep the primary answer's order but only flights that appear in
/// `candidates`, each candidate at most once.
fn reconcile(answer: Vec<Flight>, candidates: &[Flight], limit: usize) -> Vec<Flight> {
    let mut taken = vec![false; candidates.len()];
    let mut ranked = Vec::with_capacity(limit);

    for flight in answer {
        if ranked.len() == limit {
            break;
        }
        let position = candidates
            .iter()
            .enumerate()
            .position(|(i, candidate)| !taken[i] && *candidate == flight);

        match position {
            Some(i) => {
                taken[i] = true;
                ranked.push(flight);
            }
            None => debug!(airline = %flight.airline, "Discarding ranked flight that is not a candidate"),
        }
    }
    ranked
}

// =============================================================================
// LLM ranking service
// =============================================================================

/// Primary ranking path backed by a language model's structured output
pub struct LlmRanker {
    llm: Arc<dyn LanguageModel>,
}

impl LlmRanker {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl RankingService for LlmRanker {
    fn name(&self) -> &str {
        "LlmRanker"
    }

    async fn rank(&self, candidates: &[Flight]) -> Result<Vec<Flight>> {
        let records = candidates
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let answer: FlightList = extract(self.llm.as_ref(), &flight_ranking_prompt(&records)).await?;
        Ok(answer.flights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn flight(airline: &str, price: i64, duration: u32, stops: u32) -> Flight {
        Flight {
            from_airport: "CWB".to_string(),
            to_airport: "GRU".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2024, 8, 1)
                .unwrap()
                .and_hms_opt(8, 15, 0)
                .unwrap(),
            airline: airline.to_string(),
            price: Decimal::from(price),
            currency: "BRL".to_string(),
            stops,
            duration_in_minutes: duration,
        }
    }

    fn candidates() -> Vec<Flight> {
        vec![
            flight("Azul", 300, 65, 0),
            flight("GOL", 200, 90, 1),
            flight("LATAM", 200, 70, 0),
            flight("Avianca", 450, 60, 0),
            flight("TAP", 200, 70, 1),
        ]
    }

    /// Ranking service returning a canned answer
    struct ScriptedRanker {
        answer: Vec<Flight>,
    }

    #[async_trait]
    impl RankingService for ScriptedRanker {
        fn name(&self) -> &str {
            "ScriptedRanker"
        }

        async fn rank(&self, _candidates: &[Flight]) -> Result<Vec<Flight>> {
            Ok(self.answer.clone())
        }
    }

    struct FailingRanker;

    #[async_trait]
    impl RankingService for FailingRanker {
        fn name(&self) -> &str {
            "FailingRanker"
        }

        async fn rank(&self, _candidates: &[Flight]) -> Result<Vec<Flight>> {
            Err(PipelineError::upstream("llm", "connection refused"))
        }
    }

    fn airlines(flights: &[Flight]) -> Vec<&str> {
        flights.iter().map(|f| f.airline.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_input_is_an_error() {
        let err = RankingEngine::new().rank(&[]).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput));
        assert_eq!(err.to_string(), "No flights found to rank");
    }

    #[tokio::test]
    async fn test_local_ranking_orders_by_price_duration_stops() {
        let ranked = RankingEngine::new().rank(&candidates()).await.unwrap();
        assert_eq!(airlines(&ranked), vec!["LATAM", "TAP", "GOL"]);
    }

    #[tokio::test]
    async fn test_fewer_candidates_than_limit() {
        let ranked = RankingEngine::new()
            .rank(&[flight("Azul", 300, 65, 0)])
            .await
            .unwrap();
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_local_sort_is_stable_for_ties() {
        let tied = vec![flight("First", 100, 60, 0), flight("Second", 100, 60, 0)];
        let ranked = rank_locally(&tied, MAX_RANKED_FLIGHTS);
        assert_eq!(airlines(&ranked), vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn test_primary_answer_is_used_and_capped() {
        let all = candidates();
        let answer = vec![all[3].clone(), all[0].clone(), all[1].clone(), all[2].clone()];
        let engine = RankingEngine::new().with_primary(Arc::new(ScriptedRanker { answer }));

        let ranked = engine.rank(&all).await.unwrap();
        assert_eq!(airlines(&ranked), vec!["Avianca", "Azul", "GOL"]);
    }

    #[tokio::test]
    async fn test_empty_primary_answer_falls_back() {
        let engine = RankingEngine::new().with_primary(Arc::new(ScriptedRanker { answer: vec![] }));

        let ranked = engine.rank(&candidates()).await.unwrap();
        assert_eq!(airlines(&ranked), vec!["LATAM", "TAP", "GOL"]);
    }

    #[tokio::test]
    async fn test_flights_outside_the_candidates_are_discarded() {
        let all = candidates();
        let answer = vec![flight("Invented Air", 1, 1, 0), all[4].clone(), all[4].clone()];
        let engine = RankingEngine::new().with_primary(Arc::new(ScriptedRanker { answer }));

        let ranked = engine.rank(&all).await.unwrap();
        assert_eq!(airlines(&ranked), vec!["TAP"]);
    }

    #[tokio::test]
    async fn test_only_invented_flights_falls_back() {
        let answer = vec![flight("Invented Air", 1, 1, 0)];
        let engine = RankingEngine::new().with_primary(Arc::new(ScriptedRanker { answer }));

        let ranked = engine.rank(&candidates()).await.unwrap();
        assert_eq!(airlines(&ranked), vec!["LATAM", "TAP", "GOL"]);
    }

    #[tokio::test]
    async fn test_primary_errors_propagate() {
        let engine = RankingEngine::new().with_primary(Arc::new(FailingRanker));
        let err = engine.rank(&candidates()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Upstream { service: "llm", .. }));
    }
}
