//! Flight search from free-text trip details.
//!
//! The language model extracts the search parameters; `FlightSearcher` does
//! the actual provider call. Incomplete trip details are not an error, they
//! simply produce no flights.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use flight_data::{Flight, SearchParams};
use llm_client::{extract, LanguageModel};
use schemars::JsonSchema;
use serde::Deserialize;
use sources::FlightSearcher;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::prompts::flight_search_prompt;
use crate::traits::FlightSearch;

/// Search parameters as extracted by the model; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct TripQuery {
    pub from_airport: Option<String>,
    pub to_airport: Option<String>,
    pub departure_date: Option<NaiveDate>,
}

impl TripQuery {
    /// `None` unless both airports and the date are present
    pub fn into_params(self) -> Option<SearchParams> {
        let from = airport_code(self.from_airport?)?;
        let to = airport_code(self.to_airport?)?;
        Some(SearchParams::new(from, to, self.departure_date?))
    }
}

fn airport_code(raw: String) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    (!code.is_empty()).then_some(code)
}

pub struct FlightSearchAgent {
    llm: Arc<dyn LanguageModel>,
    searcher: FlightSearcher,
}

impl FlightSearchAgent {
    pub fn new(llm: Arc<dyn LanguageModel>, searcher: FlightSearcher) -> Self {
        Self { llm, searcher }
    }
}

#[async_trait]
impl FlightSearch for FlightSearchAgent {
    #[instrument(skip(self))]
    async fn search(&self, trip_details: &str) -> Result<Vec<Flight>> {
        let query: TripQuery = extract(self.llm.as_ref(), &flight_search_prompt(trip_details)).await?;

        let Some(params) = query.clone().into_params() else {
            warn!(?query, "Trip details are incomplete, skipping flight search");
            return Ok(Vec::new());
        };

        let flights = self.searcher.search(&params).await?;
        info!("Found {} candidate flights", flights.len());
        Ok(flights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use flight_data::RawFlight;
    use sources::FlightProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every structured prompt with the same JSON
    struct CannedModel {
        answer: String,
    }

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn complete(&self, _prompt: &str) -> llm_client::Result<String> {
            Ok(self.answer.clone())
        }

        async fn complete_structured(
            &self,
            _prompt: &str,
            _schema: serde_json::Value,
        ) -> llm_client::Result<String> {
            Ok(self.answer.clone())
        }
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FlightProvider for CountingProvider {
        fn name(&self) -> &str {
            "CountingProvider"
        }

        async fn search(&self, params: &SearchParams) -> sources::Result<Vec<RawFlight>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(params.from_airport, "CWB");
            Ok(vec![RawFlight {
                name: "Azul".to_string(),
                price: "R$218".to_string(),
                departure: "6:00 AM on Thu, Aug 1, 2024".to_string(),
                arrival: None,
                duration: "1 hr 5 min".to_string(),
                stops: 0,
                is_best: true,
            }])
        }
    }

    fn agent(answer: &str) -> (FlightSearchAgent, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let model = Arc::new(CannedModel {
            answer: answer.to_string(),
        });
        (
            FlightSearchAgent::new(model, FlightSearcher::new(provider.clone())),
            provider,
        )
    }

    #[test]
    fn test_trip_query_into_params() {
        let query = TripQuery {
            from_airport: Some(" cwb".to_string()),
            to_airport: Some("GRU".to_string()),
            departure_date: NaiveDate::from_ymd_opt(2024, 8, 1),
        };
        let params = query.into_params().unwrap();
        assert_eq!(params.from_airport, "CWB");

        let incomplete = TripQuery {
            from_airport: Some("CWB".to_string()),
            ..Default::default()
        };
        assert!(incomplete.into_params().is_none());
    }

    #[tokio::test]
    async fn test_search_with_complete_trip_details() {
        let (agent, provider) =
            agent(r#"{"from_airport": "CWB", "to_airport": "GRU", "departure_date": "2024-08-01"}"#);

        let flights = agent.search("CWB to GRU on 2024-08-01").await.unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].airline, "Azul");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_incomplete_trip_details_yield_no_flights() {
        let (agent, provider) = agent(r#"{"from_airport": "CWB", "to_airport": null, "departure_date": null}"#);

        let flights = agent.search("I want to leave Curitiba").await.unwrap();
        assert!(flights.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_extraction_is_upstream_error() {
        let (agent, _) = agent("I cannot help with that");

        let err = agent.search("CWB to GRU").await.unwrap_err();
        assert!(matches!(err, PipelineError::Upstream { service: "llm", .. }));
    }
}
