//! Question answering: classify the input, then dispatch to the matching
//! assistant.

use std::sync::Arc;

use flight_data::Flight;
use pipeline::TravellerGraph;
use serde::Serialize;
use sources::booking_url;
use tracing::{info, instrument};

use crate::chains::{CurrencyConverter, Translator};
use crate::error::AppError;
use crate::routing::{Intent, IntentClassifier};

/// A flight as returned to clients, with its booking link
#[derive(Debug, Clone, Serialize)]
pub struct FlightOffer {
    #[serde(flatten)]
    pub flight: Flight,
    pub booking_url: String,
}

impl From<&Flight> for FlightOffer {
    fn from(flight: &Flight) -> Self {
        Self {
            booking_url: booking_url(flight),
            flight: flight.clone(),
        }
    }
}

pub fn offers(flights: &[Flight]) -> Vec<FlightOffer> {
    flights.iter().map(FlightOffer::from).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flights: Option<Vec<FlightOffer>>,
}

impl Answer {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            flights: None,
        }
    }
}

pub struct TravelAssistant {
    classifier: Arc<dyn IntentClassifier>,
    translator: Translator,
    converter: CurrencyConverter,
    graph: TravellerGraph,
}

impl TravelAssistant {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        translator: Translator,
        converter: CurrencyConverter,
        graph: TravellerGraph,
    ) -> Self {
        Self {
            classifier,
            translator,
            converter,
            graph,
        }
    }

    #[instrument(skip(self))]
    pub async fn answer(&self, input: &str) -> Result<Answer, AppError> {
        let intent = self.classifier.classify(input).await?;
        info!(intent = intent.label(), "Routing traveller input");

        match intent {
            Intent::Translation => Ok(Answer::text(self.translator.translate(input).await?)),
            Intent::CurrencyConversion => Ok(Answer::text(self.converter.convert(input).await?)),
            Intent::SearchFlights => {
                let finished = self.graph.run(None, input.to_string()).await?;
                let output = finished.state().output();
                Ok(Answer {
                    response: output.friendly_greeting,
                    flights: Some(offers(&output.ranked_flights)),
                })
            }
            Intent::Unroutable(label) => Err(AppError::Unroutable(label)),
        }
    }
}
