//! Intent routing for free-text traveller input.
//!
//! The model is asked for a single label. Its answer selects an `Intent`
//! only when exactly one known label appears in it; anything else is
//! `Unroutable`.

use std::sync::Arc;

use async_trait::async_trait;
use llm_client::{LanguageModel, Result};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Translation,
    CurrencyConversion,
    SearchFlights,
    /// Carries the model's raw answer
    Unroutable(String),
}

/// Known labels. `currency_converter` is accepted as a synonym.
const LABELS: [(&str, Intent); 4] = [
    ("translation", Intent::Translation),
    ("currency_conversion", Intent::CurrencyConversion),
    ("currency_converter", Intent::CurrencyConversion),
    ("search_flights", Intent::SearchFlights),
];

impl Intent {
    pub fn from_label(answer: &str) -> Intent {
        let normalized = answer.trim().to_lowercase().replace([' ', '-'], "_");

        let mut found: Vec<Intent> = Vec::new();
        for (label, intent) in &LABELS {
            if normalized.contains(label) && !found.contains(intent) {
                found.push(intent.clone());
            }
        }

        match found.as_slice() {
            [intent] => intent.clone(),
            _ => Intent::Unroutable(answer.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Intent::Translation => "translation",
            Intent::CurrencyConversion => "currency_conversion",
            Intent::SearchFlights => "search_flights",
            Intent::Unroutable(answer) => answer,
        }
    }
}

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, input: &str) -> Result<Intent>;
}

pub struct LlmIntentClassifier {
    llm: Arc<dyn LanguageModel>,
}

impl LlmIntentClassifier {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    #[instrument(skip(self))]
    async fn classify(&self, input: &str) -> Result<Intent> {
        let answer = self.llm.complete(&routing_prompt(input)).await?;
        let intent = Intent::from_label(&answer);
        debug!(label = intent.label(), "Classified traveller input");
        Ok(intent)
    }
}

fn routing_prompt(input: &str) -> String {
    format!(
        "### Instructions\n\
Classify what the traveller wants:\n\
- translate a word or a sentence: answer \"translation\"\n\
- convert an amount of money between currencies: answer \"currency_conversion\"\n\
- find flights for a trip: answer \"search_flights\"\n\
\n\
Answer with a single label and nothing else.\n\
\n\
### Examples\n\
[Traveller input]\nEu quero uma cerveja, por favor\n[Classification]\ntranslation\n\
\n\
[Traveller input]\n54.2 EUR\n[Classification]\ncurrency_conversion\n\
\n\
[Traveller input]\nFlights from CWB to GRU on 2024-08-01\n[Classification]\nsearch_flights\n\
\n\
Traveller input: {}\n\
Classification:",
        input
    )
}
