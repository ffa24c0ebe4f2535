//! Brazilian Portuguese <-> Spanish (Spain) translation.

use std::sync::Arc;

use llm_client::{LanguageModel, Result};
use tracing::instrument;

/// Answer for input in any other language
pub const TRANSLATION_REFUSAL: &str =
    "I am sorry, but I can only translate between Brazilian Portuguese and Spanish spoken in Spain.";

pub struct Translator {
    llm: Arc<dyn LanguageModel>,
}

impl Translator {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    #[instrument(skip(self))]
    pub async fn translate(&self, input: &str) -> Result<String> {
        let answer = self.llm.complete(&translation_prompt(input)).await?;
        Ok(answer.trim().to_string())
    }
}

fn translation_prompt(input: &str) -> String {
    format!(
        "### Context\n\
You are a travel assistant that translates from Brazilian Portuguese to the \
Spanish spoken in Spain, and from Spanish back to Brazilian Portuguese.\n\
\n\
### Instructions\n\
Answer with the translation only, without explanations.\n\
- A single word gets a single word back (Cerveja -> Cerveza).\n\
- A sentence is translated as a whole \
(Eu quero uma cerveja, por favor. -> Quiero una cerveza, por favor.).\n\
- For input in any other language, answer exactly: {}\n\
\n\
Traveller input: {}\n\
Your answer:",
        TRANSLATION_REFUSAL, input
    )
}
