//! Currency conversion between the supported currencies.
//!
//! ## Algorithm
//! 1. The model extracts `{amount, from, to}` from the traveller's input
//! 2. Anything incomplete or outside BRL/EUR/USD gets a short explanation
//! 3. Otherwise convert with the current (cached) rates, rounding up to cents

use std::sync::Arc;

use llm_client::{extract, LanguageModel};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::rates::{RateProvider, RatesError, SUPPORTED_CURRENCIES};

/// Answer for conversions the assistant cannot do
pub const UNSUPPORTED_CONVERSION: &str =
    "Sorry, I can only convert amounts between BRL, EUR and USD.";

/// Answer for amounts whose conversion does not fit in a `Decimal`
pub const AMOUNT_TOO_LARGE: &str = "Sorry, that amount is too large to convert.";

/// What the model extracted from the input; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct ConversionRequest {
    pub amount: Option<Decimal>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ConversionRequest {
    /// `(amount, from, to)` with upper-cased codes, or `None` when the
    /// request is incomplete or names an unsupported currency
    pub fn validated(&self) -> Option<(Decimal, String, String)> {
        let amount = self.amount?;
        let from = supported_code(self.from.as_deref()?)?;
        let to = supported_code(self.to.as_deref()?)?;
        Some((amount, from, to))
    }
}

fn supported_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    SUPPORTED_CURRENCIES.contains(&code.as_str()).then_some(code)
}

pub struct CurrencyConverter {
    llm: Arc<dyn LanguageModel>,
    rates: RateProvider,
}

impl CurrencyConverter {
    pub fn new(llm: Arc<dyn LanguageModel>, rates: RateProvider) -> Self {
        Self { llm, rates }
    }

    #[instrument(skip(self))]
    pub async fn convert(&self, input: &str) -> Result<String, AppError> {
        let request: ConversionRequest = extract(self.llm.as_ref(), &conversion_prompt(input)).await?;

        let Some((amount, from, to)) = request.validated() else {
            info!(?request, "Unsupported conversion request");
            return Ok(UNSUPPORTED_CONVERSION.to_string());
        };

        match self.rates.rates().await?.convert(amount, &from, &to) {
            Ok(converted) => Ok(format!("{} {} = {} {}", amount, from, converted, to)),
            Err(RatesError::AmountOutOfRange(_)) => {
                info!(%amount, "Conversion amount out of range");
                Ok(AMOUNT_TOO_LARGE.to_string())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn conversion_prompt(input: &str) -> String {
    format!(
        "### Context\n\
You help a traveller convert money between currencies.\n\
\n\
### Instructions\n\
Extract the amount, the currency it is in (from) and the currency to convert \
it to (to), as ISO codes such as BRL, EUR or USD. When the target currency is \
not mentioned, use BRL for EUR or USD amounts and EUR for BRL amounts. Leave \
a field empty (null) when it cannot be determined.\n\
\n\
Traveller amount and currency: {}\n",
        input
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: &str, from: &str, to: &str) -> ConversionRequest {
        ConversionRequest {
            amount: amount.parse().ok(),
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        }
    }

    #[test]
    fn test_validated_request() {
        let (amount, from, to) = request("54.2", "eur", " BRL").validated().unwrap();
        assert_eq!(amount, Decimal::new(542, 1));
        assert_eq!(from, "EUR");
        assert_eq!(to, "BRL");
    }

    #[test]
    fn test_unsupported_or_incomplete_requests() {
        assert!(request("100", "JPY", "BRL").validated().is_none());
        assert!(request("not a number", "EUR", "BRL").validated().is_none());
        assert!(ConversionRequest::default().validated().is_none());
    }

    #[test]
    fn test_prompt_embeds_input() {
        assert!(conversion_prompt("54.2 EUR").contains("Traveller amount and currency: 54.2 EUR"));
    }
}
