//! Single-shot assistants behind the routing classifier.

pub mod currency;
pub mod translator;

pub use currency::{ConversionRequest, CurrencyConverter};
pub use translator::{Translator, TRANSLATION_REFUSAL};
