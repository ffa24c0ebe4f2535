//! Normalizers for the provider's locale-formatted text.
//!
//! Three fields arrive as free text:
//! - duration: "1 hr 15 min", "2 hr", "45 min"
//! - departure: "11:40 AM on Tue, Jul 1" (year optional)
//! - price: "R$218", "€99,99", "$1200"
//!
//! Duration and price are lenient: a missing token becomes zero.
//! Timestamps are strict: anything we cannot place on the calendar is a
//! `FlightDataError::ParseError`.

use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Datelike, Local, NaiveDateTime, Weekday};
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use crate::error::{FlightDataError, Result};

/// chrono format for the reassembled "<time> <month> <day> <year>" string
const TIMESTAMP_FORMAT: &str = "%I:%M %p %b %d %Y";

// =============================================================================
// Duration
// =============================================================================

fn hours_re() -> &'static Regex {
    static HOURS_RE: OnceLock<Regex> = OnceLock::new();
    HOURS_RE.get_or_init(|| Regex::new(r"(\d+)\s*hr").unwrap())
}

fn minutes_re() -> &'static Regex {
    static MINUTES_RE: OnceLock<Regex> = OnceLock::new();
    MINUTES_RE.get_or_init(|| Regex::new(r"(\d+)\s*min").unwrap())
}

/// Convert a duration like "1 hr 15 min" into whole minutes.
///
/// Example: "1 hr 15 min" -> 75
///          "2 hr"        -> 120
///          "2 hours"     -> 0 (only the literal `hr` / `min` tokens count)
pub fn parse_duration(text: &str) -> u32 {
    let hours = first_number(hours_re(), text);
    let minutes = first_number(minutes_re(), text);
    hours.saturating_mul(60).saturating_add(minutes)
}

fn first_number(re: &Regex, text: &str) -> u32 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

// =============================================================================
// Timestamp
// =============================================================================

fn weekday_format_re() -> &'static Regex {
    static WEEKDAY_RE: OnceLock<Regex> = OnceLock::new();
    WEEKDAY_RE.get_or_init(|| {
        Regex::new(
            r"^(?P<time>\d{1,2}:\d{2}\s*[AaPp][Mm])\s+on\s+(?P<weekday>[A-Za-z]+),\s*(?P<date>[A-Za-z]+\s+\d{1,2})(?:,\s*(?P<year>\d{4}))?$",
        )
        .unwrap()
    })
}

fn plain_format_re() -> &'static Regex {
    static PLAIN_RE: OnceLock<Regex> = OnceLock::new();
    PLAIN_RE.get_or_init(|| {
        Regex::new(
            r"^(?P<time>\d{1,2}:\d{2}\s*[AaPp][Mm])\s+on\s+(?P<date>[A-Za-z]+\s+\d{1,2})(?:,\s*(?P<year>\d{4}))?$",
        )
        .unwrap()
    })
}

/// Parse a provider departure string, assuming the current year when the
/// string carries none.
///
/// Example: "11:40 AM on Tue, Jul 1, 2025" -> 2025-07-01T11:40:00
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    parse_timestamp_in_year(text, Local::now().year())
}

/// Same as [`parse_timestamp`] with an explicit fallback year.
///
/// The weekday form ("<time> on <Wkd>, <Mon> <d>[, <yyyy>]") is tried first,
/// then the form without a weekday. The weekday must be a real weekday name
/// but is not checked against the date: the provider computes it for the
/// departure year, which need not be `current_year`.
pub fn parse_timestamp_in_year(text: &str, current_year: i32) -> Result<NaiveDateTime> {
    let text = text.trim();

    if let Some(caps) = weekday_format_re().captures(text) {
        let weekday_ok = Weekday::from_str(&caps["weekday"]).is_ok();
        if let Some(timestamp) = weekday_ok.then(|| assemble(&caps, current_year)).flatten() {
            return Ok(timestamp);
        }
    }

    if let Some(timestamp) = plain_format_re()
        .captures(text)
        .and_then(|caps| assemble(&caps, current_year))
    {
        return Ok(timestamp);
    }

    Err(FlightDataError::ParseError {
        input: text.to_string(),
        reason: "expected '<h>:<mm> <AM|PM> on [<weekday>, ]<month> <day>[, <year>]'".to_string(),
    })
}

fn assemble(caps: &Captures<'_>, current_year: i32) -> Option<NaiveDateTime> {
    let year = caps
        .name("year")
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| current_year.to_string());
    let candidate = format!("{} {} {}", &caps["time"], &caps["date"], year);
    NaiveDateTime::parse_from_str(&candidate, TIMESTAMP_FORMAT).ok()
}

// =============================================================================
// Price
// =============================================================================

fn symbol_re() -> &'static Regex {
    static SYMBOL_RE: OnceLock<Regex> = OnceLock::new();
    SYMBOL_RE.get_or_init(|| Regex::new(r"^([^\d\s]+)").unwrap())
}

fn amount_re() -> &'static Regex {
    static AMOUNT_RE: OnceLock<Regex> = OnceLock::new();
    AMOUNT_RE.get_or_init(|| Regex::new(r"(\d+(?:[.,]\d+)?)").unwrap())
}

/// Map a currency symbol to its code
///
/// Example: "R$" -> Some("BRL")
///          "¥"  -> None
pub fn currency_code(symbol: &str) -> Option<&'static str> {
    match symbol {
        "R$" => Some("BRL"),
        "$" => Some("USD"),
        "€" => Some("EUR"),
        "£" => Some("GBP"),
        _ => None,
    }
}

/// Split a price like "R$218" into an exact amount and a currency code.
///
/// Either `.` or `,` may separate decimals. Unknown symbols are returned as
/// the currency unchanged, and a string with no digits yields an amount of 0.
///
/// Example: "R$218"  -> (218, "BRL")
///          "€99,99" -> (99.99, "EUR")
///          "¥500"   -> (500, "¥")
pub fn parse_price_and_currency(text: &str) -> (Decimal, String) {
    let symbol = symbol_re()
        .captures(text)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();

    let amount = amount_re()
        .captures(text)
        .and_then(|caps| Decimal::from_str(&caps[1].replace(',', ".")).ok())
        .unwrap_or(Decimal::ZERO);

    let currency = match currency_code(&symbol) {
        Some(code) => code.to_string(),
        None => symbol,
    };

    (amount, currency)
}
