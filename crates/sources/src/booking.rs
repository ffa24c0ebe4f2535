//! Booking links for search results.

use flight_data::Flight;

const BOOKING_BASE_URL: &str = "https://flights.booking.com/flights/";

/// Build a Booking.com one-way economy search link for a flight's route and
/// day.
///
/// Example: CWB -> GRU on 2024-08-01 ->
/// "https://flights.booking.com/flights/CWB-GRU?type=ONEWAY&from=CWB&to=GRU&..."
pub fn booking_url(flight: &Flight) -> String {
    let currency = if is_currency_code(&flight.currency) {
        flight.currency.as_str()
    } else {
        "USD"
    };

    let params = [
        "type=ONEWAY".to_string(),
        format!("from={}", flight.from_airport),
        format!("to={}", flight.to_airport),
        "cabinClass=ECONOMY".to_string(),
        "sort=BEST".to_string(),
        format!("depart={}", flight.departure_date.date()),
        "adults=1".to_string(),
        "locale=en-us".to_string(),
        format!("salesCurrency={}", currency),
        format!("customerCurrency={}", currency),
    ];

    format!(
        "{}{}-{}?{}",
        BOOKING_BASE_URL,
        flight.from_airport,
        flight.to_airport,
        params.join("&")
    )
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}
