//! Prompt templates for the LLM-backed pipeline steps.

/// Instructions for turning trip details into search parameters
pub fn flight_search_prompt(trip_details: &str) -> String {
    format!(
        "You are a flight search assistant. Read the traveller's trip details and \
extract the parameters of a one-way flight search.\n\
\n\
- from_airport: IATA code of the departure airport\n\
- to_airport: IATA code of the destination airport\n\
- departure_date: departure day as YYYY-MM-DD\n\
\n\
Leave a field empty (null) when the trip details do not mention it. \
Do not guess airports or dates.\n\
\n\
Trip details: {}\n",
        trip_details
    )
}

/// Instructions for ranking candidate flights. `records` holds one JSON
/// object per flight.
pub fn flight_ranking_prompt(records: &[String]) -> String {
    format!(
        "You are a flight ranking assistant. You will receive a list of flights. \
Rank them by the following criteria, in this order:\n\
- Price (lower is better)\n\
- Duration (shorter is better)\n\
- Number of stops (fewer is better)\n\
\n\
Return the top 3 flights in order of preference, copying each flight \
exactly as it appears in the list.\n\
\n\
Flights list:\n{}\n",
        records.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_their_input() {
        assert!(flight_search_prompt("CWB to GRU tomorrow").contains("Trip details: CWB to GRU tomorrow"));

        let prompt = flight_ranking_prompt(&["{\"a\":1}".to_string(), "{\"b\":2}".to_string()]);
        assert!(prompt.ends_with("{\"a\":1}\n{\"b\":2}\n"));
    }
}
