use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use flight_data::{
    parse_duration, parse_price_and_currency, parse_timestamp, parse_timestamp_in_year, Flight,
};
use futures::StreamExt;
use pipeline::{GraphState, GraphUpdate};
use server::{AppState, Config};
use tracing::info;

/// Traveller - flight planning and travel assistant
#[derive(Parser)]
#[command(name = "traveller")]
#[command(about = "Flight search, ranking and travel questions backed by a language model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Plan a trip and print every pipeline state as it completes
    Plan {
        /// Free-text trip details, e.g. "flights from CWB to GRU on 2024-08-01"
        trip_details: String,

        /// Session id for checkpointing
        #[arg(long)]
        session: Option<String>,
    },

    /// Ask the travel assistant a question (translation, currency, flights)
    Ask {
        input: String,
    },

    /// Run the text normalizers on provider-style strings
    Normalize {
        /// Duration text, e.g. "1 hr 15 min"
        #[arg(long)]
        duration: Option<String>,

        /// Departure text, e.g. "8:15 AM on Tue, Aug 1"
        #[arg(long)]
        departure: Option<String>,

        /// Price text, e.g. "R$218"
        #[arg(long)]
        price: Option<String>,

        /// Year for departures without one (default: current year)
        #[arg(long)]
        year: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    server::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => handle_serve(port).await?,
        Commands::Plan {
            trip_details,
            session,
        } => handle_plan(trip_details, session).await?,
        Commands::Ask { input } => handle_ask(input).await?,
        Commands::Normalize {
            duration,
            departure,
            price,
            year,
        } => handle_normalize(duration, departure, price, year)?,
    }

    Ok(())
}

fn load_config() -> Result<Config> {
    Config::from_env().context("Failed to load configuration")
}

/// Handle the 'serve' command
async fn handle_serve(port: Option<u16>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(port) = port {
        config.port = port;
    }
    info!("Starting server on port {}", config.port);
    server::serve(config).await
}

/// Handle the 'plan' command
async fn handle_plan(trip_details: String, session: Option<String>) -> Result<()> {
    let state = AppState::from_config(&load_config()?).await?;

    println!("{}", format!("Planning: {}", trip_details).bold().blue());
    let start = Instant::now();

    let mut updates = state.graph.stream(session, trip_details);
    while let Some(update) = updates.next().await {
        let update = update.context("Trip planning failed")?;
        print_update(&update);
    }

    println!("{} Done in {:.2?}", "✓".green(), start.elapsed());
    Ok(())
}

/// Handle the 'ask' command
async fn handle_ask(input: String) -> Result<()> {
    let state = AppState::from_config(&load_config()?).await?;

    let answer = state
        .assistant
        .answer(&input)
        .await
        .context("The assistant could not answer")?;

    println!("{}", answer.response.bold());
    if let Some(offers) = &answer.flights {
        for (rank, offer) in offers.iter().enumerate() {
            print_flight(rank + 1, &offer.flight);
            println!("   {}", offer.booking_url.dimmed());
        }
    }
    Ok(())
}

/// Handle the 'normalize' command
fn handle_normalize(
    duration: Option<String>,
    departure: Option<String>,
    price: Option<String>,
    year: Option<i32>,
) -> Result<()> {
    if let Some(text) = duration {
        println!("{}duration  {:?} -> {} min", "• ".green(), text, parse_duration(&text));
    }

    if let Some(text) = departure {
        let parsed = match year {
            Some(year) => parse_timestamp_in_year(&text, year),
            None => parse_timestamp(&text),
        }?;
        println!("{}departure {:?} -> {}", "• ".green(), text, parsed);
    }

    if let Some(text) = price {
        let (amount, currency) = parse_price_and_currency(&text);
        println!("{}price     {:?} -> {} {}", "• ".green(), text, amount, currency);
    }
    Ok(())
}

fn print_update(update: &GraphUpdate) {
    match &update.state {
        GraphState::Initial(_) => {}
        GraphState::Searched(state) => {
            println!(
                "{} Found {} flights",
                "[searched]".cyan(),
                state.flights.len()
            );
            for (i, flight) in state.flights.iter().enumerate() {
                print_flight(i + 1, flight);
            }
        }
        GraphState::Ranked(state) => {
            println!(
                "{} {}",
                "[ranked]".cyan(),
                state.friendly_greeting.as_deref().unwrap_or_default()
            );
            for (i, flight) in state.ranked_flights.iter().enumerate() {
                print_flight(i + 1, flight);
            }
        }
    }
}

fn print_flight(rank: usize, flight: &Flight) {
    println!(
        "{}. {} {} -> {} {} - {} {} ({} min, {} stops)",
        rank.to_string().green(),
        flight.airline,
        flight.from_airport,
        flight.to_airport,
        flight.departure_date,
        flight.price,
        flight.currency,
        flight.duration_in_minutes,
        flight.stops
    );
}
