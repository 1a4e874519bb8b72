//! Subcommands of the `trainroute` binary.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDateTime, TimeZone};
use clap::{Parser, Subcommand};
use serde::Serialize;

use trainroute_core::{
    CallingOrder, JourneyDetails, JourneySearch, Registry, ValidationError,
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const DIRECT_ROUTE: &str = "N/A - Direct Route!";

#[derive(Parser, Debug)]
#[command(
    name = "trainroute",
    version,
    about = "Browse and maintain train stations, routes and journeys"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Default)]
pub enum Command {
    /// Collection counts and records rejected while loading
    #[default]
    Overview,
    /// List destination and intermediate stations
    Stations {
        #[arg(long)]
        json: bool,
    },
    /// List basic routes
    Routes {
        #[arg(long)]
        json: bool,
    },
    /// List every journey with its calling points and fare
    Journeys {
        #[arg(long)]
        json: bool,
    },
    /// Find journeys between two destination stations
    Find {
        /// Departing destination station name
        from: String,
        /// Destination station name
        to: String,
        /// Only journeys departing after this time (YYYY-MM-DD HH:MM)
        #[arg(long, conflicts_with = "by")]
        after: Option<String>,
        /// Only journeys arriving by this time (YYYY-MM-DD HH:MM)
        #[arg(long)]
        by: Option<String>,
        /// List calling points alphabetically instead of in route order
        #[arg(long)]
        alphabetical: bool,
        #[arg(long)]
        json: bool,
    },
    /// Create an intermediate station
    AddStation { name: String },
    /// Delete an intermediate station and drop it from every journey
    RemoveStation { id: String },
    /// Schedule a journey on a basic route
    AddJourney {
        route_id: String,
        /// Departure time (YYYY-MM-DD HH:MM)
        departure: String,
        /// Intermediate station ids in calling order
        #[arg(long = "via")]
        via: Vec<String>,
    },
    /// Delete a journey
    DeleteJourney { id: String },
    /// Write the loaded data set back to disk
    Resave,
}

pub fn run(command: Command, registry: &mut Registry) -> Result<()> {
    match command {
        Command::Overview => overview(registry),
        Command::Stations { json } => stations(registry, json),
        Command::Routes { json } => routes(registry, json),
        Command::Journeys { json } => {
            let ids: Vec<String> = registry
                .journeys()
                .journeys()
                .iter()
                .map(|journey| journey.id.clone())
                .collect();
            print_journeys(registry, &ids, CallingOrder::Route, json)
        }
        Command::Find {
            from,
            to,
            after,
            by,
            alphabetical,
            json,
        } => {
            let route_id = registry
                .find_basic_route(&from, &to)
                .map(|route| route.id.clone())
                .ok_or_else(|| anyhow!("no route from '{from}' to '{to}'"))?;

            let filter = match (after, by) {
                (Some(time), _) => Some((parse_time(&time)?, JourneySearch::LeavingAfter)),
                (None, Some(time)) => Some((parse_time(&time)?, JourneySearch::ArrivingBy)),
                (None, None) => None,
            };
            let ids: Vec<String> = registry
                .search_journeys(&route_id, filter)
                .into_iter()
                .map(|journey| journey.id)
                .collect();

            let order = if alphabetical {
                CallingOrder::Alphabetical
            } else {
                CallingOrder::Route
            };
            print_journeys(registry, &ids, order, json)
        }
        Command::AddStation { name } => {
            let station = registry
                .create_intermediate_station(&name)
                .map_err(describe)?;
            registry.save()?;
            println!("created intermediate station {} ({})", station.name, station.id);
            Ok(())
        }
        Command::RemoveStation { id } => {
            if registry.stations().get_intermediate_station(&id).is_none() {
                bail!("no intermediate station with id '{id}'");
            }
            registry.delete_intermediate_station(&id);
            registry.save()?;
            println!("removed intermediate station {id}");
            Ok(())
        }
        Command::AddJourney {
            route_id,
            departure,
            via,
        } => {
            let timestamp = parse_time(&departure)?;
            let journey = registry
                .create_journey(&route_id, &via, timestamp)
                .map_err(describe)?;
            registry.save()?;
            println!("created journey {}", journey.id);
            Ok(())
        }
        Command::DeleteJourney { id } => {
            if registry.journeys().get_journey(&id).is_none() {
                bail!("no journey with id '{id}'");
            }
            registry.delete_journey(&id);
            registry.save()?;
            println!("deleted journey {id}");
            Ok(())
        }
        Command::Resave => {
            registry.save()?;
            println!("saved data set to {}", registry.paths().stations.display());
            Ok(())
        }
    }
}

fn overview(registry: &Registry) -> Result<()> {
    let stations = registry.stations();
    println!("destination stations:  {}", stations.destination_stations().len());
    println!("intermediate stations: {}", stations.intermediate_stations().len());
    println!("basic routes:          {}", registry.routes().basic_routes().len());
    println!("journeys:              {}", registry.journeys().journeys().len());

    if !registry.rejected().is_empty() {
        println!("\nrejected while loading:");
        for record in registry.rejected() {
            println!("{:?} {}: {}", record.kind, record.id, record.error);
            print!("{}", record.error.details());
        }
    }
    Ok(())
}

fn stations(registry: &Registry, json: bool) -> Result<()> {
    let stations = registry.stations();
    if json {
        #[derive(Serialize)]
        struct Listing<'a> {
            destination_stations: &'a [trainroute_core::Station],
            intermediate_stations: &'a [trainroute_core::Station],
        }
        return print_json(&Listing {
            destination_stations: stations.destination_stations(),
            intermediate_stations: stations.intermediate_stations(),
        });
    }

    println!("Destination stations");
    for station in stations.destination_stations() {
        println!("  {:<24} {}", station.name, station.id);
    }
    println!("Intermediate stations");
    for station in stations.intermediate_stations() {
        println!("  {:<24} {}", station.name, station.id);
    }
    Ok(())
}

fn routes(registry: &Registry, json: bool) -> Result<()> {
    let routes = registry.routes().basic_routes();
    if json {
        return print_json(&routes);
    }

    for route in routes {
        let label = registry
            .route_label(&route.id)
            .unwrap_or_else(|| route.id.clone());
        println!(
            "{label:<32} {} single, {} return, {} min  [{}]",
            route.single_price.formatted(),
            route.return_price.formatted(),
            route.duration_minutes,
            route.id
        );
    }
    Ok(())
}

fn print_journeys(
    registry: &Registry,
    ids: &[String],
    order: CallingOrder,
    json: bool,
) -> Result<()> {
    let details: Vec<JourneyDetails> = ids
        .iter()
        .filter_map(|id| registry.journey_details(id))
        .collect();
    if json {
        return print_json(&details);
    }
    if details.is_empty() {
        println!("no journeys found");
        return Ok(());
    }

    for journey in &details {
        println!(
            "{}  {} -> {}  {}",
            journey.route_label(),
            format_time(journey.departure_timestamp),
            format_time(journey.arrival_timestamp),
            journey.journey_id
        );
        println!("  calling at: {}", journey.calling_points(order, DIRECT_ROUTE));
        println!("  {}", journey.fare);
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}

fn describe(error: ValidationError) -> anyhow::Error {
    anyhow!("{error}\n{}", error.details().trim_end())
}

fn parse_time(value: &str) -> Result<i64> {
    let naive = NaiveDateTime::parse_from_str(value, TIME_FORMAT)
        .with_context(|| format!("invalid time '{value}', expected YYYY-MM-DD HH:MM"))?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| anyhow!("'{value}' does not exist in the local time zone"))?;
    Ok(local.timestamp_millis())
}

fn format_time(timestamp: i64) -> String {
    match Local.timestamp_millis_opt(timestamp).single() {
        Some(time) => time.format(TIME_FORMAT).to_string(),
        None => timestamp.to_string(),
    }
}
