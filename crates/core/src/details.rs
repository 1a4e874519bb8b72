#![allow(missing_docs)]

//! Read model joining a journey with its stations, route and fare.

use serde::Serialize;

use crate::{
    fare::Fare,
    manager::{BasicRouteManager, StationManager},
    models::Journey,
};

/// How calling points are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingOrder {
    /// Route order, numbered: `1. A > 2. B`.
    Route,
    /// Sorted by name as a sentence: `A, B and C`.
    Alphabetical,
}

/// A journey with every reference resolved to names and times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JourneyDetails {
    pub journey_id: String,
    pub basic_route_id: String,
    pub departing_station: String,
    pub destination_station: String,
    /// Intermediate station names in calling order.
    pub calling_at: Vec<String>,
    pub duration_minutes: i64,
    pub departure_timestamp: i64,
    pub arrival_timestamp: i64,
    pub fare: Fare,
}

impl JourneyDetails {
    /// Resolve `journey`; `None` if its route or any referenced station is unknown.
    pub fn resolve(
        journey: &Journey,
        stations: &StationManager,
        routes: &BasicRouteManager,
    ) -> Option<Self> {
        let route = routes.get_basic_route(&journey.basic_route_id)?;
        let departing = stations.get_destination_station(&route.departing_station_id)?;
        let destination = stations.get_destination_station(&route.destination_station_id)?;
        let calling_at = journey
            .intermediate_station_ids
            .iter()
            .map(|id| {
                stations
                    .get_intermediate_station(id)
                    .map(|station| station.name.clone())
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            journey_id: journey.id.clone(),
            basic_route_id: route.id.clone(),
            departing_station: departing.name.clone(),
            destination_station: destination.name.clone(),
            calling_at,
            duration_minutes: route.duration_minutes,
            departure_timestamp: journey.departure_timestamp,
            arrival_timestamp: journey.arrival_timestamp(route),
            fare: Fare::for_departure(route, journey.departure_timestamp),
        })
    }

    /// `"<departing> to <destination>"`.
    pub fn route_label(&self) -> String {
        format!("{} to {}", self.departing_station, self.destination_station)
    }

    pub fn calling_points(&self, order: CallingOrder, empty: &str) -> String {
        format_calling_points(&self.calling_at, order, empty)
    }
}

/// Render station names as a calling list, or `empty` when there are none.
pub fn format_calling_points(names: &[String], order: CallingOrder, empty: &str) -> String {
    if names.is_empty() {
        return empty.to_string();
    }

    match order {
        CallingOrder::Route => names
            .iter()
            .enumerate()
            .map(|(index, name)| format!("{}. {name}", index + 1))
            .collect::<Vec<_>>()
            .join(" > "),
        CallingOrder::Alphabetical => {
            let mut sorted = names.to_vec();
            sorted.sort();
            match sorted.split_last() {
                Some((last, rest)) if !rest.is_empty() => {
                    format!("{} and {last}", rest.join(", "))
                }
                _ => sorted.join(""),
            }
        }
    }
}
