use std::collections::HashSet;

use chrono::Utc;

use super::{is_between, is_valid_name, is_valid_price, Validator};
use crate::{
    manager::{BasicRouteManager, JourneyManager, StationManager},
    models::{BasicRoute, Journey, Station},
};

const NAME_MIN_LENGTH: usize = 3;
const NAME_MAX_LENGTH: usize = 20;

/// Name reserved by the presentation layer for its "other station" choice.
pub const RESERVED_STATION_NAME: &str = "Other";

/// Checks a destination station against the stations already loaded.
pub struct DestinationStationValidator<'a> {
    stations: &'a StationManager,
    messages: Vec<String>,
}

impl<'a> DestinationStationValidator<'a> {
    pub fn new(stations: &'a StationManager) -> Self {
        Self {
            stations,
            messages: Vec::new(),
        }
    }
}

impl Validator<Station> for DestinationStationValidator<'_> {
    fn validate(&mut self, station: &Station) -> bool {
        if self.stations.get_destination_station(&station.id).is_some() {
            self.messages
                .push("A Destination Station with that ID already exists!".to_string());
        }

        if !is_between(&station.name, NAME_MIN_LENGTH, NAME_MAX_LENGTH) {
            self.messages.push(
                "The Station Name must be between 3 and 20 characters in length!".to_string(),
            );
        }

        if !is_valid_name(&station.name) {
            self.messages.push(
                "The Station Name can only contain alpha characters, spaces and hyphens!"
                    .to_string(),
            );
        }

        if name_taken(self.stations.destination_stations(), &station.name) {
            self.messages.push(duplicate_name_message(&station.name));
        }

        self.messages.is_empty()
    }

    fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Checks an intermediate station against the stations already loaded.
pub struct IntermediateStationValidator<'a> {
    stations: &'a StationManager,
    messages: Vec<String>,
}

impl<'a> IntermediateStationValidator<'a> {
    pub fn new(stations: &'a StationManager) -> Self {
        Self {
            stations,
            messages: Vec::new(),
        }
    }
}

impl Validator<Station> for IntermediateStationValidator<'_> {
    fn validate(&mut self, station: &Station) -> bool {
        if self.stations.get_intermediate_station(&station.id).is_some() {
            self.messages
                .push("An Intermediate Station with that ID already exists!".to_string());
        }

        if !is_between(&station.name, NAME_MIN_LENGTH, NAME_MAX_LENGTH) {
            self.messages.push(
                "The Station Name must be between 3 and 20 characters in length!".to_string(),
            );
        }

        if equals_ignore_case(&station.name, RESERVED_STATION_NAME) {
            self.messages
                .push(format!("The Station Name cannot be called '{RESERVED_STATION_NAME}'"));
        }

        if !is_valid_name(&station.name) {
            self.messages.push(
                "The Station Name can only contain alphanumeric characters, spaces and hyphens!"
                    .to_string(),
            );
        }

        if name_taken(self.stations.intermediate_stations(), &station.name) {
            self.messages.push(duplicate_name_message(&station.name));
        }

        self.messages.is_empty()
    }

    fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Checks a basic route's references and amounts.
pub struct BasicRouteValidator<'a> {
    routes: &'a BasicRouteManager,
    stations: &'a StationManager,
    messages: Vec<String>,
}

impl<'a> BasicRouteValidator<'a> {
    pub fn new(routes: &'a BasicRouteManager, stations: &'a StationManager) -> Self {
        Self {
            routes,
            stations,
            messages: Vec::new(),
        }
    }
}

impl Validator<BasicRoute> for BasicRouteValidator<'_> {
    fn validate(&mut self, route: &BasicRoute) -> bool {
        if self.routes.get_basic_route(&route.id).is_some() {
            self.messages
                .push("A Basic Route with that ID already exists!".to_string());
        }

        if self
            .stations
            .get_destination_station(&route.departing_station_id)
            .is_none()
        {
            self.messages
                .push("The Departing Station does not exist!".to_string());
        }

        if self
            .stations
            .get_destination_station(&route.destination_station_id)
            .is_none()
        {
            self.messages
                .push("The Destination Station does not exist!".to_string());
        }

        if route.departing_station_id == route.destination_station_id {
            self.messages
                .push("The Departing Station and Destination cannot match!".to_string());
        }

        if !is_valid_price(route.single_price) {
            self.messages
                .push("The Single Price must be a valid chargeable amount!".to_string());
        }

        if !is_valid_price(route.return_price) {
            self.messages
                .push("The Return Price must be a valid chargeable amount!".to_string());
        }

        if route.duration_minutes < 0 {
            self.messages
                .push("The Duration cannot be negative!".to_string());
        }

        self.messages.is_empty()
    }

    fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Where the journey under validation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneyOrigin {
    /// Being created now; the departure must lie in the future.
    New,
    /// Already persisted; a past departure is acceptable.
    Stored,
}

/// Checks a journey's references, calling points and departure time.
pub struct JourneyValidator<'a> {
    journeys: &'a JourneyManager,
    routes: &'a BasicRouteManager,
    stations: &'a StationManager,
    origin: JourneyOrigin,
    now: i64,
    messages: Vec<String>,
}

impl<'a> JourneyValidator<'a> {
    pub fn new(
        journeys: &'a JourneyManager,
        routes: &'a BasicRouteManager,
        stations: &'a StationManager,
        origin: JourneyOrigin,
    ) -> Self {
        Self {
            journeys,
            routes,
            stations,
            origin,
            now: Utc::now().timestamp_millis(),
            messages: Vec::new(),
        }
    }

    /// Compare departures against `now` (milliseconds) instead of the clock.
    pub fn with_now(mut self, now: i64) -> Self {
        self.now = now;
        self
    }
}

impl Validator<Journey> for JourneyValidator<'_> {
    fn validate(&mut self, journey: &Journey) -> bool {
        if self.journeys.get_journey(&journey.id).is_some() {
            self.messages
                .push("A Journey with that ID already exists!".to_string());
        }

        if self.routes.get_basic_route(&journey.basic_route_id).is_none() {
            self.messages
                .push("The Basic Route with that ID doesn't exist!".to_string());
        }

        let mut seen = HashSet::new();
        for id in &journey.intermediate_station_ids {
            if !seen.insert(id.as_str()) {
                self.messages.push(format!(
                    "There is already an Intermediate Station with the ID '{id}' in your list of Intermediate Stations"
                ));
            } else if self.stations.get_intermediate_station(id).is_none() {
                self.messages.push(format!(
                    "The Intermediate Station with the ID '{id}' does not exist!"
                ));
            }
        }

        if self.origin == JourneyOrigin::New && journey.departure_timestamp <= self.now {
            self.messages
                .push("The Journey Date cannot be set in the past!".to_string());
        }

        self.messages.is_empty()
    }

    fn messages(&self) -> &[String] {
        &self.messages
    }
}

fn name_taken(stations: &[Station], name: &str) -> bool {
    stations
        .iter()
        .any(|station| equals_ignore_case(&station.name, name))
}

/// Case-insensitive equality, character by character: upper case forms first,
/// then the lower case of those, so `İ` matches `i`.
pub(crate) fn equals_ignore_case(left: &str, right: &str) -> bool {
    left.chars().count() == right.chars().count()
        && left.chars().zip(right.chars()).all(|(a, b)| {
            a == b || {
                let (upper_a, upper_b) = (simple_upper(a), simple_upper(b));
                upper_a == upper_b || simple_lower(upper_a) == simple_lower(upper_b)
            }
        })
}

fn simple_upper(ch: char) -> char {
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}

fn simple_lower(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

fn duplicate_name_message(name: &str) -> String {
    format!("The Station Name must be unique! A station called '{name}' already exists!")
}
