#![allow(missing_docs)]

//! Shared domain models.

mod price;

pub use price::{ParsePriceError, Price};

use serde::{Deserialize, Serialize};

/// Milliseconds in one minute, used to turn route durations into timestamps.
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// Which of the two station collections a [`Station`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    /// Endpoint of a basic route; passengers board and alight here.
    Destination,
    /// Calling point between the two endpoints of a journey.
    Intermediate,
}

impl StationKind {
    /// Record tag used in the stations document.
    pub fn tag(self) -> &'static str {
        match self {
            StationKind::Destination => "destinationStation",
            StationKind::Intermediate => "intermediateStation",
        }
    }

    /// Tag of the block grouping all records of this kind.
    pub fn block_tag(self) -> &'static str {
        match self {
            StationKind::Destination => "destinationStations",
            StationKind::Intermediate => "intermediateStations",
        }
    }
}

/// A named station. The kind decides which manager collection owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// Opaque unique identifier (UUID for stations created at runtime).
    pub id: String,
    /// Display name, 3-20 letters, spaces, hyphens, apostrophes or periods.
    pub name: String,
    /// Destination or intermediate variant.
    pub kind: StationKind,
}

impl Station {
    /// Build a destination station.
    pub fn destination(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: StationKind::Destination,
        }
    }

    /// Build an intermediate station.
    pub fn intermediate(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: StationKind::Intermediate,
        }
    }
}

/// A priced, timed link between two destination stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicRoute {
    pub id: String,
    /// Id of the destination station the train leaves from.
    pub departing_station_id: String,
    /// Id of the destination station the train arrives at.
    pub destination_station_id: String,
    pub single_price: Price,
    pub return_price: Price,
    /// Travel time in whole minutes.
    pub duration_minutes: i64,
}

impl BasicRoute {
    /// Travel time in milliseconds.
    pub fn duration_millis(&self) -> i64 {
        self.duration_minutes.saturating_mul(MILLIS_PER_MINUTE)
    }
}

/// A scheduled departure over a basic route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journey {
    pub id: String,
    pub basic_route_id: String,
    /// Intermediate station ids in calling order. Order is significant.
    pub intermediate_station_ids: Vec<String>,
    /// Departure time in milliseconds since the Unix epoch.
    pub departure_timestamp: i64,
}

impl Journey {
    /// Arrival time when running over `route`.
    pub fn arrival_timestamp(&self, route: &BasicRoute) -> i64 {
        self.departure_timestamp
            .saturating_add(route.duration_millis())
    }
}
