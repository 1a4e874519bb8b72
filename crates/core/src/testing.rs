//! Shared fixtures for unit tests.

use chrono::Utc;

use crate::{
    models::{BasicRoute, Journey, Price, Station},
    registry::{Registry, StoragePaths},
    validation::ValidationError,
};

pub const ROUTE_ID: &str = "route-leicester-london";
pub const RETURN_ROUTE_ID: &str = "route-london-leicester";
pub const LEICESTER_ID: &str = "station-leicester";
pub const LONDON_ID: &str = "station-london";

pub fn now() -> i64 {
    Utc::now().timestamp_millis()
}

/// Route priced 25.00 single, 40.00 return, taking 90 minutes.
pub fn route(id: &str, departing: &str, destination: &str) -> BasicRoute {
    BasicRoute {
        id: id.to_string(),
        departing_station_id: departing.to_string(),
        destination_station_id: destination.to_string(),
        single_price: Price::from_minor(2500),
        return_price: Price::from_minor(4000),
        duration_minutes: 90,
    }
}

pub fn journey(id: &str, basic_route_id: &str, calling_at: &[&str], departure: i64) -> Journey {
    Journey {
        id: id.to_string(),
        basic_route_id: basic_route_id.to_string(),
        intermediate_station_ids: calling_at.iter().map(|id| id.to_string()).collect(),
        departure_timestamp: departure,
    }
}

/// Registry (never saved) holding Leicester and London with a route each way.
pub fn registry() -> Registry {
    let mut registry = Registry::new(StoragePaths::in_dir("unused"));
    let stations = registry.stations_mut();
    stations
        .admit(Station::destination(LEICESTER_ID, "Leicester"))
        .expect("Leicester is valid");
    stations
        .admit(Station::destination(LONDON_ID, "London"))
        .expect("London is valid");
    registry
        .admit_route(route(ROUTE_ID, LEICESTER_ID, LONDON_ID))
        .expect("outbound route is valid");
    registry
        .admit_route(route(RETURN_ROUTE_ID, LONDON_ID, LEICESTER_ID))
        .expect("return route is valid");
    registry
}

/// Create Loughborough and Bedford, returning their ids in that order.
pub fn add_calling_points(registry: &mut Registry) -> Result<(String, String), ValidationError> {
    let loughborough = registry.create_intermediate_station("Loughborough")?;
    let bedford = registry.create_intermediate_station("Bedford")?;
    Ok((loughborough.id, bedford.id))
}
