use std::path::Path;

use super::StationManager;
use crate::{
    models::{BasicRoute, Price},
    storage::{self, StorageError, XmlElement},
    validation::{BasicRouteValidator, Validatable, ValidationError},
};

/// Owns the basic routes. Populated by loading only; there is no runtime
/// create or delete path for routes.
#[derive(Debug, Default)]
pub struct BasicRouteManager {
    basic_routes: Vec<BasicRoute>,
}

impl BasicRouteManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn basic_routes(&self) -> &[BasicRoute] {
        &self.basic_routes
    }

    pub fn get_basic_route(&self, id: &str) -> Option<&BasicRoute> {
        self.basic_routes.iter().find(|route| route.id == id)
    }

    /// Route between the destination stations called `departing` and
    /// `destination`, or `None` when either name or the route is unknown.
    pub fn get_basic_route_by_names(
        &self,
        stations: &StationManager,
        departing: &str,
        destination: &str,
    ) -> Option<&BasicRoute> {
        let departing_id = &stations.destination_station_by_name(departing)?.id;
        let destination_id = &stations.destination_station_by_name(destination)?.id;

        self.basic_routes.iter().find(|route| {
            &route.departing_station_id == departing_id
                && &route.destination_station_id == destination_id
        })
    }

    /// `"<departing> to <destination>"` for the route `id`.
    pub fn label(&self, stations: &StationManager, id: &str) -> Option<String> {
        let route = self.get_basic_route(id)?;
        let departing = stations.get_destination_station(&route.departing_station_id)?;
        let destination = stations.get_destination_station(&route.destination_station_id)?;
        Some(format!("{} to {}", departing.name, destination.name))
    }

    /// Validate a loaded route against the loaded stations and store it.
    pub fn admit(
        &mut self,
        route: BasicRoute,
        stations: &StationManager,
    ) -> Result<(), ValidationError> {
        route.validate(BasicRouteValidator::new(self, stations))?;
        self.basic_routes.push(route);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.basic_routes.clear();
    }

    /// Read every `basicRoute` record from the routes document.
    pub fn read_file(path: &Path) -> Result<Vec<BasicRoute>, StorageError> {
        let source = storage::read_source(path)?;
        let document = storage::parse(path, &source)?;

        storage::records(path, &document, "basicRoute")
            .map(|record| {
                Ok::<_, StorageError>(BasicRoute {
                    id: record.id()?,
                    departing_station_id: record.field("departingStationId")?,
                    destination_station_id: record.field("destinationStationId")?,
                    single_price: record.parse_field::<Price>("singlePrice")?,
                    return_price: record.parse_field::<Price>("returnPrice")?,
                    duration_minutes: record.parse_field("duration")?,
                })
            })
            .collect()
    }

    pub fn to_document(&self) -> XmlElement {
        self.basic_routes
            .iter()
            .fold(XmlElement::new("basicRoutes"), |root, route| {
                root.with_child(
                    XmlElement::new("basicRoute")
                        .with_attribute("id", route.id.as_str())
                        .with_child(XmlElement::field(
                            "departingStationId",
                            route.departing_station_id.as_str(),
                        ))
                        .with_child(XmlElement::field(
                            "destinationStationId",
                            route.destination_station_id.as_str(),
                        ))
                        .with_child(XmlElement::field("singlePrice", route.single_price.to_string()))
                        .with_child(XmlElement::field("returnPrice", route.return_price.to_string()))
                        .with_child(XmlElement::field(
                            "duration",
                            route.duration_minutes.to_string(),
                        )),
                )
            })
    }

    /// Overwrite `path` with every route.
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        storage::write_document(path, &self.to_document())
    }
}
