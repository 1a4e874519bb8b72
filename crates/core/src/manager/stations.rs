use std::path::Path;

use tracing::debug;

use super::{generate_id, SharedJourneyManager};
use crate::{
    models::{Station, StationKind},
    storage::{self, StorageError, XmlElement},
    validation::{
        DestinationStationValidator, IntermediateStationValidator, Validatable, ValidationError,
    },
};

/// Owns both station collections.
///
/// Destination stations only arrive through loading. Intermediate stations can
/// be created and deleted at runtime; deleting one strips it from every
/// journey through the shared journey manager handed over at construction.
pub struct StationManager {
    destination_stations: Vec<Station>,
    intermediate_stations: Vec<Station>,
    journeys: SharedJourneyManager,
}

impl StationManager {
    /// Empty manager that cascades intermediate deletions into `journeys`.
    pub fn new(journeys: SharedJourneyManager) -> Self {
        Self {
            destination_stations: Vec::new(),
            intermediate_stations: Vec::new(),
            journeys,
        }
    }

    pub fn destination_stations(&self) -> &[Station] {
        &self.destination_stations
    }

    pub fn intermediate_stations(&self) -> &[Station] {
        &self.intermediate_stations
    }

    pub fn get_destination_station(&self, id: &str) -> Option<&Station> {
        self.destination_stations
            .iter()
            .find(|station| station.id == id)
    }

    /// Destination station whose name matches `name` exactly.
    pub fn destination_station_by_name(&self, name: &str) -> Option<&Station> {
        self.destination_stations
            .iter()
            .find(|station| station.name == name)
    }

    pub fn get_intermediate_station(&self, id: &str) -> Option<&Station> {
        self.intermediate_stations
            .iter()
            .find(|station| station.id == id)
    }

    /// Validate and append a new intermediate station named `name`.
    ///
    /// Nothing is stored when validation fails.
    pub fn create_intermediate_station(&mut self, name: &str) -> Result<Station, ValidationError> {
        let station = Station::intermediate(generate_id(), name);
        station.validate(IntermediateStationValidator::new(self))?;

        debug!(id = %station.id, name = %station.name, "created intermediate station");
        self.intermediate_stations.push(station.clone());
        Ok(station)
    }

    /// Remove the intermediate station `id` and drop it from every journey.
    ///
    /// Missing ids are ignored. Must not be called while the shared journey
    /// manager is locked by the caller.
    pub fn delete_intermediate_station(&mut self, id: &str) {
        if let Some(index) = self
            .intermediate_stations
            .iter()
            .position(|station| station.id == id)
        {
            let removed = self.intermediate_stations.remove(index);
            debug!(id = %removed.id, name = %removed.name, "deleted intermediate station");
        }

        self.journeys.write().remove_intermediate_station_id_from_journeys(id);
    }

    /// Validate a loaded station against the current collections and store it.
    pub fn admit(&mut self, station: Station) -> Result<(), ValidationError> {
        match station.kind {
            StationKind::Destination => {
                station.validate(DestinationStationValidator::new(self))?;
                self.destination_stations.push(station);
            }
            StationKind::Intermediate => {
                station.validate(IntermediateStationValidator::new(self))?;
                self.intermediate_stations.push(station);
            }
        }
        Ok(())
    }

    /// Drop both collections.
    pub fn clear(&mut self) {
        self.destination_stations.clear();
        self.intermediate_stations.clear();
    }

    /// Read every station record from the stations document, destination
    /// stations first.
    pub fn read_file(path: &Path) -> Result<Vec<Station>, StorageError> {
        let source = storage::read_source(path)?;
        let document = storage::parse(path, &source)?;

        let mut stations = Vec::new();
        for kind in [StationKind::Destination, StationKind::Intermediate] {
            for record in storage::records(path, &document, kind.tag()) {
                stations.push(Station {
                    id: record.id()?,
                    name: record.field("name")?,
                    kind,
                });
            }
        }
        Ok(stations)
    }

    /// Intermediate stations block followed by the destination stations block.
    pub fn to_document(&self) -> XmlElement {
        let block = |kind: StationKind, stations: &[Station]| {
            stations.iter().fold(XmlElement::new(kind.block_tag()), |element, station| {
                element.with_child(
                    XmlElement::new(kind.tag())
                        .with_attribute("id", station.id.as_str())
                        .with_child(XmlElement::field("name", station.name.as_str())),
                )
            })
        };

        XmlElement::new("stations")
            .with_child(block(StationKind::Intermediate, &self.intermediate_stations))
            .with_child(block(StationKind::Destination, &self.destination_stations))
    }

    /// Overwrite `path` with every station.
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        storage::write_document(path, &self.to_document())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{manager::JourneyManager, testing};
    use anyhow::Result;
    use tempfile::tempdir;

    fn manager() -> StationManager {
        StationManager::new(JourneyManager::shared())
    }

    #[test]
    fn creates_intermediate_station_with_fresh_id() -> Result<()> {
        let mut stations = manager();
        let created = stations.create_intermediate_station("Loughborough")?;
        assert!(!created.id.is_empty());
        assert_eq!(created.kind, StationKind::Intermediate);
        assert_eq!(stations.get_intermediate_station(&created.id), Some(&created));

        let other = stations.create_intermediate_station("Market Harborough")?;
        assert_ne!(created.id, other.id);
        Ok(())
    }

    #[test]
    fn reserved_name_is_rejected_in_any_case() {
        let mut stations = manager();
        for name in ["Other", "OTHER", "other"] {
            let error = stations
                .create_intermediate_station(name)
                .expect_err("reserved name must fail");
            assert_eq!(error.messages(), ["The Station Name cannot be called 'Other'"]);
        }
        assert!(stations.intermediate_stations().is_empty());
    }

    #[test]
    fn names_are_unique_ignoring_case() -> Result<()> {
        let mut stations = manager();
        stations.create_intermediate_station("Kettering")?;
        let error = stations
            .create_intermediate_station("KETTERING")
            .expect_err("duplicate name must fail");
        assert_eq!(
            error.messages(),
            ["The Station Name must be unique! A station called 'KETTERING' already exists!"]
        );
        assert_eq!(stations.intermediate_stations().len(), 1);
        Ok(())
    }

    #[test]
    fn reports_every_violation_in_order() {
        let mut stations = manager();
        let error = stations
            .create_intermediate_station("9")
            .expect_err("invalid name must fail");
        assert_eq!(
            error.title(),
            "A ValidationException occurred when validating an Intermediate Station!"
        );
        assert_eq!(
            error.messages(),
            [
                "The Station Name must be between 3 and 20 characters in length!",
                "The Station Name can only contain alphanumeric characters, spaces and hyphens!",
            ]
        );
    }

    #[test]
    fn destination_checks_run_in_order() -> Result<()> {
        let mut stations = manager();
        stations.admit(Station::destination("d1", "Leicester"))?;

        let error = stations
            .admit(Station::destination("d1", "leicester"))
            .expect_err("duplicate id and name must fail");
        assert_eq!(
            error.messages(),
            [
                "A Destination Station with that ID already exists!",
                "The Station Name must be unique! A station called 'leicester' already exists!",
            ]
        );

        // Variants keep separate namespaces.
        stations.admit(Station::intermediate("d1", "Leicester"))?;
        assert_eq!(stations.destination_stations().len(), 1);
        assert_eq!(stations.intermediate_stations().len(), 1);
        Ok(())
    }

    #[test]
    fn deleting_cascades_into_journeys() -> Result<()> {
        let mut registry = testing::registry();
        let (a, b) = testing::add_calling_points(&mut registry)?;
        let future = testing::now() + 86_400_000;
        let both = registry.create_journey(testing::ROUTE_ID, &[a.clone(), b.clone()], future)?;
        let only_b = registry.create_journey(testing::ROUTE_ID, &[b.clone()], future)?;

        registry.stations_mut().delete_intermediate_station(&a);

        assert!(registry.stations().get_intermediate_station(&a).is_none());
        let journeys = registry.journeys();
        assert_eq!(
            journeys.get_journey(&both.id).map(|j| j.intermediate_station_ids.clone()),
            Some(vec![b.clone()])
        );
        assert_eq!(journeys.get_journey(&only_b.id), Some(&only_b));
        Ok(())
    }

    #[test]
    fn deleting_unknown_station_is_a_no_op() -> Result<()> {
        let mut stations = manager();
        stations.create_intermediate_station("Wigston")?;
        stations.delete_intermediate_station("missing");
        assert_eq!(stations.intermediate_stations().len(), 1);
        Ok(())
    }

    #[test]
    fn save_and_read_back() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("stations.xml");
        let mut stations = manager();
        stations.admit(Station::destination("d1", "Leicester"))?;
        stations.admit(Station::destination("d2", "London"))?;
        stations.admit(Station::intermediate("i1", "King's Lynn"))?;
        stations.save(&path)?;

        let contents = std::fs::read_to_string(&path)?;
        let intermediate_at = contents.find("<intermediateStations>").unwrap_or(usize::MAX);
        let destination_at = contents.find("<destinationStations>").unwrap_or(0);
        assert!(intermediate_at < destination_at);

        let loaded = StationManager::read_file(&path)?;
        assert_eq!(
            loaded,
            vec![
                Station::destination("d1", "Leicester"),
                Station::destination("d2", "London"),
                Station::intermediate("i1", "King's Lynn"),
            ]
        );
        Ok(())
    }
}
