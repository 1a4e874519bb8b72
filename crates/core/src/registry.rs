#![allow(missing_docs)]

//! Process-wide holder of the three managers plus load/save orchestration.

use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLockReadGuard;
use tracing::{info, warn};

use crate::{
    details::JourneyDetails,
    manager::{
        BasicRouteManager, JourneyManager, JourneySearch, SharedJourneyManager, StationManager,
    },
    models::{BasicRoute, Journey, Station, StationKind},
    storage::StorageError,
    validation::ValidationError,
};

/// Default file name of the stations document.
pub const STATIONS_FILE: &str = "stations.xml";
/// Default file name of the basic routes document.
pub const ROUTES_FILE: &str = "basic_routes.xml";
/// Default file name of the journeys document.
pub const JOURNEYS_FILE: &str = "journeys.xml";

/// Locations of the three data files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub stations: PathBuf,
    pub routes: PathBuf,
    pub journeys: PathBuf,
}

impl StoragePaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            stations: dir.join(STATIONS_FILE),
            routes: dir.join(ROUTES_FILE),
            journeys: dir.join(JOURNEYS_FILE),
        }
    }
}

/// Entity type of a record rejected during loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    DestinationStation,
    IntermediateStation,
    BasicRoute,
    Journey,
}

impl From<StationKind> for RecordKind {
    fn from(kind: StationKind) -> Self {
        match kind {
            StationKind::Destination => RecordKind::DestinationStation,
            StationKind::Intermediate => RecordKind::IntermediateStation,
        }
    }
}

/// A stored record skipped because it failed validation.
#[derive(Debug, Clone)]
pub struct RejectedRecord {
    pub kind: RecordKind,
    pub id: String,
    pub error: ValidationError,
}

/// Single owner of the station, route and journey managers.
///
/// Built once at startup and handed to whatever needs manager access.
pub struct Registry {
    paths: StoragePaths,
    stations: StationManager,
    routes: BasicRouteManager,
    journeys: SharedJourneyManager,
    rejected: Vec<RejectedRecord>,
}

impl Registry {
    /// Registry with empty managers bound to `paths`.
    pub fn new(paths: StoragePaths) -> Self {
        let journeys = JourneyManager::shared();
        Self {
            paths,
            stations: StationManager::new(journeys.clone()),
            routes: BasicRouteManager::new(),
            journeys,
            rejected: Vec::new(),
        }
    }

    /// Build a registry and populate it from `paths`.
    pub fn load(paths: StoragePaths) -> Result<Self, StorageError> {
        let mut registry = Self::new(paths);
        registry.reload()?;
        Ok(registry)
    }

    /// Discard every manager's state and read the three files again.
    ///
    /// Stations load first, then routes, then journeys. Records failing
    /// validation are skipped and listed in [`rejected`](Self::rejected). An
    /// I/O or parse failure stops the reload; managers already repopulated
    /// keep their new state.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        self.stations.clear();
        self.routes.clear();
        self.journeys.write().clear();
        self.rejected.clear();

        for station in StationManager::read_file(&self.paths.stations)? {
            let (kind, id) = (RecordKind::from(station.kind), station.id.clone());
            if let Err(error) = self.stations.admit(station) {
                self.reject(kind, id, error);
            }
        }

        for route in BasicRouteManager::read_file(&self.paths.routes)? {
            let id = route.id.clone();
            if let Err(error) = self.routes.admit(route, &self.stations) {
                self.reject(RecordKind::BasicRoute, id, error);
            }
        }

        for journey in JourneyManager::read_file(&self.paths.journeys)? {
            let id = journey.id.clone();
            let admitted = self
                .journeys
                .write()
                .admit(journey, &self.routes, &self.stations);
            if let Err(error) = admitted {
                self.reject(RecordKind::Journey, id, error);
            }
        }

        info!(
            destination_stations = self.stations.destination_stations().len(),
            intermediate_stations = self.stations.intermediate_stations().len(),
            basic_routes = self.routes.basic_routes().len(),
            journeys = self.journeys.read().journeys().len(),
            rejected = self.rejected.len(),
            "loaded data set"
        );
        Ok(())
    }

    fn reject(&mut self, kind: RecordKind, id: String, error: ValidationError) {
        warn!(?kind, %id, "{error}\n{}", error.details());
        self.rejected.push(RejectedRecord { kind, id, error });
    }

    /// Write every manager back to its own file.
    ///
    /// Each file is written independently; earlier writes are not rolled back
    /// when a later one fails.
    pub fn save(&self) -> Result<(), StorageError> {
        let results = [
            self.stations.save(&self.paths.stations),
            self.routes.save(&self.paths.routes),
            self.journeys.read().save(&self.paths.journeys),
        ];

        let failures: Vec<StorageError> = results
            .into_iter()
            .filter_map(Result::err)
            .inspect(|error| warn!("{error}"))
            .collect();
        if failures.is_empty() {
            info!(dir = ?self.paths.stations.parent(), "saved data set");
            Ok(())
        } else {
            Err(StorageError::Save(failures))
        }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Records skipped by the last load.
    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    pub fn stations(&self) -> &StationManager {
        &self.stations
    }

    pub fn stations_mut(&mut self) -> &mut StationManager {
        &mut self.stations
    }

    pub fn routes(&self) -> &BasicRouteManager {
        &self.routes
    }

    /// Read access to the journeys. Drop the guard before mutating.
    pub fn journeys(&self) -> RwLockReadGuard<'_, JourneyManager> {
        self.journeys.read()
    }

    pub fn create_intermediate_station(&mut self, name: &str) -> Result<Station, ValidationError> {
        self.stations.create_intermediate_station(name)
    }

    /// Delete an intermediate station and strip it from every journey.
    pub fn delete_intermediate_station(&mut self, id: &str) {
        self.stations.delete_intermediate_station(id);
    }

    pub fn create_journey(
        &mut self,
        basic_route_id: &str,
        intermediate_station_ids: &[String],
        timestamp: i64,
    ) -> Result<Journey, ValidationError> {
        self.create_journey_at(
            basic_route_id,
            intermediate_station_ids,
            timestamp,
            Utc::now().timestamp_millis(),
        )
    }

    pub fn create_journey_at(
        &mut self,
        basic_route_id: &str,
        intermediate_station_ids: &[String],
        timestamp: i64,
        now: i64,
    ) -> Result<Journey, ValidationError> {
        self.journeys.write().create_journey_at(
            &self.routes,
            &self.stations,
            basic_route_id,
            intermediate_station_ids,
            timestamp,
            now,
        )
    }

    pub fn delete_journey(&mut self, id: &str) {
        self.journeys.write().delete_journey(id);
    }

    /// Route between two destination stations given by name.
    pub fn find_basic_route(&self, departing: &str, destination: &str) -> Option<&BasicRoute> {
        self.routes
            .get_basic_route_by_names(&self.stations, departing, destination)
    }

    /// `"<departing> to <destination>"` for a route id.
    pub fn route_label(&self, basic_route_id: &str) -> Option<String> {
        self.routes.label(&self.stations, basic_route_id)
    }

    /// Journeys on a route, optionally filtered by time.
    pub fn search_journeys(
        &self,
        basic_route_id: &str,
        filter: Option<(i64, JourneySearch)>,
    ) -> Vec<Journey> {
        let journeys = self.journeys.read();
        let found = match filter {
            Some((timestamp, search)) => {
                journeys.search(&self.routes, basic_route_id, timestamp, search)
            }
            None => journeys.journeys_on_route(basic_route_id),
        };
        found.into_iter().cloned().collect()
    }

    /// Resolve a journey into names, times and fare.
    pub fn journey_details(&self, journey_id: &str) -> Option<JourneyDetails> {
        let journeys = self.journeys.read();
        let journey = journeys.get_journey(journey_id)?;
        JourneyDetails::resolve(journey, &self.stations, &self.routes)
    }

    #[cfg(test)]
    pub(crate) fn admit_route(&mut self, route: BasicRoute) -> Result<(), ValidationError> {
        self.routes.admit(route, &self.stations)
    }

    #[cfg(test)]
    pub(crate) fn admit_journey(&mut self, journey: Journey) -> Result<(), ValidationError> {
        self.journeys
            .write()
            .admit(journey, &self.routes, &self.stations)
    }
}
