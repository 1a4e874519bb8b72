use std::{path::Path, sync::Arc};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use super::{generate_id, BasicRouteManager, StationManager};
use crate::{
    models::Journey,
    storage::{self, StorageError, XmlElement},
    validation::{JourneyOrigin, JourneyValidator, Validatable, ValidationError},
};

/// Journey manager shared with the station manager for cascading deletes.
pub type SharedJourneyManager = Arc<RwLock<JourneyManager>>;

/// Time-based filter applied by [`JourneyManager::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneySearch {
    /// Departing strictly after the requested time.
    LeavingAfter,
    /// Arriving no later than the requested time, skipping departures
    /// already in the past.
    ArrivingBy,
}

impl From<bool> for JourneySearch {
    fn from(is_leaving_after: bool) -> Self {
        if is_leaving_after {
            JourneySearch::LeavingAfter
        } else {
            JourneySearch::ArrivingBy
        }
    }
}

/// Owns the scheduled journeys in insertion order.
#[derive(Debug, Default)]
pub struct JourneyManager {
    journeys: Vec<Journey>,
}

impl JourneyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty manager behind a shared lock.
    pub fn shared() -> SharedJourneyManager {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn journeys(&self) -> &[Journey] {
        &self.journeys
    }

    /// Journeys running over `basic_route_id`.
    pub fn journeys_on_route(&self, basic_route_id: &str) -> Vec<&Journey> {
        self.journeys
            .iter()
            .filter(|journey| journey.basic_route_id == basic_route_id)
            .collect()
    }

    /// Journeys on `basic_route_id` matching `search` relative to `timestamp`.
    pub fn search(
        &self,
        routes: &BasicRouteManager,
        basic_route_id: &str,
        timestamp: i64,
        search: JourneySearch,
    ) -> Vec<&Journey> {
        self.search_at(
            routes,
            basic_route_id,
            timestamp,
            search,
            Utc::now().timestamp_millis(),
        )
    }

    /// [`search`](Self::search) with an explicit notion of "now".
    ///
    /// Leaving-after has no past-departure guard; arriving-by does.
    pub fn search_at(
        &self,
        routes: &BasicRouteManager,
        basic_route_id: &str,
        timestamp: i64,
        search: JourneySearch,
        now: i64,
    ) -> Vec<&Journey> {
        let candidates = self.journeys_on_route(basic_route_id);
        match search {
            JourneySearch::LeavingAfter => candidates
                .into_iter()
                .filter(|journey| journey.departure_timestamp > timestamp)
                .collect(),
            JourneySearch::ArrivingBy => {
                let Some(route) = routes.get_basic_route(basic_route_id) else {
                    return Vec::new();
                };
                candidates
                    .into_iter()
                    .filter(|journey| {
                        journey.departure_timestamp > now
                            && journey.arrival_timestamp(route) <= timestamp
                    })
                    .collect()
            }
        }
    }

    pub fn get_journey(&self, id: &str) -> Option<&Journey> {
        self.journeys.iter().find(|journey| journey.id == id)
    }

    /// Validate and append a new journey departing at `timestamp`.
    ///
    /// The departure must lie in the future. Nothing is stored on failure.
    pub fn create_journey(
        &mut self,
        routes: &BasicRouteManager,
        stations: &StationManager,
        basic_route_id: &str,
        intermediate_station_ids: &[String],
        timestamp: i64,
    ) -> Result<Journey, ValidationError> {
        self.create_journey_at(
            routes,
            stations,
            basic_route_id,
            intermediate_station_ids,
            timestamp,
            Utc::now().timestamp_millis(),
        )
    }

    /// [`create_journey`](Self::create_journey) judged against `now`.
    pub fn create_journey_at(
        &mut self,
        routes: &BasicRouteManager,
        stations: &StationManager,
        basic_route_id: &str,
        intermediate_station_ids: &[String],
        timestamp: i64,
        now: i64,
    ) -> Result<Journey, ValidationError> {
        let journey = Journey {
            id: generate_id(),
            basic_route_id: basic_route_id.to_string(),
            intermediate_station_ids: intermediate_station_ids.to_vec(),
            departure_timestamp: timestamp,
        };
        journey.validate(
            JourneyValidator::new(self, routes, stations, JourneyOrigin::New).with_now(now),
        )?;

        debug!(id = %journey.id, route = %journey.basic_route_id, "created journey");
        self.journeys.push(journey.clone());
        Ok(journey)
    }

    /// Remove the journey `id`; missing ids are ignored.
    pub fn delete_journey(&mut self, id: &str) {
        if let Some(index) = self.journeys.iter().position(|journey| journey.id == id) {
            self.journeys.remove(index);
            debug!(id, "deleted journey");
        }
    }

    /// Drop the first occurrence of `intermediate_station_id` from every
    /// journey calling at it.
    pub fn remove_intermediate_station_id_from_journeys(&mut self, intermediate_station_id: &str) {
        for journey in &mut self.journeys {
            if let Some(index) = journey
                .intermediate_station_ids
                .iter()
                .position(|id| id == intermediate_station_id)
            {
                journey.intermediate_station_ids.remove(index);
                debug!(
                    journey = %journey.id,
                    station = intermediate_station_id,
                    "removed calling point"
                );
            }
        }
    }

    /// Validate a stored journey (past departures allowed) and append it.
    pub fn admit(
        &mut self,
        journey: Journey,
        routes: &BasicRouteManager,
        stations: &StationManager,
    ) -> Result<(), ValidationError> {
        journey.validate(JourneyValidator::new(
            self,
            routes,
            stations,
            JourneyOrigin::Stored,
        ))?;
        self.journeys.push(journey);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.journeys.clear();
    }

    /// Read every `journey` record from the journeys document.
    pub fn read_file(path: &Path) -> Result<Vec<Journey>, StorageError> {
        let source = storage::read_source(path)?;
        let document = storage::parse(path, &source)?;

        storage::records(path, &document, "journey")
            .map(|record| {
                Ok::<_, StorageError>(Journey {
                    id: record.id()?,
                    basic_route_id: record.field("basicRouteId")?,
                    intermediate_station_ids: record.list("intermediateStationId"),
                    departure_timestamp: record.parse_field("timestamp")?,
                })
            })
            .collect()
    }

    pub fn to_document(&self) -> XmlElement {
        let mut root = XmlElement::new("journeys");
        for journey in &self.journeys {
            let calling_points = journey.intermediate_station_ids.iter().fold(
                XmlElement::new("intermediateStationIds"),
                |block, id| block.with_child(XmlElement::field("intermediateStationId", id.as_str())),
            );
            root.push(
                XmlElement::new("journey")
                    .with_attribute("id", journey.id.as_str())
                    .with_child(XmlElement::field("basicRouteId", journey.basic_route_id.as_str()))
                    .with_child(calling_points)
                    .with_child(XmlElement::field(
                        "timestamp",
                        journey.departure_timestamp.to_string(),
                    )),
            );
        }
        root
    }

    /// Overwrite `path` with every journey.
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        storage::write_document(path, &self.to_document())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, ROUTE_ID};
    use anyhow::Result;
    use tempfile::tempdir;

    const HOUR: i64 = 3_600_000;

    #[test]
    fn scenario_create_with_ordered_calling_points() -> Result<()> {
        let mut registry = testing::registry();
        let (a, b) = testing::add_calling_points(&mut registry)?;
        let mut input = vec![b.clone(), a.clone()];
        let now = testing::now();

        let created = registry.create_journey_at(ROUTE_ID, &input, now + HOUR, now)?;
        input.clear();

        let journeys = registry.journeys();
        let stored = journeys.get_journey(&created.id).expect("journey stored");
        assert_eq!(stored.intermediate_station_ids, vec![b, a]);
        assert_eq!(stored.departure_timestamp, now + HOUR);
        Ok(())
    }

    #[test]
    fn scenario_past_departure_is_rejected() -> Result<()> {
        let mut registry = testing::registry();
        let (a, b) = testing::add_calling_points(&mut registry)?;
        let now = testing::now();

        for departure in [now, now - HOUR] {
            let error = registry
                .create_journey_at(ROUTE_ID, &[a.clone(), b.clone()], departure, now)
                .expect_err("past departure must fail");
            assert_eq!(error.messages(), ["The Journey Date cannot be set in the past!"]);
        }
        assert!(registry.journeys().journeys().is_empty());
        Ok(())
    }

    #[test]
    fn scenario_duplicate_calling_point_reports_alongside_other_checks() -> Result<()> {
        let mut registry = testing::registry();
        let (a, _) = testing::add_calling_points(&mut registry)?;
        let now = testing::now();

        let error = registry
            .create_journey_at("no-such-route", &[a.clone(), a.clone(), "ghost".to_string()], now - 1, now)
            .expect_err("invalid journey must fail");
        assert_eq!(
            error.title(),
            "A ValidationException occurred when validating a Journey!"
        );
        assert_eq!(
            error.messages(),
            [
                "The Basic Route with that ID doesn't exist!".to_string(),
                format!("There is already an Intermediate Station with the ID '{a}' in your list of Intermediate Stations"),
                "The Intermediate Station with the ID 'ghost' does not exist!".to_string(),
                "The Journey Date cannot be set in the past!".to_string(),
            ]
        );
        assert!(registry.journeys().journeys().is_empty());
        Ok(())
    }

    #[test]
    fn stored_journeys_may_depart_in_the_past_but_ids_stay_unique() -> Result<()> {
        let mut registry = testing::registry();
        let past = testing::journey("j1", ROUTE_ID, &[], testing::now() - HOUR);
        registry.admit_journey(past.clone())?;

        let error = registry.admit_journey(past).expect_err("duplicate id must fail");
        assert_eq!(error.messages(), ["A Journey with that ID already exists!"]);
        assert_eq!(registry.journeys().journeys().len(), 1);
        Ok(())
    }

    #[test]
    fn leaving_after_is_strict_and_ignores_now() -> Result<()> {
        let mut registry = testing::registry();
        let now = testing::now();
        for (id, departure) in [("past", now - 2 * HOUR), ("edge", now), ("later", now + HOUR)] {
            registry.admit_journey(testing::journey(id, ROUTE_ID, &[], departure))?;
        }
        registry.admit_journey(testing::journey("other", testing::RETURN_ROUTE_ID, &[], now + HOUR))?;

        let journeys = registry.journeys();
        let found: Vec<_> = journeys
            .search_at(registry.routes(), ROUTE_ID, now - 3 * HOUR, JourneySearch::LeavingAfter, now)
            .into_iter()
            .map(|j| j.id.as_str())
            .collect();
        assert_eq!(found, ["past", "edge", "later"]);

        let found: Vec<_> = journeys
            .search_at(registry.routes(), ROUTE_ID, now, JourneySearch::LeavingAfter, now)
            .into_iter()
            .map(|j| j.id.as_str())
            .collect();
        assert_eq!(found, ["later"]);
        Ok(())
    }

    #[test]
    fn arriving_by_skips_past_departures_and_late_arrivals() -> Result<()> {
        // Route duration is 90 minutes.
        let mut registry = testing::registry();
        let now = testing::now();
        let target = now + 4 * HOUR;
        let cases = [
            ("gone", now - HOUR),
            ("now", now),
            ("fits", now + HOUR),
            ("exact", target - 90 * 60_000),
            ("late", target - 89 * 60_000),
        ];
        for (id, departure) in cases {
            registry.admit_journey(testing::journey(id, ROUTE_ID, &[], departure))?;
        }

        let journeys = registry.journeys();
        let found: Vec<_> = journeys
            .search_at(registry.routes(), ROUTE_ID, target, JourneySearch::ArrivingBy, now)
            .into_iter()
            .map(|j| j.id.as_str())
            .collect();
        assert_eq!(found, ["fits", "exact"]);
        assert!(journeys
            .search_at(registry.routes(), "missing", target, JourneySearch::ArrivingBy, now)
            .is_empty());
        Ok(())
    }

    #[test]
    fn search_mode_from_flag() {
        assert_eq!(JourneySearch::from(true), JourneySearch::LeavingAfter);
        assert_eq!(JourneySearch::from(false), JourneySearch::ArrivingBy);
    }

    #[test]
    fn removing_calling_point_leaves_other_journeys_alone() {
        let mut manager = JourneyManager::new();
        manager.journeys = vec![
            testing::journey("j1", ROUTE_ID, &["A", "B", "C"], 0),
            testing::journey("j2", ROUTE_ID, &["C"], 0),
        ];

        manager.remove_intermediate_station_id_from_journeys("B");
        manager.remove_intermediate_station_id_from_journeys("missing");

        assert_eq!(manager.journeys[0].intermediate_station_ids, ["A", "C"]);
        assert_eq!(manager.journeys[1].intermediate_station_ids, ["C"]);
    }

    #[test]
    fn delete_removes_only_the_match() {
        let mut manager = JourneyManager::new();
        manager.journeys = vec![
            testing::journey("j1", ROUTE_ID, &[], 0),
            testing::journey("j2", ROUTE_ID, &[], 0),
        ];
        manager.delete_journey("j1");
        manager.delete_journey("j1");
        assert_eq!(manager.journeys.len(), 1);
        assert_eq!(manager.journeys[0].id, "j2");
    }

    #[test]
    fn save_preserves_calling_order_and_raw_timestamp() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("journeys.xml");
        let mut manager = JourneyManager::new();
        manager.journeys = vec![
            testing::journey("j1", ROUTE_ID, &["Z", "A", "M"], 1_893_456_000_000),
            testing::journey("j2", ROUTE_ID, &[], 1_893_456_600_000),
        ];
        manager.save(&path)?;

        let contents = std::fs::read_to_string(&path)?;
        assert!(contents.contains("<timestamp>1893456000000</timestamp>"));
        assert_eq!(JourneyManager::read_file(&path)?, manager.journeys);
        Ok(())
    }
}
