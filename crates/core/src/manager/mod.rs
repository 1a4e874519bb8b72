#![allow(missing_docs)]

//! Per-entity managers owning the in-memory collections.

mod journeys;
mod routes;
mod stations;

pub use journeys::{JourneyManager, JourneySearch, SharedJourneyManager};
pub use routes::BasicRouteManager;
pub use stations::StationManager;

use uuid::Uuid;

/// Fresh opaque identifier for an entity created at runtime.
pub(crate) fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
