#![warn(clippy::all, missing_docs)]

//! Core domain logic for the train route finder.
//!
//! This crate hosts the station, route and journey models, their validation
//! rules, the managers owning each collection, XML persistence, and the
//! registry tying the managers together for the command line front end.

pub mod config;
pub mod details;
pub mod fare;
pub mod manager;
pub mod models;
pub mod registry;
pub mod storage;
pub mod validation;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use details::{CallingOrder, JourneyDetails};
pub use fare::Fare;
pub use manager::{BasicRouteManager, JourneyManager, JourneySearch, StationManager};
pub use models::{BasicRoute, Journey, Price, Station, StationKind};
pub use registry::{RecordKind, RejectedRecord, Registry, StoragePaths};
pub use storage::StorageError;
pub use validation::{ValidationError, Validatable, Validator};
