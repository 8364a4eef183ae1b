//! windfarm-routing : resolves turbine telemetry to property aliases and forks it
//! between a buffered batch sink and a time-series sink

// crate-specific lint exceptions:
#![allow(clippy::missing_errors_doc)]

pub mod alias_map;
pub mod alias_map_builder;
pub mod alias_map_cache;
pub mod artifact_store;
pub mod asset_catalog;
pub mod dispatch_schedule;
pub mod provisioning;
pub mod record;
pub mod router;
pub mod routing_policy;
pub mod sinks;
pub mod sitewise_catalog;

/// Fixed key of the alias map artifact, relative to the artifact store root.
pub const ALIAS_MAP_KEY: &str = "mapping.json";
