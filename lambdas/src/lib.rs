//! Shared plumbing of the ingestion fork and alias mapper functions

pub mod config;
pub mod stream_event;

use anyhow::Result;
use micromegas_telemetry_sink::{TelemetryGuard, TelemetryGuardBuilder};
use micromegas_tracing::prelude::*;

/// Local sink at debug level; a remote sink is added when `MICROMEGAS_TELEMETRY_URL` is set.
pub fn init_telemetry() -> Result<TelemetryGuard> {
    TelemetryGuardBuilder::default()
        .with_local_sink_max_level(LevelFilter::Debug)
        .with_interop_max_level_override(LevelFilter::Info)
        .build()
}
