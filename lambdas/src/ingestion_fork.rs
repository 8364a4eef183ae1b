//! Ingestion fork
//!
//! Consumes the data lake ingestion stream and forks each batch between the raw data
//! delivery stream and the aggregates table.
//!
//! Env variables:
//!  - `ASSET_MAP_BUCKET` : bucket holding mapping.json
//!  - `FIREHOSE_DELIVERY_STREAM_NAME` : destination of raw records
//!  - `TIMESTREAM_DATABASE_NAME`, `TIMESTREAM_TABLE_NAME` : destination of aggregates
//!  - `TIME_SERIES_METRICS` (optional) : comma-separated metrics sent to timestream

use anyhow::Result;
use clap::Parser;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use micromegas_tracing::prelude::*;
use std::sync::Arc;
use windfarm_lambdas::config::IngestionForkConfig;
use windfarm_lambdas::init_telemetry;
use windfarm_lambdas::stream_event::StreamEvent;
use windfarm_routing::alias_map_cache::AliasMapCache;
use windfarm_routing::artifact_store::ArtifactStore;
use windfarm_routing::router::TelemetryRouter;
use windfarm_routing::sinks::firehose::FirehoseBatchSink;
use windfarm_routing::sinks::time_series::TimeSeriesSink;
use windfarm_routing::sinks::timestream::TimestreamStore;

async fn make_router(config: &IngestionForkConfig) -> Result<TelemetryRouter> {
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let alias_maps = Arc::new(AliasMapCache::new(Arc::new(ArtifactStore::connect(
        &config.asset_map_bucket,
    )?)));
    alias_maps.warm_up().await;
    let batch_sink = Arc::new(FirehoseBatchSink::new(
        aws_sdk_firehose::Client::new(&sdk_config),
        config.delivery_stream_name.clone(),
    ));
    let time_series_store = TimestreamStore::connect(
        aws_sdk_timestreamwrite::Client::new(&sdk_config),
        config.timestream_database_name.clone(),
        config.timestream_table_name.clone(),
    )
    .await?;
    let policy = config.routing_policy();
    info!("time-series metrics: {:?}", policy.time_series_metrics());
    Ok(TelemetryRouter::new(
        alias_maps,
        policy,
        batch_sink,
        TimeSeriesSink::new(Arc::new(time_series_store)),
    ))
}

async fn handle_batch(
    router: &TelemetryRouter,
    event: LambdaEvent<StreamEvent>,
) -> Result<(), Error> {
    let payloads = event.payload.into_payloads();
    let summary = router.route_batch(&payloads).await.map_err(|e| {
        error!("routing batch request_id={}: {e:?}", event.context.request_id);
        e
    })?;
    info!(
        "routed batch received={} batch={} time_series={} dropped={}",
        summary.nb_received, summary.nb_batch, summary.nb_time_series, summary.nb_dropped
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _telemetry_guard = init_telemetry()?;
    let config = IngestionForkConfig::parse();
    let router = Arc::new(make_router(&config).await?);
    lambda_runtime::run(service_fn(|event: LambdaEvent<StreamEvent>| {
        let router = router.clone();
        async move { handle_batch(&router, event).await }
    }))
    .await
}
