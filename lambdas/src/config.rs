//! Function configuration, read from the environment set up by the deployment

use clap::Parser;
use std::time::Duration;
use windfarm_routing::routing_policy::RoutingPolicy;

#[derive(Parser, Debug, Clone)]
#[command(name = "ingestion-fork", about = "Routes turbine telemetry to firehose and timestream")]
pub struct IngestionForkConfig {
    /// Bucket name or object store url holding mapping.json
    #[arg(long, env = "ASSET_MAP_BUCKET")]
    pub asset_map_bucket: String,

    #[arg(long, env = "FIREHOSE_DELIVERY_STREAM_NAME")]
    pub delivery_stream_name: String,

    #[arg(long, env = "TIMESTREAM_DATABASE_NAME")]
    pub timestream_database_name: String,

    #[arg(long, env = "TIMESTREAM_TABLE_NAME")]
    pub timestream_table_name: String,

    /// Comma-separated turbine metrics written to timestream
    #[arg(long, env = "TIME_SERIES_METRICS")]
    pub time_series_metrics: Option<String>,
}

impl IngestionForkConfig {
    pub fn routing_policy(&self) -> RoutingPolicy {
        match &self.time_series_metrics {
            Some(metric_list) => RoutingPolicy::from_metric_list(metric_list),
            None => RoutingPolicy::default(),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "alias-mapper", about = "Publishes the alias map of an asset model")]
pub struct AliasMapperConfig {
    #[arg(long, env = "ASSET_MODEL_ID")]
    pub asset_model_id: String,

    /// Bucket name or object store url receiving mapping.json
    #[arg(long, env = "S3_BUCKET_NAME")]
    pub asset_map_bucket: String,

    /// Spacing between two describe calls
    #[arg(long, env = "DESCRIBE_INTERVAL_MS", default_value_t = 50)]
    pub describe_interval_ms: u64,
}

impl AliasMapperConfig {
    pub fn describe_interval(&self) -> Duration {
        Duration::from_millis(self.describe_interval_ms)
    }

    pub fn physical_resource_id(&self) -> String {
        format!("{}AssetMap", self.asset_map_bucket)
    }
}
