//! Alias Map Admin CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use micromegas_telemetry_sink::TelemetryGuardBuilder;
use micromegas_tracing::levels::LevelFilter;
use micromegas_tracing::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use windfarm_routing::alias_map_builder::AliasMapBuilder;
use windfarm_routing::artifact_store::ArtifactStore;
use windfarm_routing::dispatch_schedule::FixedIntervalSchedule;
use windfarm_routing::routing_policy::RoutingPolicy;
use windfarm_routing::sitewise_catalog::SiteWiseCatalog;

#[derive(Parser, Debug)]
#[clap(name = "Alias Map Admin")]
#[clap(about = "CLI to build and inspect the turbine alias map", version, author)]
#[clap(arg_required_else_help(true))]
struct Cli {
    /// Bucket name or object store url holding mapping.json
    #[clap(long, env = "ASSET_MAP_BUCKET")]
    bucket: Option<String>,

    /// Comma-separated turbine metrics written to timestream
    #[clap(long, env = "TIME_SERIES_METRICS")]
    time_series_metrics: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enumerate the assets of a model and publish their alias map
    #[clap(name = "build")]
    Build {
        asset_model_id: String,
        #[clap(long, default_value_t = 50)]
        describe_interval_ms: u64,
    },

    /// Print the published alias map and the number of aliases of each asset
    #[clap(name = "show")]
    Show,

    /// Print the alias of a property and its destination
    #[clap(name = "resolve")]
    Resolve {
        asset_id: String,
        property_id: String,
    },

    /// Print the destination of an alias
    #[clap(name = "classify")]
    Classify { alias: String },
}

fn routing_policy(time_series_metrics: Option<&str>) -> RoutingPolicy {
    match time_series_metrics {
        Some(metric_list) => RoutingPolicy::from_metric_list(metric_list),
        None => RoutingPolicy::default(),
    }
}

fn connect_store(bucket: Option<&str>) -> Result<ArtifactStore> {
    let bucket = bucket.with_context(|| "missing --bucket or ASSET_MAP_BUCKET")?;
    ArtifactStore::connect(bucket)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry_guard = TelemetryGuardBuilder::default()
        .with_ctrlc_handling()
        .with_local_sink_max_level(LevelFilter::Info)
        .build();

    let args = Cli::parse();
    match args.command {
        Commands::Build {
            asset_model_id,
            describe_interval_ms,
        } => {
            let store = connect_store(args.bucket.as_deref())?;
            let sdk_config =
                aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let builder = AliasMapBuilder::new(
                Arc::new(SiteWiseCatalog::new(aws_sdk_iotsitewise::Client::new(
                    &sdk_config,
                ))),
                Arc::new(FixedIntervalSchedule::new(Duration::from_millis(
                    describe_interval_ms,
                ))),
            );
            let map = builder.build_and_publish(&asset_model_id, &store).await?;
            info!(
                "published {} aliases of {} assets to {}",
                map.nb_entries(),
                map.nb_assets(),
                store.artifact_url()
            );
        }
        Commands::Show => {
            let store = connect_store(args.bucket.as_deref())?;
            let map = store.read_alias_map().await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&map).with_context(|| "formatting alias map")?
            );
            for asset_id in map.asset_ids() {
                let nb_aliases = map.properties(asset_id).map_or(0, |properties| properties.len());
                println!("{asset_id}: {nb_aliases} aliases");
            }
            println!("{} assets, {} aliases", map.nb_assets(), map.nb_entries());
        }
        Commands::Resolve {
            asset_id,
            property_id,
        } => {
            let store = connect_store(args.bucket.as_deref())?;
            let map = store.read_alias_map().await?;
            let alias = map
                .alias(&asset_id, &property_id)
                .with_context(|| format!("no alias for asset {asset_id} property {property_id}"))?;
            let policy = routing_policy(args.time_series_metrics.as_deref());
            println!("{alias} -> {:?}", policy.destination(alias));
        }
        Commands::Classify { alias } => {
            let policy = routing_policy(args.time_series_metrics.as_deref());
            println!("{:?}", policy.destination(&alias));
        }
    }
    Ok(())
}
