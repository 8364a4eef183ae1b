//! Alias mapper
//!
//! Provisioning hook publishing the alias map of the turbine asset model. Invoked on stack
//! creation and on every update; answers the deployment through the request's `ResponseURL`.
//!
//! Env variables:
//!  - `ASSET_MODEL_ID` : asset model whose assets are mapped
//!  - `S3_BUCKET_NAME` : bucket receiving mapping.json
//!  - `DESCRIBE_INTERVAL_MS` (optional) : spacing between describe calls, 50 by default

use clap::Parser;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use micromegas_tracing::prelude::*;
use std::sync::Arc;
use windfarm_lambdas::config::AliasMapperConfig;
use windfarm_lambdas::init_telemetry;
use windfarm_routing::alias_map_builder::AliasMapBuilder;
use windfarm_routing::artifact_store::ArtifactStore;
use windfarm_routing::dispatch_schedule::FixedIntervalSchedule;
use windfarm_routing::provisioning::{AliasMapProvisioner, ProvisioningRequest, send_response};
use windfarm_routing::sitewise_catalog::SiteWiseCatalog;

async fn handle_request(
    provisioner: &AliasMapProvisioner,
    http_client: &reqwest::Client,
    event: LambdaEvent<ProvisioningRequest>,
) -> Result<(), Error> {
    let request = event.payload;
    let response = provisioner.handle(&request).await;
    info!("responding {:?} to request_id={}", response.status, request.request_id);
    send_response(http_client, &request.response_url, &response).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _telemetry_guard = init_telemetry()?;
    let config = AliasMapperConfig::parse();
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = Arc::new(ArtifactStore::connect(&config.asset_map_bucket)?);
    let builder = AliasMapBuilder::new(
        Arc::new(SiteWiseCatalog::new(aws_sdk_iotsitewise::Client::new(
            &sdk_config,
        ))),
        Arc::new(FixedIntervalSchedule::new(config.describe_interval())),
    );
    let provisioner = Arc::new(AliasMapProvisioner::new(
        builder,
        store,
        config.asset_model_id.clone(),
        config.physical_resource_id(),
    ));
    let http_client = reqwest::Client::new();
    lambda_runtime::run(service_fn(|event: LambdaEvent<ProvisioningRequest>| {
        let provisioner = provisioner.clone();
        let http_client = http_client.clone();
        async move { handle_request(&provisioner, &http_client, event).await }
    }))
    .await
}
