//! Provisioning lifecycle hook around the alias map builder
//!
//! The deployment tool sends `Create`, `Update` and `Delete` events and waits for an answer
//! on a pre-signed `ResponseURL`. Create and update rebuild the whole map; delete leaves the
//! artifact to the lifecycle of its bucket.

use crate::alias_map_builder::AliasMapBuilder;
use crate::artifact_store::ArtifactStore;
use anyhow::{Context, Result, anyhow};
use micromegas_tracing::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisioningRequest {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisioningResponse {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

pub struct AliasMapProvisioner {
    builder: AliasMapBuilder,
    store: Arc<ArtifactStore>,
    asset_model_id: String,
    physical_resource_id: String,
}

impl AliasMapProvisioner {
    pub fn new(
        builder: AliasMapBuilder,
        store: Arc<ArtifactStore>,
        asset_model_id: String,
        physical_resource_id: String,
    ) -> Self {
        Self {
            builder,
            store,
            asset_model_id,
            physical_resource_id,
        }
    }

    /// Runs the lifecycle action. Never fails: errors become a `FAILED` response.
    pub async fn handle(&self, request: &ProvisioningRequest) -> ProvisioningResponse {
        info!(
            "provisioning request type={:?} request_id={}",
            request.request_type, request.request_id
        );
        let outcome = match request.request_type {
            RequestType::Create | RequestType::Update => self
                .builder
                .build_and_publish(&self.asset_model_id, &self.store)
                .await
                .map(|map| {
                    info!(
                        "published alias map assets={} entries={}",
                        map.nb_assets(),
                        map.nb_entries()
                    );
                }),
            RequestType::Delete => Ok(()),
            RequestType::Unsupported => Err(anyhow!("unsupported request type")),
        };
        match outcome {
            Ok(()) => self.response(request, ResponseStatus::Success, None),
            Err(e) => {
                error!("provisioning request {} failed: {e:?}", request.request_id);
                self.response(request, ResponseStatus::Failed, Some(format!("{e:#}")))
            }
        }
    }

    fn response(
        &self,
        request: &ProvisioningRequest,
        status: ResponseStatus,
        reason: Option<String>,
    ) -> ProvisioningResponse {
        let mut data = BTreeMap::new();
        if status == ResponseStatus::Success {
            data.insert("Url".to_owned(), self.store.artifact_url());
        }
        ProvisioningResponse {
            status,
            reason,
            physical_resource_id: self.physical_resource_id.clone(),
            stack_id: request.stack_id.clone(),
            request_id: request.request_id.clone(),
            logical_resource_id: request.logical_resource_id.clone(),
            data,
        }
    }
}

/// Uploads the response to the pre-signed url of the request.
pub async fn send_response(
    client: &reqwest::Client,
    response_url: &str,
    response: &ProvisioningResponse,
) -> Result<()> {
    let body = serde_json::to_vec(response).with_context(|| "serializing provisioning response")?;
    debug!("provisioning response: {}", String::from_utf8_lossy(&body));
    client
        .put(response_url)
        // the pre-signed url is computed without a content type
        .header(reqwest::header::CONTENT_TYPE, "")
        .body(body)
        .send()
        .await
        .with_context(|| "sending provisioning response")?
        .error_for_status()
        .with_context(|| "provisioning response refused")?;
    Ok(())
}
