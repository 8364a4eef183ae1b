use crate::asset_catalog::{AssetCatalog, AssetDescription, AssetPage, AssetPropertyDefinition};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_iotsitewise::Client;

/// [`AssetCatalog`] backed by the IoT SiteWise control plane.
pub struct SiteWiseCatalog {
    client: Client,
}

impl SiteWiseCatalog {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetCatalog for SiteWiseCatalog {
    async fn list_assets(
        &self,
        asset_model_id: &str,
        next_token: Option<String>,
    ) -> Result<AssetPage> {
        let response = self
            .client
            .list_assets()
            .asset_model_id(asset_model_id)
            .set_next_token(next_token)
            .send()
            .await
            .with_context(|| format!("listing assets of model {asset_model_id}"))?;
        Ok(AssetPage {
            asset_ids: response
                .asset_summaries()
                .iter()
                .map(|summary| summary.id().to_owned())
                .collect(),
            next_token: response.next_token().map(str::to_owned),
        })
    }

    async fn describe_asset(&self, asset_id: &str) -> Result<AssetDescription> {
        let response = self
            .client
            .describe_asset()
            .asset_id(asset_id)
            .send()
            .await
            .with_context(|| format!("describing asset {asset_id}"))?;
        Ok(AssetDescription {
            asset_id: response.asset_id().to_owned(),
            properties: response
                .asset_properties()
                .iter()
                .map(|property| AssetPropertyDefinition {
                    property_id: property.id().to_owned(),
                    alias: property.alias().map(str::to_owned),
                })
                .collect(),
        })
    }
}
