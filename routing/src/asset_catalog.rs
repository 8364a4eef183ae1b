use anyhow::Result;
use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::collections::HashSet;
use std::sync::Arc;

/// One page of a paginated asset listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPage {
    pub asset_ids: Vec<String>,
    /// Present when more pages follow.
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPropertyDefinition {
    pub property_id: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescription {
    pub asset_id: String,
    pub properties: Vec<AssetPropertyDefinition>,
}

/// Read access to the assets registered under an asset model.
#[async_trait]
pub trait AssetCatalog: Send + Sync {
    async fn list_assets(
        &self,
        asset_model_id: &str,
        next_token: Option<String>,
    ) -> Result<AssetPage>;

    async fn describe_asset(&self, asset_id: &str) -> Result<AssetDescription>;
}

/// Lazy sequence of listing pages for one asset model.
///
/// Each call to [`AssetPages::stream`] starts over from the first page.
pub struct AssetPages {
    catalog: Arc<dyn AssetCatalog>,
    asset_model_id: String,
}

impl AssetPages {
    pub fn new(catalog: Arc<dyn AssetCatalog>, asset_model_id: &str) -> Self {
        Self {
            catalog,
            asset_model_id: asset_model_id.to_owned(),
        }
    }

    pub fn stream(&self) -> BoxStream<'static, Result<AssetPage>> {
        let catalog = self.catalog.clone();
        let asset_model_id = self.asset_model_id.clone();
        try_stream! {
            let mut next_token = None;
            loop {
                let page = catalog.list_assets(&asset_model_id, next_token.take()).await?;
                next_token = page.next_token.clone();
                yield page;
                if next_token.is_none() {
                    break;
                }
            }
        }
        .boxed()
    }

    /// Drains every page and returns the asset ids in listing order, each id once.
    pub async fn collect_asset_ids(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut asset_ids = vec![];
        let mut pages = self.stream();
        while let Some(page) = pages.next().await {
            for asset_id in page?.asset_ids {
                if seen.insert(asset_id.clone()) {
                    asset_ids.push(asset_id);
                }
            }
        }
        Ok(asset_ids)
    }
}
