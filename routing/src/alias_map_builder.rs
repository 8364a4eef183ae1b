use crate::alias_map::AliasMap;
use crate::artifact_store::ArtifactStore;
use crate::asset_catalog::{AssetCatalog, AssetDescription, AssetPages};
use crate::dispatch_schedule::DispatchSchedule;
use anyhow::{Context, Result};
use micromegas_tracing::prelude::*;
use std::sync::Arc;
use tokio::time::{Instant, sleep_until};

/// Builds the alias map of every asset registered under an asset model.
pub struct AliasMapBuilder {
    catalog: Arc<dyn AssetCatalog>,
    schedule: Arc<dyn DispatchSchedule>,
}

impl AliasMapBuilder {
    pub fn new(catalog: Arc<dyn AssetCatalog>, schedule: Arc<dyn DispatchSchedule>) -> Self {
        Self { catalog, schedule }
    }

    /// Enumerates and describes every asset of the model.
    /// Fails as a whole if any listing or describe call fails.
    #[span_fn]
    pub async fn build(&self, asset_model_id: &str) -> Result<AliasMap> {
        let asset_ids = AssetPages::new(self.catalog.clone(), asset_model_id)
            .collect_asset_ids()
            .await
            .with_context(|| format!("enumerating assets of model {asset_model_id}"))?;
        info!(
            "describing {} assets of model {asset_model_id}",
            asset_ids.len()
        );
        let descriptions = self.describe_all(&asset_ids).await?;

        let mut map = AliasMap::new();
        let mut nb_unaliased = 0;
        for description in &descriptions {
            for property in &description.properties {
                match &property.alias {
                    Some(alias) => map.insert(&description.asset_id, &property.property_id, alias),
                    None => nb_unaliased += 1,
                }
            }
        }
        debug!("skipped {nb_unaliased} properties without alias");
        imetric!("alias_map_entries", "count", map.nb_entries() as u64);
        Ok(map)
    }

    /// Describe calls are released according to the dispatch schedule and run concurrently.
    /// The first failure cancels the calls still pending.
    async fn describe_all(&self, asset_ids: &[String]) -> Result<Vec<AssetDescription>> {
        let start = Instant::now();
        let requests = asset_ids.iter().enumerate().map(|(index, asset_id)| {
            let release_time = start + self.schedule.release_offset(index);
            let catalog = self.catalog.clone();
            async move {
                sleep_until(release_time).await;
                catalog.describe_asset(asset_id).await
            }
        });
        futures::future::try_join_all(requests).await
    }

    /// Builds the map and overwrites the published artifact. Nothing is written if the build fails.
    pub async fn build_and_publish(
        &self,
        asset_model_id: &str,
        store: &ArtifactStore,
    ) -> Result<AliasMap> {
        let map = self.build(asset_model_id).await?;
        info!("writing alias map to {}", store.artifact_url());
        store
            .write_alias_map(&map)
            .await
            .with_context(|| "publishing alias map")?;
        Ok(map)
    }
}
