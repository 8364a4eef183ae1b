use crate::ALIAS_MAP_KEY;
use crate::alias_map::AliasMap;
use anyhow::{Context, Result};
use micromegas_tracing::prelude::*;
use object_store::{ObjectStore, path::Path};
use std::sync::Arc;

/// Durable home of the alias map artifact.
pub struct ArtifactStore {
    blob_store: Arc<dyn ObjectStore>,
    blob_store_root: Path,
    url: String,
}

impl ArtifactStore {
    /// Connects to an object store url (`s3://bucket/prefix`, `file:///dir`, `memory:///`).
    /// A bare bucket name is interpreted as `s3://<bucket>`.
    pub fn connect(location: &str) -> Result<Self> {
        let url_string = if location.contains("://") {
            location.to_owned()
        } else {
            format!("s3://{location}")
        };
        let url = url::Url::parse(&url_string)
            .with_context(|| format!("parsing artifact store url {url_string}"))?;
        // object_store config keys are the lowercase form of the AWS environment variables
        let options = std::env::vars().map(|(k, v)| (k.to_ascii_lowercase(), v));
        let (blob_store, blob_store_root) = object_store::parse_url_opts(&url, options)
            .with_context(|| format!("connecting to object store {url_string}"))?;
        Ok(Self {
            blob_store: blob_store.into(),
            blob_store_root,
            url: url_string,
        })
    }

    pub fn new(blob_store: Arc<dyn ObjectStore>, blob_store_root: Path, url: String) -> Self {
        Self {
            blob_store,
            blob_store_root,
            url,
        }
    }

    fn full_path(&self, obj_path: &str) -> Path {
        self.blob_store_root.child(obj_path)
    }

    /// Location of the alias map, as reported to the provisioning caller.
    pub fn artifact_url(&self) -> String {
        format!("{}/{ALIAS_MAP_KEY}", self.url.trim_end_matches('/'))
    }

    pub async fn put(&self, obj_path: &str, buffer: bytes::Bytes) -> Result<()> {
        let full_path = self.full_path(obj_path);
        self.blob_store
            .put(&full_path, buffer.into())
            .await
            .with_context(|| format!("writing {full_path}"))?;
        Ok(())
    }

    pub async fn read_blob(&self, obj_path: &str) -> Result<bytes::Bytes> {
        let full_path = self.full_path(obj_path);
        let get_result = self
            .blob_store
            .get(&full_path)
            .await
            .with_context(|| format!("reading {full_path}"))?;
        Ok(get_result.bytes().await?)
    }

    /// Replaces the published alias map with a single object put.
    pub async fn write_alias_map(&self, map: &AliasMap) -> Result<()> {
        let buffer = map.to_json()?;
        debug!(
            "writing alias map assets={} entries={} bytes={}",
            map.nb_assets(),
            map.nb_entries(),
            buffer.len()
        );
        self.put(ALIAS_MAP_KEY, buffer.into()).await
    }

    pub async fn read_alias_map(&self) -> Result<AliasMap> {
        let buffer = self.read_blob(ALIAS_MAP_KEY).await?;
        AliasMap::from_json(&buffer)
    }
}
