use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Two-level lookup table `assetId -> propertyId -> alias`.
///
/// Keys are kept sorted so that serializing the same content always yields the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasMap {
    assets: BTreeMap<String, BTreeMap<String, String>>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset_id: &str, property_id: &str, alias: &str) {
        self.assets
            .entry(asset_id.to_owned())
            .or_default()
            .insert(property_id.to_owned(), alias.to_owned());
    }

    pub fn alias(&self, asset_id: &str, property_id: &str) -> Option<&str> {
        self.assets
            .get(asset_id)
            .and_then(|properties| properties.get(property_id))
            .map(String::as_str)
    }

    pub fn contains_asset(&self, asset_id: &str) -> bool {
        self.assets.contains_key(asset_id)
    }

    /// Properties of one asset, sorted by property id.
    pub fn properties(&self, asset_id: &str) -> Option<&BTreeMap<String, String>> {
        self.assets.get(asset_id)
    }

    pub fn asset_ids(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    pub fn nb_assets(&self) -> usize {
        self.assets.len()
    }

    /// Total number of (asset, property) entries.
    pub fn nb_entries(&self) -> usize {
        self.assets.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).with_context(|| "serializing alias map")
    }

    pub fn from_json(buffer: &[u8]) -> Result<Self> {
        serde_json::from_slice(buffer).with_context(|| "parsing alias map")
    }
}
