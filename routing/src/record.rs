use crate::alias_map::AliasMap;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single inbound record was dropped.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid record json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown asset {asset_id}")]
    UnknownAsset { asset_id: String },

    #[error("unknown property {property_id} of asset {asset_id}")]
    UnknownProperty {
        asset_id: String,
        property_id: String,
    },
}

/// Timestamp as emitted by the rule extractor, or in the nested upstream shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimestampField {
    Seconds(i64),
    Nested {
        #[serde(rename = "timeInSeconds")]
        time_in_seconds: i64,
    },
}

/// Measurement as emitted by the rule extractor, or in the nested upstream shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum ValueField {
    Double(f64),
    Nested {
        #[serde(rename = "doubleValue")]
        double_value: f64,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    asset_id: String,
    property_id: String,
    timestamp: TimestampField,
    value: ValueField,
}

/// One telemetry sample keyed by opaque asset and property identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPropertyRecord {
    pub asset_id: String,
    pub property_id: String,
    /// seconds since epoch
    pub timestamp: i64,
    pub value: f64,
}

impl WireRecord {
    fn into_record(self) -> AssetPropertyRecord {
        let timestamp = match self.timestamp {
            TimestampField::Seconds(s) => s,
            TimestampField::Nested { time_in_seconds } => time_in_seconds,
        };
        let value = match self.value {
            ValueField::Double(v) => v,
            ValueField::Nested { double_value } => double_value,
        };
        AssetPropertyRecord {
            asset_id: self.asset_id,
            property_id: self.property_id,
            timestamp,
            value,
        }
    }
}

impl AssetPropertyRecord {
    pub fn from_json(buffer: &[u8]) -> Result<Self, RecordError> {
        let wire: WireRecord = serde_json::from_slice(buffer)?;
        Ok(wire.into_record())
    }

    /// Decodes a base64 stream payload holding one json record.
    pub fn decode(payload: &str) -> Result<Self, RecordError> {
        let buffer = STANDARD.decode(payload.trim())?;
        Self::from_json(&buffer)
    }

    pub fn resolve_alias<'a>(&self, map: &'a AliasMap) -> Result<&'a str, RecordError> {
        if !map.contains_asset(&self.asset_id) {
            return Err(RecordError::UnknownAsset {
                asset_id: self.asset_id.clone(),
            });
        }
        map.alias(&self.asset_id, &self.property_id)
            .ok_or_else(|| RecordError::UnknownProperty {
                asset_id: self.asset_id.clone(),
                property_id: self.property_id.clone(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    TimeSeries,
    Batch,
}

/// A record with its resolved alias and routing destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: AssetPropertyRecord,
    pub alias: String,
    #[serde(skip)]
    pub destination: Destination,
}

impl ClassifiedRecord {
    /// Newline-terminated json line, as delivered to the batch sink.
    /// Always the flat shape, whatever shape the record was received in.
    pub fn to_json_line(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}
