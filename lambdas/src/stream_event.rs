use serde::Deserialize;

/// Batch delivered by the stream event source. Payloads stay base64-encoded.
#[derive(Debug, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StreamEventRecord>,
}

#[derive(Debug, Deserialize)]
pub struct StreamEventRecord {
    pub kinesis: KinesisPayload,
}

/// Only the payload is kept; the other kinesis attributes are ignored.
#[derive(Debug, Deserialize)]
pub struct KinesisPayload {
    pub data: String,
}

impl StreamEvent {
    pub fn into_payloads(self) -> Vec<String> {
        self.records
            .into_iter()
            .map(|record| record.kinesis.data)
            .collect()
    }
}
