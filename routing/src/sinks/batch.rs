use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Bulk append to a buffered delivery stream.
///
/// Records are already serialized, one newline-terminated json document each.
/// Implementations forward them in a single call and report any rejected record as an error.
#[async_trait]
pub trait BatchSink: Send + Sync {
    async fn put_record_batch(&self, records: Vec<Bytes>) -> Result<()>;
}
