use super::batch::BatchSink;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use aws_sdk_firehose::Client;
use aws_sdk_firehose::primitives::Blob;
use aws_sdk_firehose::types::Record;
use bytes::Bytes;
use micromegas_tracing::prelude::*;

pub struct FirehoseBatchSink {
    client: Client,
    delivery_stream_name: String,
}

impl FirehoseBatchSink {
    pub fn new(client: Client, delivery_stream_name: String) -> Self {
        Self {
            client,
            delivery_stream_name,
        }
    }
}

/// A partially accepted batch is a failure: the whole batch is redelivered.
fn check_failed_puts(
    failed_put_count: i32,
    nb_records: usize,
    delivery_stream_name: &str,
) -> Result<()> {
    if failed_put_count > 0 {
        bail!(
            "{failed_put_count} of {nb_records} records rejected by delivery stream {delivery_stream_name}"
        );
    }
    Ok(())
}

#[async_trait]
impl BatchSink for FirehoseBatchSink {
    async fn put_record_batch(&self, records: Vec<Bytes>) -> Result<()> {
        let nb_records = records.len();
        let records = records
            .into_iter()
            .map(|data| Record::builder().data(Blob::new(data)).build())
            .collect::<Result<Vec<Record>, _>>()
            .with_context(|| "building firehose records")?;
        let response = self
            .client
            .put_record_batch()
            .delivery_stream_name(&self.delivery_stream_name)
            .set_records(Some(records))
            .send()
            .await
            .with_context(|| format!("put_record_batch to {}", self.delivery_stream_name))?;
        check_failed_puts(
            response.failed_put_count(),
            nb_records,
            &self.delivery_stream_name,
        )?;
        debug!(
            "delivered {nb_records} records to {}",
            self.delivery_stream_name
        );
        Ok(())
    }
}
