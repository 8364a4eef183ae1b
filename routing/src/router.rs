use crate::alias_map::AliasMap;
use crate::alias_map_cache::AliasMapCache;
use crate::record::{AssetPropertyRecord, ClassifiedRecord, Destination, RecordError};
use crate::routing_policy::RoutingPolicy;
use crate::sinks::batch::BatchSink;
use crate::sinks::time_series::TimeSeriesSink;
use anyhow::{Context, Result};
use bytes::Bytes;
use micromegas_tracing::prelude::*;
use std::sync::Arc;

/// Records of one batch, split by destination.
#[derive(Debug, Default)]
pub struct ClassifiedBatch {
    pub batch: Vec<ClassifiedRecord>,
    pub time_series: Vec<ClassifiedRecord>,
    pub dropped: Vec<RecordError>,
}

impl ClassifiedBatch {
    pub fn nb_records(&self) -> usize {
        self.batch.len() + self.time_series.len() + self.dropped.len()
    }
}

/// Decodes, resolves and classifies every payload of a batch.
/// A payload that cannot be decoded or resolved is dropped without affecting the others.
pub fn classify_batch<'a>(
    alias_map: &AliasMap,
    policy: &RoutingPolicy,
    payloads: impl IntoIterator<Item = &'a str>,
) -> ClassifiedBatch {
    let mut classified = ClassifiedBatch::default();
    for payload in payloads {
        match classify_payload(alias_map, policy, payload) {
            Ok(record) => match record.destination {
                Destination::Batch => classified.batch.push(record),
                Destination::TimeSeries => classified.time_series.push(record),
            },
            Err(e) => {
                error!("dropping record: {e}");
                classified.dropped.push(e);
            }
        }
    }
    classified
}

fn classify_payload(
    alias_map: &AliasMap,
    policy: &RoutingPolicy,
    payload: &str,
) -> Result<ClassifiedRecord, RecordError> {
    let record = AssetPropertyRecord::decode(payload)?;
    let alias = record.resolve_alias(alias_map)?.to_owned();
    let destination = policy.destination(&alias);
    Ok(ClassifiedRecord {
        record,
        alias,
        destination,
    })
}

/// Outcome of one routed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutingSummary {
    pub nb_received: usize,
    pub nb_batch: usize,
    pub nb_time_series: usize,
    pub nb_dropped: usize,
    /// rows acknowledged by the time-series store, below `nb_time_series` on a failed write
    pub nb_time_series_written: usize,
}

/// Forks a batch of stream records between the batch sink and the time-series sink.
pub struct TelemetryRouter {
    alias_maps: Arc<AliasMapCache>,
    policy: RoutingPolicy,
    batch_sink: Arc<dyn BatchSink>,
    time_series_sink: TimeSeriesSink,
}

impl TelemetryRouter {
    pub fn new(
        alias_maps: Arc<AliasMapCache>,
        policy: RoutingPolicy,
        batch_sink: Arc<dyn BatchSink>,
        time_series_sink: TimeSeriesSink,
    ) -> Self {
        Self {
            alias_maps,
            policy,
            batch_sink,
            time_series_sink,
        }
    }

    /// Routes the base64 payloads of one stream batch.
    ///
    /// Fails only when the alias map cannot be loaded or the batch sink write fails,
    /// so that the platform redelivers the batch.
    #[span_fn]
    pub async fn route_batch(&self, payloads: &[String]) -> Result<RoutingSummary> {
        let alias_map = self.alias_maps.get().await?;
        let classified = classify_batch(
            &alias_map,
            &self.policy,
            payloads.iter().map(String::as_str),
        );
        let mut summary = RoutingSummary {
            nb_received: classified.nb_records(),
            nb_batch: classified.batch.len(),
            nb_time_series: classified.time_series.len(),
            nb_dropped: classified.dropped.len(),
            nb_time_series_written: 0,
        };
        imetric!("records_received", "count", summary.nb_received as u64);
        imetric!("records_dropped", "count", summary.nb_dropped as u64);

        let (batch_result, nb_written) = tokio::join!(
            self.dispatch_batch(&classified.batch),
            self.dispatch_time_series(&classified.time_series)
        );
        summary.nb_time_series_written = nb_written;
        batch_result?;
        debug!("{summary:?}");
        Ok(summary)
    }

    async fn dispatch_batch(&self, records: &[ClassifiedRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let lines = records
            .iter()
            .map(|record| record.to_json_line().map(Bytes::from))
            .collect::<serde_json::Result<Vec<Bytes>>>()
            .with_context(|| "serializing batch records")?;
        self.batch_sink
            .put_record_batch(lines)
            .await
            .with_context(|| format!("writing {} records to the batch sink", records.len()))?;
        imetric!("records_batch", "count", records.len() as u64);
        Ok(())
    }

    async fn dispatch_time_series(&self, records: &[ClassifiedRecord]) -> usize {
        if records.is_empty() {
            return 0;
        }
        let nb_written = self.time_series_sink.write(records).await;
        imetric!("records_time_series", "count", nb_written as u64);
        nb_written
    }
}
