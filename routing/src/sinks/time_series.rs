use crate::record::ClassifiedRecord;
use async_trait::async_trait;
use micromegas_tracing::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

pub const ALIAS_DIMENSION: &str = "alias";
pub const MEASURE_VALUE_TYPE_DOUBLE: &str = "DOUBLE";
pub const TIME_UNIT_SECONDS: &str = "SECONDS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

/// One row of the time-series store, in the store's dimensional format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeSeriesRow {
    pub dimensions: Vec<Dimension>,
    pub measure_name: String,
    pub measure_value: String,
    pub measure_value_type: &'static str,
    pub time: String,
    pub time_unit: &'static str,
}

impl TimeSeriesRow {
    /// The alias is both the only dimension and the measure name.
    pub fn from_record(classified: &ClassifiedRecord) -> Self {
        Self {
            dimensions: vec![Dimension {
                name: ALIAS_DIMENSION.to_owned(),
                value: classified.alias.clone(),
            }],
            measure_name: classified.alias.clone(),
            measure_value: classified.record.value.to_string(),
            measure_value_type: MEASURE_VALUE_TYPE_DOUBLE,
            time: classified.record.timestamp.to_string(),
            time_unit: TIME_UNIT_SECONDS,
        }
    }
}

#[derive(Error, Debug)]
pub enum TimeSeriesWriteError {
    /// The store answered and refused the write.
    #[error("write rejected: {message}")]
    Rejected {
        message: String,
        response_body: Option<String>,
    },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Bulk write to a dimensional time-series store.
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    async fn write_records(&self, rows: Vec<TimeSeriesRow>) -> Result<(), TimeSeriesWriteError>;
}

/// Best-effort writer of aggregate metrics.
///
/// Failures are logged with the store's response and never reach the caller.
pub struct TimeSeriesSink {
    store: Arc<dyn TimeSeriesStore>,
}

impl TimeSeriesSink {
    pub fn new(store: Arc<dyn TimeSeriesStore>) -> Self {
        Self { store }
    }

    /// Returns the number of rows accepted by the store.
    pub async fn write(&self, records: &[ClassifiedRecord]) -> usize {
        let rows: Vec<TimeSeriesRow> = records.iter().map(TimeSeriesRow::from_record).collect();
        let nb_rows = rows.len();
        match self.store.write_records(rows).await {
            Ok(()) => {
                debug!("wrote {nb_rows} time-series rows");
                nb_rows
            }
            Err(TimeSeriesWriteError::Rejected {
                message,
                response_body,
            }) => {
                error!("time-series write of {nb_rows} rows rejected: {message}");
                if let Some(body) = response_body {
                    error!("time-series store response: {body}");
                }
                0
            }
            Err(TimeSeriesWriteError::Transport(e)) => {
                error!("time-series write of {nb_rows} rows failed: {e:?}");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AssetPropertyRecord, Destination};

    #[test]
    fn test_row_format() {
        let classified = ClassifiedRecord {
            record: AssetPropertyRecord {
                asset_id: "a1".to_owned(),
                property_id: "p1".to_owned(),
                timestamp: 1600000000,
                value: 7.0,
            },
            alias: "windfarms/W1/turbines/T1/overdrive-state-time".to_owned(),
            destination: Destination::TimeSeries,
        };
        let row = serde_json::to_value(TimeSeriesRow::from_record(&classified)).unwrap();
        assert_eq!(
            row,
            serde_json::json!({
                "Dimensions": [{"Name": "alias", "Value": "windfarms/W1/turbines/T1/overdrive-state-time"}],
                "MeasureName": "windfarms/W1/turbines/T1/overdrive-state-time",
                "MeasureValue": "7",
                "MeasureValueType": "DOUBLE",
                "Time": "1600000000",
                "TimeUnit": "SECONDS"
            })
        );
    }
}
