use super::time_series::{TimeSeriesRow, TimeSeriesStore, TimeSeriesWriteError};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_sdk_timestreamwrite::Client;
use aws_sdk_timestreamwrite::config::http::HttpResponse;
use aws_sdk_timestreamwrite::error::{DisplayErrorContext, SdkError};
use aws_sdk_timestreamwrite::operation::write_records::WriteRecordsError;
use aws_sdk_timestreamwrite::types::{Dimension, MeasureValueType, Record, TimeUnit};
use micromegas_tracing::prelude::*;

pub struct TimestreamStore {
    client: Client,
    database_name: String,
    table_name: String,
}

impl TimestreamStore {
    /// Writes through `client` as configured, without endpoint discovery.
    pub fn new(client: Client, database_name: String, table_name: String) -> Self {
        Self {
            client,
            database_name,
            table_name,
        }
    }

    /// The write api is only reachable through endpoint discovery;
    /// the discovered endpoint is refreshed by a background task.
    pub async fn connect(
        client: Client,
        database_name: String,
        table_name: String,
    ) -> Result<Self> {
        let (client, reload) = client
            .with_endpoint_discovery_enabled()
            .await
            .map_err(|e| anyhow!("enabling timestream endpoint discovery: {e}"))?;
        tokio::spawn(reload.reload_task());
        info!("writing aggregates to timestream table {database_name}.{table_name}");
        Ok(Self::new(client, database_name, table_name))
    }

    /// A service answer becomes `Rejected` with its raw body; anything else is `Transport`.
    fn write_error(&self, err: SdkError<WriteRecordsError, HttpResponse>) -> TimeSeriesWriteError {
        if err.as_service_error().is_some() {
            let response_body = err
                .raw_response()
                .and_then(|response| response.body().bytes())
                .map(|body| String::from_utf8_lossy(body).into_owned());
            return TimeSeriesWriteError::Rejected {
                message: DisplayErrorContext(&err).to_string(),
                response_body,
            };
        }
        TimeSeriesWriteError::Transport(anyhow!(
            "writing to timestream {}.{}: {}",
            self.database_name,
            self.table_name,
            DisplayErrorContext(&err)
        ))
    }
}

fn to_sdk_record(row: TimeSeriesRow) -> Result<Record> {
    let dimensions = row
        .dimensions
        .into_iter()
        .map(|dimension| {
            Dimension::builder()
                .name(dimension.name)
                .value(dimension.value)
                .build()
        })
        .collect::<Result<Vec<Dimension>, _>>()
        .with_context(|| "building timestream dimensions")?;
    Ok(Record::builder()
        .set_dimensions(Some(dimensions))
        .measure_name(row.measure_name)
        .measure_value(row.measure_value)
        .measure_value_type(MeasureValueType::from(row.measure_value_type))
        .time(row.time)
        .time_unit(TimeUnit::from(row.time_unit))
        .build())
}

#[async_trait]
impl TimeSeriesStore for TimestreamStore {
    async fn write_records(&self, rows: Vec<TimeSeriesRow>) -> Result<(), TimeSeriesWriteError> {
        let records = rows
            .into_iter()
            .map(to_sdk_record)
            .collect::<Result<Vec<Record>>>()?;
        self.client
            .write_records()
            .database_name(&self.database_name)
            .table_name(&self.table_name)
            .set_records(Some(records))
            .send()
            .await
            .map_err(|err| self.write_error(err))?;
        Ok(())
    }
}
