//! Downstream stores of routed telemetry

/// buffered delivery of raw records
pub mod batch;
/// Kinesis Firehose implementation of the batch sink
pub mod firehose;
/// dimensional store of aggregate metrics
pub mod time_series;
/// Timestream implementation of the time-series store
pub mod timestream;
