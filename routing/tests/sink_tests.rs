use bytes::Bytes;
use windfarm_routing::sinks::batch::BatchSink;
use windfarm_routing::sinks::firehose::FirehoseBatchSink;
use windfarm_routing::sinks::time_series::{
    Dimension, MEASURE_VALUE_TYPE_DOUBLE, TIME_UNIT_SECONDS, TimeSeriesRow, TimeSeriesStore,
    TimeSeriesWriteError,
};
use windfarm_routing::sinks::timestream::TimestreamStore;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AWS_JSON_1_0: &str = "application/x-amz-json-1.0";
const AWS_JSON_1_1: &str = "application/x-amz-json-1.1";

fn firehose_client(endpoint: &str) -> aws_sdk_firehose::Client {
    use aws_sdk_firehose::config::retry::RetryConfig;
    use aws_sdk_firehose::config::{BehaviorVersion, Credentials, Region};
    let config = aws_sdk_firehose::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
        .endpoint_url(endpoint)
        .retry_config(RetryConfig::disabled())
        .build();
    aws_sdk_firehose::Client::from_conf(config)
}

fn timestream_client(endpoint: &str) -> aws_sdk_timestreamwrite::Client {
    use aws_sdk_timestreamwrite::config::retry::RetryConfig;
    use aws_sdk_timestreamwrite::config::{BehaviorVersion, Credentials, Region};
    let config = aws_sdk_timestreamwrite::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
        .endpoint_url(endpoint)
        .retry_config(RetryConfig::disabled())
        .build();
    aws_sdk_timestreamwrite::Client::from_conf(config)
}

fn timestream_store(endpoint: &str) -> TimestreamStore {
    TimestreamStore::new(
        timestream_client(endpoint),
        "windfarm".to_owned(),
        "aggregates".to_owned(),
    )
}

fn lines() -> Vec<Bytes> {
    vec![
        Bytes::from_static(b"{\"assetId\":\"a1\"}\n"),
        Bytes::from_static(b"{\"assetId\":\"a2\"}\n"),
    ]
}

fn row() -> TimeSeriesRow {
    let alias = "windfarms/W1/turbines/T1/average-wind-speed".to_owned();
    TimeSeriesRow {
        dimensions: vec![Dimension {
            name: "alias".to_owned(),
            value: alias.clone(),
        }],
        measure_name: alias,
        measure_value: "12.5".to_owned(),
        measure_value_type: MEASURE_VALUE_TYPE_DOUBLE,
        time: "1600000000".to_owned(),
        time_unit: TIME_UNIT_SECONDS,
    }
}

#[tokio::test]
async fn test_firehose_accepted_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "Firehose_20150804.PutRecordBatch"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"FailedPutCount":0,"Encrypted":false,"RequestResponses":[{"RecordId":"r1"},{"RecordId":"r2"}]}"#,
            AWS_JSON_1_1,
        ))
        .expect(1)
        .mount(&server)
        .await;
    let sink = FirehoseBatchSink::new(
        firehose_client(&server.uri()),
        "raw-turbine-data".to_owned(),
    );
    sink.put_record_batch(lines()).await.unwrap();
}

#[tokio::test]
async fn test_firehose_failed_puts_fail_the_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "Firehose_20150804.PutRecordBatch"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"FailedPutCount":1,"Encrypted":false,"RequestResponses":[{"RecordId":"r1"},{"ErrorCode":"ServiceUnavailableException","ErrorMessage":"Slow down."}]}"#,
            AWS_JSON_1_1,
        ))
        .mount(&server)
        .await;
    let sink = FirehoseBatchSink::new(
        firehose_client(&server.uri()),
        "raw-turbine-data".to_owned(),
    );
    let err = sink.put_record_batch(lines()).await.unwrap_err();
    assert!(format!("{err:#}").contains("1 of 2 records rejected"));
}

#[tokio::test]
async fn test_timestream_accepted_write() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "Timestream_20181101.WriteRecords"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"RecordsIngested":{"Total":1,"MemoryStore":1,"MagneticStore":0}}"#,
            AWS_JSON_1_0,
        ))
        .expect(1)
        .mount(&server)
        .await;
    timestream_store(&server.uri())
        .write_records(vec![row()])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_timestream_rejection_keeps_response_body() {
    let server = MockServer::start().await;
    let body = r#"{"__type":"RejectedRecordsException","Message":"One or more records have been rejected.","RejectedRecords":[{"RecordIndex":0,"Reason":"The record timestamp is outside the time range of the data ingestion window."}]}"#;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "Timestream_20181101.WriteRecords"))
        .respond_with(ResponseTemplate::new(400).set_body_raw(body, AWS_JSON_1_0))
        .mount(&server)
        .await;
    let err = timestream_store(&server.uri())
        .write_records(vec![row()])
        .await
        .unwrap_err();
    match err {
        TimeSeriesWriteError::Rejected {
            message,
            response_body,
        } => {
            assert!(!message.is_empty());
            assert_eq!(response_body.as_deref(), Some(body));
        }
        TimeSeriesWriteError::Transport(e) => panic!("expected a rejection, got {e:?}"),
    }
}

#[tokio::test]
async fn test_timestream_unreachable_is_transport_error() {
    // a port released right away has no listener
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let endpoint = format!("http://127.0.0.1:{port}");
    let err = timestream_store(&endpoint)
        .write_records(vec![row()])
        .await
        .unwrap_err();
    assert!(matches!(err, TimeSeriesWriteError::Transport(_)));
}
