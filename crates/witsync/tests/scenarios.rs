//! End-to-end synchronization scenarios.
//!
//! Each scenario drives a full session through the public API against a
//! scripted store and checks what reached the sink and what the caller is
//! told to persist.

use std::sync::Arc;
use std::time::Duration;

use witsync::engine::{
    attr, LogStore, MemorySink, RecordingExecutor, RecordingReporter, Reply,
};
use witsync::{
    FailureKind, Granularity, GrowingObjectPolicyKind, ObjectRef, ObjectType, SchemaVersion,
    SyncConfig, SyncRequest, Witsync,
};
use witsync_testkit::fixtures::{
    depth, depth_metadata, depth_metadata_xml, depth_page, log_page_xml, log_ref, scripted, time,
    time_metadata, time_page, trajectory_ref, trajectory_xml,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[tokio::test]
async fn test_first_run_walks_day_windows_of_v1_server() {
    init_tracing();
    let v1_page = |growing, rows: &[&str]| {
        log_page_xml(SchemaVersion::V1, growing, &["TIME", "ROP"], &["s", "m/h"], rows)
    };
    let client = scripted(
        time_metadata("2024-01-01T00:00:00Z", "2024-01-03T00:00:00Z", true),
        [
            v1_page(true, &["2024-01-01T08:00:00.000Z,11.5", "2024-01-01T23:59:59.999Z,12.0"]),
            v1_page(true, &["2024-01-02T09:30:00.000Z,14.1", "2024-01-02T23:59:59.999Z,13.9"]),
            v1_page(false, &["2024-01-03T00:00:00.000Z,13.7"]),
        ],
    )
    .with_version(SchemaVersion::V1);
    let client = Arc::new(client);
    let sink = Arc::new(MemorySink::new());
    let witsync = Witsync::new(client, sink.clone()).with_config(SyncConfig {
        granularity: Granularity::PerCalendarDay,
        ..Default::default()
    });

    let result = witsync.synchronize(log_ref(), None).await.unwrap();

    assert!(result.is_success());
    assert!(!result.requires_requery);
    assert_eq!(result.queries, 3);
    assert_eq!(result.final_cursor, Some(time("2024-01-03T00:00:00Z")));

    let emitted = sink.emitted().await;
    let batches: Vec<&str> = emitted
        .iter()
        .map(|e| e.attributes[attr::BATCH_ID].as_str())
        .collect();
    assert_eq!(batches, ["2024-01-01", "2024-01-02", "2024-01-03"]);
    assert_eq!(emitted[0].attributes[attr::SCHEMA_VERSION], "1.3.1.1");
    assert_eq!(
        emitted[0].payload.as_str(),
        Some("TIME,ROP\n2024-01-01T08:00:00.000Z,11.5\n2024-01-01T23:59:59.999Z,12.0\n")
    );
}

#[tokio::test]
async fn test_identical_consecutive_pages_emit_once() {
    init_tracing();
    let rows = ["1001.0,55.2", "1002.0,55.9"];
    let client = Arc::new(scripted(
        depth_metadata(1000.0, 1500.0, true),
        [depth_page(true, &rows), depth_page(true, &rows)],
    ));
    let sink = Arc::new(MemorySink::new());
    let witsync = Witsync::new(client, sink.clone());

    let result = witsync.synchronize(log_ref(), Some(depth(1000.0))).await.unwrap();

    assert_eq!(sink.len().await, 1);
    assert_eq!(result.suppressed, 1);
    assert_eq!(result.final_cursor, Some(depth(1002.0)));
    assert!(!result.requires_requery);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_ends_invocation_with_requery() {
    init_tracing();
    let pages = ["00:01", "00:02", "00:03", "00:04", "00:05"]
        .iter()
        .map(|hm| time_page(true, &[&format!("2024-01-01T{hm}:00.000Z,1.0")]));
    let metadata = time_metadata("2024-01-01T00:00:00Z", "2024-01-01T00:00:00Z", true);
    let client = scripted(metadata, pages).with_latency(Duration::from_secs(2));
    let reporter = Arc::new(RecordingReporter::new());
    let witsync = Witsync::new(Arc::new(client), Arc::new(MemorySink::new()))
        .with_reporter(reporter.clone())
        .with_config(SyncConfig {
            deadline_seconds: 5,
            ..Default::default()
        });

    let result = witsync
        .synchronize(log_ref(), Some(time("2024-01-01T00:00:00Z")))
        .await
        .unwrap();

    assert_eq!(result.queries, 3);
    assert!(result.requires_requery);
    assert_eq!(result.final_cursor, Some(time("2024-01-01T00:03:00Z")));
    assert_eq!(reporter.query_count(), 3);
}

#[tokio::test]
async fn test_max_index_comparison_boundary() {
    init_tracing();
    let config = SyncConfig::from_json(r#"{"policy":"max_index_comparison"}"#).unwrap();
    assert_eq!(config.policy, GrowingObjectPolicyKind::MaxIndexComparison);

    let client = Arc::new(scripted(
        depth_metadata(1000.0, 1500.0, true),
        [depth_page(true, &["1499.0,1"]), depth_page(true, &["1500.0,2"])],
    ));
    let witsync = Witsync::new(client.clone(), Arc::new(MemorySink::new())).with_config(config);

    let result = witsync.synchronize(log_ref(), Some(depth(1498.0))).await.unwrap();

    assert!(!result.requires_requery);
    assert_eq!(result.final_cursor, Some(depth(1500.0)));
    let queries = client.queries().await;
    assert_eq!(queries.len(), 2);
    assert_eq!(*queries[1].start(), depth(1500.0));
}

#[tokio::test]
async fn test_v1_and_v2_servers_produce_identical_payloads() {
    init_tracing();
    let mut bodies = Vec::new();

    for version in [SchemaVersion::V1, SchemaVersion::V2] {
        let executor = RecordingExecutor::new(
            version,
            [
                Reply::Body(depth_metadata_xml(version, 1000.0, 1002.0, false)),
                Reply::Body(log_page_xml(
                    version,
                    false,
                    &["DEPT", "GR"],
                    &["m", "gAPI"],
                    &["1001,50.5", "1002,51.0"],
                )),
            ],
        );
        let sink = Arc::new(MemorySink::new());
        let witsync = Witsync::over_executor(executor, sink.clone());

        let result = witsync.synchronize(log_ref(), Some(depth(1000.0))).await.unwrap();
        assert!(result.is_success(), "{version}: {:?}", result.failure);
        assert_eq!(result.final_cursor, Some(depth(1002.0)));

        let emitted = sink.emitted().await;
        assert_eq!(emitted[0].attributes[attr::SCHEMA_VERSION], version.as_str());
        bodies.push(emitted[0].payload.body.clone());
    }

    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn test_trajectory_through_executor() {
    init_tracing();
    let executor = Arc::new(RecordingExecutor::new(
        SchemaVersion::V1,
        [
            Reply::Body(trajectory_xml(false, &[0.0, 150.0, 300.0])),
            Reply::Body(trajectory_xml(false, &[150.0, 300.0])),
        ],
    ));
    let sink = Arc::new(MemorySink::new());
    let witsync = Witsync::over_executor(executor.clone(), sink.clone());

    let result = witsync
        .synchronize(trajectory_ref(), Some(depth(100.0)))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.final_cursor, Some(depth(300.0)));

    let executed = executor.executed().await;
    assert_eq!(executed.len(), 2);
    assert!(executed[1].1.contains("<mdMn>101.0</mdMn>"));

    let emitted = sink.emitted().await;
    let text = emitted[0].payload.as_str().unwrap();
    assert!(text.starts_with("MD,TVD,INCL,AZI"));
    assert_eq!(emitted[0].attributes[attr::OBJECT_KIND], "trajectory");
}

#[tokio::test]
async fn test_columnar_output_and_attributes() {
    init_tracing();
    let config = SyncConfig::from_json(r#"{"format":"columnar","depth_step":0.5}"#).unwrap();
    let client = Arc::new(scripted(
        depth_metadata(1000.0, 1500.0, false),
        [depth_page(false, &["1000.5,40.0", "1001.0,"])],
    ));
    let sink = Arc::new(MemorySink::new());
    let witsync = Witsync::new(client.clone(), sink.clone()).with_config(config);

    witsync.synchronize(log_ref(), Some(depth(1000.0))).await.unwrap();

    assert_eq!(*client.queries().await[0].start(), depth(1000.5));
    let emitted = sink.emitted().await;
    let attributes = &emitted[0].attributes;
    assert_eq!(attributes[attr::MIME_TYPE], "application/json");
    assert_eq!(attributes[attr::NEXT_QUERY_DEPTH], "1001.5");
    assert_eq!(attributes[attr::NAME_WELL], "Fixture Well");
    assert_eq!(attributes[attr::WELL_ID], "W-100");
    assert_eq!(attributes[attr::OBJECT_TYPE], "depth");
    assert_eq!(attributes[attr::CONTENT_HASH], emitted[0].payload.content_hash.to_hex());

    let body = emitted[0].payload.as_str().unwrap();
    assert!(body.contains(r#""uri":"LOG-7/GR""#));
}

#[tokio::test]
async fn test_synchronize_all_isolates_sessions() {
    init_tracing();
    let store = Arc::new(LogStore::new(depth_metadata(1000.0, 1500.0, false), ["1001.0,3.3"]));
    let sink = Arc::new(MemorySink::new());
    let witsync = Witsync::new(store, sink.clone());

    let log_a = ObjectRef::new("W-100", "WB-1", "LOG-A", ObjectType::Log).unwrap();
    let log_b = ObjectRef::new("W-100", "WB-1", "LOG-B", ObjectType::Log).unwrap();
    let requests = vec![
        SyncRequest::new(log_a.clone()).with_cursor(Some(depth(1000.0))),
        SyncRequest::new(log_b.clone()).with_cursor(Some(depth(1000.0))),
        SyncRequest::new(log_b.clone()).with_cursor(Some(time("2024-01-01T00:00:00Z"))),
    ];

    let results = witsync.synchronize_all(requests).await;

    assert_eq!(results.len(), 3);
    let a = results[0].as_ref().unwrap();
    let b = results[1].as_ref().unwrap();
    assert_eq!(a.object, log_a);
    assert_eq!(b.object, log_b);
    assert_eq!(a.final_cursor, Some(depth(1001.0)));
    assert_eq!(b.final_cursor, Some(depth(1001.0)));

    let err = results[2].as_ref().unwrap_err();
    assert_eq!(err.kind(), Some(FailureKind::KindMismatch));
    assert_eq!(sink.len().await, 2);
}

#[tokio::test]
async fn test_metadata_outage_is_reported_not_raised() {
    init_tracing();
    let outage = Reply::Failure("connection refused".into());
    let executor = RecordingExecutor::new(SchemaVersion::V2, [outage]);
    let witsync = Witsync::over_executor(executor, Arc::new(MemorySink::new()));

    let result = witsync.synchronize(log_ref(), Some(depth(10.0))).await.unwrap();

    let failure = result.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::MetadataUnavailable);
    assert!(failure.message.contains("connection refused"));
    assert!(result.requires_requery);
    assert_eq!(result.final_cursor, Some(depth(10.0)));
}
