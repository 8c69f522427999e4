//! Integration tests for the batch coordinator.

mod helpers;

use helpers::mock_snipeit::{MockSnipeIt, StubClassifier};
use serde_json::json;
use snipesync_core::{DirectoryDevice, StaticSource, SyncEngine};
use std::sync::Arc;

fn device(serial: &str, model: &str) -> DirectoryDevice {
    serde_json::from_value(json!({
        "serialNumber": serial,
        "status": "ACTIVE",
        "model": model
    }))
    .unwrap()
}

#[tokio::test]
async fn batch_counts_each_outcome_and_isolates_failures() {
    let snipe = MockSnipeIt::new().await;
    snipe
        .mock_model_search(
            "Dell Chromebook 11",
            json!([{"id": 31, "name": "Dell Chromebook 11"}]),
        )
        .await;

    // SN001 does not exist yet and gets created.
    snipe.mock_hardware_search("SN001", json!([])).await;
    snipe.mock_create_hardware_success(101).await;
    // SN002 exists and gets updated.
    snipe
        .mock_hardware_search(
            "SN002",
            json!([{"id": 55, "asset_tag": "SN002", "serial": "SN002"}]),
        )
        .await;
    snipe.mock_update_hardware_success(55).await;

    let devices = vec![
        device("SN001", "Dell Chromebook 11"),
        device("SN002", "Dell Chromebook 11"),
        // No serial: fails validation but must not abort the batch.
        DirectoryDevice::default(),
    ];
    let source = Arc::new(StaticSource::new(devices));
    let engine = SyncEngine::new(
        source,
        snipe.upserter(Arc::new(StubClassifier("Chromebook"))),
        false,
    );

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.updated, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.total(), 3);
    assert!(stats.has_failures());
}

#[tokio::test]
async fn failed_device_does_not_stop_later_devices() {
    let snipe = MockSnipeIt::new().await;
    snipe
        .mock_model_search(
            "Dell Chromebook 11",
            json!([{"id": 31, "name": "Dell Chromebook 11"}]),
        )
        .await;

    // SN001's create is rejected outright.
    snipe.mock_hardware_search("SN001", json!([])).await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/hardware"))
        .and(wiremock::matchers::body_partial_json(json!({"serial": "SN001"})))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "messages": {"model_id": ["The selected model id is invalid."]}
        })))
        .mount(snipe.server())
        .await;
    // SN002 still syncs.
    snipe.mock_hardware_search("SN002", json!([])).await;
    snipe.mock_create_hardware_success(102).await;

    let source = Arc::new(StaticSource::new(vec![
        device("SN001", "Dell Chromebook 11"),
        device("SN002", "Dell Chromebook 11"),
    ]));
    let engine = SyncEngine::new(
        source,
        snipe.upserter(Arc::new(StubClassifier("Chromebook"))),
        false,
    );

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn dry_run_skips_every_device_and_writes_nothing() {
    let snipe = MockSnipeIt::new().await;

    let source = Arc::new(StaticSource::new(vec![
        device("SN001", "Dell Chromebook 11"),
        device("SN002", "Dell Chromebook 11"),
    ]));
    let engine = SyncEngine::new(
        source,
        snipe.upserter(Arc::new(StubClassifier("Chromebook"))),
        true,
    );

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.total(), 2);
    assert!(snipe.server().received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_fleet_yields_empty_stats() {
    let snipe = MockSnipeIt::new().await;
    let engine = SyncEngine::new(
        Arc::new(StaticSource::new(Vec::new())),
        snipe.upserter(Arc::new(StubClassifier("Chromebook"))),
        false,
    );

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.total(), 0);
    assert!(!stats.has_failures());
}
