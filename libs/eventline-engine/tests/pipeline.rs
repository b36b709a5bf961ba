//! End-to-end pipeline tests: ingress → log → persister → store → feed →
//! observer, with real delivery tasks.

use std::time::Duration;

use eventline_engine::bootstrap::Engine;
use eventline_engine::config::EventlineConfig;
use eventline_engine::observer::AuditTag;

fn test_config() -> EventlineConfig {
    EventlineConfig::parse(
        r#"
        [stream]
        shards = 2

        [delivery]
        batch_size = 8
        max_attempts = 3
        retry_delay_ms = 10

        [metrics]
        sink = "memory"
        "#,
    )
    .expect("test config should parse")
}

async fn wait_until(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition should be reached before the timeout");
}

#[tokio::test]
async fn event_flows_from_ingress_to_store_and_audit() {
    let engine = Engine::bootstrap(&test_config()).unwrap();
    let ingress = engine.ingress();
    let store = engine.store();
    let audit = engine.audit();

    ingress
        .accept(br#"{"id":"a","message":"hi","timestamp":1000}"#)
        .await
        .expect("valid event should be accepted");

    wait_until(|| store.get("a").is_some()).await;
    let item = store.get("a").unwrap();
    assert_eq!(item.id, "a");
    assert_eq!(item.message, "hi");
    assert_eq!(item.timestamp, 1000);

    wait_until(|| !audit.is_empty()).await;
    let entries = audit.read_from(0, 10);
    assert_eq!(entries[0].tag, AuditTag::New);
    assert_eq!(entries[0].item, item);

    engine.shutdown().await;
}

#[tokio::test]
async fn later_delivery_wins_for_the_same_id() {
    let engine = Engine::bootstrap(&test_config()).unwrap();
    let ingress = engine.ingress();
    let store = engine.store();
    let audit = engine.audit();

    ingress
        .accept(br#"{"id":"x","message":"m1","timestamp":2000}"#)
        .await
        .unwrap();
    ingress
        .accept(br#"{"id":"x","message":"m2","timestamp":1000}"#)
        .await
        .unwrap();

    wait_until(|| store.get("x").map(|i| i.message == "m2").unwrap_or(false)).await;
    // The embedded timestamp of the last delivery is kept even though it is
    // older than the first one.
    assert_eq!(store.get("x").unwrap().timestamp, 1000);

    // Insert yields one "new" entry; the modify yields "new" plus "old".
    wait_until(|| audit.len() == 3).await;
    let entries = audit.read_from(0, 10);
    assert_eq!(entries[0].tag, AuditTag::New);
    assert_eq!(entries[0].item.message, "m1");
    assert_eq!(entries[1].tag, AuditTag::New);
    assert_eq!(entries[1].item.message, "m2");
    assert_eq!(entries[2].tag, AuditTag::Old);
    assert_eq!(entries[2].item.message, "m1");

    engine.shutdown().await;
}

#[tokio::test]
async fn poison_record_is_dead_lettered_and_its_partition_recovers() {
    let engine = Engine::bootstrap(&test_config()).unwrap();
    let log = engine.log();
    let store = engine.store();
    let dead_letters = engine.record_dead_letters();

    // A malformed payload followed by a valid one on the same partition.
    log.append("p".to_string(), b"garbage".to_vec());
    log.append(
        "p".to_string(),
        br#"{"id":"p","message":"ok","timestamp":1000}"#.to_vec(),
    );

    wait_until(|| dead_letters.len() == 1).await;
    assert_eq!(dead_letters.read_from(0, 10)[0].payload, b"garbage");

    // The partition is not blocked: the valid record still lands.
    wait_until(|| store.get("p").is_some()).await;
    assert_eq!(store.get("p").unwrap().message, "ok");

    engine.shutdown().await;
}

#[tokio::test]
async fn invalid_event_never_reaches_the_store() {
    let engine = Engine::bootstrap(&test_config()).unwrap();
    let ingress = engine.ingress();
    let store = engine.store();

    ingress
        .accept(br#"{"id":"","message":"hi","timestamp":1000}"#)
        .await
        .unwrap_err();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.is_empty());

    engine.shutdown().await;
}
