//! HTTP surface tests, driven through the router with `oneshot`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt; // for oneshot

use eventline_api::error::PipelineError;
use eventline_api::record::{LogRecord, RecordPublisher};
use eventline_engine::bootstrap::Engine;
use eventline_engine::config::EventlineConfig;
use eventline_engine::ingress::Ingress;
use eventline_engine::store::KeyedStore;
use eventline_http::{AppState, router};

fn test_engine() -> Engine {
    let config = EventlineConfig::parse(
        r#"
        [stream]
        shards = 2

        [delivery]
        retry_delay_ms = 10

        [metrics]
        sink = "memory"
        "#,
    )
    .unwrap();
    Engine::bootstrap(&config).unwrap()
}

fn state_for(engine: &Engine) -> AppState {
    AppState {
        ingress: engine.ingress(),
        store: engine.store(),
    }
}

fn post_event(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/events")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn valid_event_returns_success_message() {
    let engine = test_engine();
    let app = router(state_for(&engine));

    let response = app
        .oneshot(post_event(r#"{"id":"a","message":"hi","timestamp":1000}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "success");

    engine.shutdown().await;
}

#[tokio::test]
async fn missing_field_returns_400_naming_the_field() {
    let engine = test_engine();
    let app = router(state_for(&engine));

    let response = app
        .oneshot(post_event(r#"{"message":"hi","timestamp":1000}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "id is required");

    engine.shutdown().await;
}

#[tokio::test]
async fn publish_failure_returns_500_naming_the_stream() {
    struct UnavailablePublisher;

    impl RecordPublisher for UnavailablePublisher {
        fn publish(
            &self,
            _partition_key: String,
            _payload: Vec<u8>,
        ) -> Pin<Box<dyn Future<Output = Result<LogRecord, PipelineError>> + Send + '_>> {
            Box::pin(async { Err(PipelineError::downstream("throughput exceeded")) })
        }
    }

    let state = AppState {
        ingress: Arc::new(Ingress::new(Arc::new(UnavailablePublisher), "events")),
        store: Arc::new(KeyedStore::new("items")),
    };
    let app = router(state);

    let response = app
        .oneshot(post_event(r#"{"id":"a","message":"hi","timestamp":1000}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["message"],
        "failed to publish record to stream 'events': throughput exceeded"
    );
}

#[tokio::test]
async fn accepted_event_becomes_readable_item() {
    let engine = test_engine();
    let state = state_for(&engine);

    router(state.clone())
        .oneshot(post_event(r#"{"id":"a","message":"hi","timestamp":1000}"#))
        .await
        .unwrap();

    // The persister runs asynchronously behind the log.
    tokio::time::timeout(Duration::from_secs(2), async {
        while state.store.get("a").is_none() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("item should be persisted");

    let response = router(state)
        .oneshot(
            Request::builder()
                .uri("/api/items/a")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let item = body_json(response).await;
    assert_eq!(item["id"], "a");
    assert_eq!(item["message"], "hi");
    assert_eq!(item["timestamp"], 1000);

    engine.shutdown().await;
}

#[tokio::test]
async fn unknown_item_returns_404() {
    let engine = test_engine();
    let app = router(state_for(&engine));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/items/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    engine.shutdown().await;
}
