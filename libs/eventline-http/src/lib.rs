mod events;
mod items;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio_util::sync::CancellationToken;

use eventline_engine::ingress::Ingress;
use eventline_engine::store::KeyedStore;

#[derive(Clone)]
pub struct AppState {
    pub ingress: Arc<Ingress>,
    pub store: Arc<KeyedStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/events", post(events::handle_publish_event))
        .route("/api/items", get(items::handle_list_items))
        .route("/api/items/{id}", get(items::handle_get_item))
        .with_state(state)
}

/// HTTP API server: event ingress + stored-item inspection.
pub async fn run(port: u16, state: AppState, shutdown: CancellationToken) -> Result<(), String> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| format!("bind api :{port}: {e}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| format!("axum serve: {e}"))?;

    Ok(())
}
