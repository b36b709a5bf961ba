use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use eventline_api::error::ErrorKind;

use super::AppState;

/// Every ingress response is a structured `{message}` object.
#[derive(Serialize)]
pub(crate) struct ApiMessage {
    message: String,
}

// ═══════════════════════════════════════════════════════════════
//  REST: POST /api/events
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_publish_event(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, axum::Json<ApiMessage>) {
    match state.ingress.accept(&body).await {
        Ok(_) => (
            StatusCode::OK,
            axum::Json(ApiMessage {
                message: "success".to_string(),
            }),
        ),
        Err(e) => {
            let status = match e.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, axum::Json(ApiMessage { message: e.message }))
        }
    }
}
