use axum::extract::{Path, State};
use axum::response::IntoResponse;

use super::AppState;

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/items
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_list_items(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.store.items()).into_response()
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /api/items/{id}
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get(&id) {
        Some(item) => axum::Json(item).into_response(),
        None => (
            axum::http::StatusCode::NOT_FOUND,
            format!("item not found: {id}"),
        )
            .into_response(),
    }
}
