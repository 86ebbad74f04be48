use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::state::AppState;

/// All routes with permissive CORS. Request tracing is added by [`crate::Server`].
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::status))
        .route("/debate/start", post(handlers::start_debate))
        .route("/debate/next-round", post(handlers::next_round))
        .route("/debate/add-comment", post(handlers::add_comment))
        .route("/history/:session_id", get(handlers::history))
        .route("/clear/:session_id", delete(handlers::clear))
        .route("/sessions", get(handlers::sessions))
        .route("/sessions/:session_id", get(handlers::session_info))
        .fallback(fallback_handler)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn fallback_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        axum::Json(serde_json::json!({
            "success": false,
            "error": {
                "code": "not_found",
                "message": "Endpoint not found"
            }
        })),
    )
}
