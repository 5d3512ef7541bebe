pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::ingest::handlers::handle_extract;
use crate::ingest::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Upload cap plus room for multipart framing, so files just over 10 MB
/// reach the extractor and get its size error.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Posts API
        .route("/api/v1/posts/generate", post(handlers::handle_generate))
        .route("/api/v1/posts/custom-tone", post(handlers::handle_custom_tone))
        .route(
            "/api/v1/posts/history",
            get(handlers::handle_list_history)
                .post(handlers::handle_record_history)
                .delete(handlers::handle_clear_history),
        )
        // Documents API
        .route(
            "/api/v1/documents/extract",
            post(handle_extract).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .with_state(state)
}
