use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{
    delete_file, download_file, get_file, trigger_cleanup, upload_file,
};
use crate::features::files::services::FileService;
use crate::features::files::workers::ExpirationReconciler;

/// Headroom on top of the payload for multipart framing
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Share-link endpoints reachable without a session
pub fn public_routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route("/api/file/{id}", get(get_file))
        .route("/api/file/{id}/download", get(download_file))
        .with_state(file_service)
}

/// Owner endpoints; mounted behind the session middleware
pub fn protected_routes(file_service: Arc<FileService>) -> Router {
    let body_limit = file_service.max_upload_size() + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/api/file/upload",
            post(upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/file/{id}", delete(delete_file))
        .with_state(file_service)
}

/// On-demand expiration sweep; mounted behind basic auth
pub fn internal_routes(reconciler: Arc<ExpirationReconciler>) -> Router {
    Router::new()
        .route("/api/internal/cleanup", post(trigger_cleanup))
        .with_state(reconciler)
}
