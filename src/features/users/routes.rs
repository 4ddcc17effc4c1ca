use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::files::FileService;
use crate::features::users::handlers::{get_current_user, list_my_files};

/// Create routes for the users feature (session required)
pub fn routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route("/api/user", get(get_current_user))
        .route("/api/user/files", get(list_my_files))
        .with_state(file_service)
}
