use axum::{http::StatusCode, middleware::from_fn, routing::get, Router};
use std::sync::Arc;

use crate::core::middleware;
use crate::features::auth::{routes as auth_routes, AuthService, SessionService};
use crate::features::files::{routes as files_routes, ExpirationReconciler, FileService};
use crate::features::users::routes as users_routes;

/// Services the HTTP surface is built from
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub sessions: Arc<SessionService>,
    pub files: Arc<FileService>,
    pub reconciler: Arc<ExpirationReconciler>,
}

/// Simple health check endpoint (no auth required)
async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All API routes without docs or transport layers.
///
/// The cleanup trigger is only mounted when basic-auth credentials are configured.
pub fn api_router(services: &AppServices, cleanup_credentials: Option<String>) -> Router {
    // Protected routes (require a live session cookie)
    let protected_routes = Router::new()
        .merge(users_routes::routes(Arc::clone(&services.files)))
        .merge(files_routes::protected_routes(Arc::clone(&services.files)))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&services.sessions),
            middleware::session_auth_middleware,
        ));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::routes(Arc::clone(&services.auth)))
        .merge(files_routes::public_routes(Arc::clone(&services.files)))
        .route("/health", get(health_check));

    let mut app = Router::new().merge(protected_routes).merge(public_routes);

    match cleanup_credentials {
        Some(credentials) => {
            tracing::info!("Cleanup trigger enabled at /api/internal/cleanup");
            app = app.merge(
                files_routes::internal_routes(Arc::clone(&services.reconciler)).layer(from_fn(
                    middleware::basic_auth_middleware(Arc::new(credentials), "Cleanup"),
                )),
            );
        }
        None => {
            tracing::info!("Cleanup trigger disabled (no credentials configured)");
        }
    }

    app
}
