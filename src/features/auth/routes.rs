use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Sign-in, callback, session probe and sign-out (all resolve the cookie themselves)
pub fn routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/signin/github", get(handlers::signin_github))
        .route("/api/auth/callback/github", get(handlers::callback_github))
        .route("/api/auth/session", get(handlers::get_session))
        .route("/api/auth/signout", post(handlers::sign_out))
        .with_state(service)
}
