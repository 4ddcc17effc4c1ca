use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::cookie::{cookie_header, find_cookie};
use crate::features::auth::dtos::{OAuthCallbackQuery, SignOutResponseDto, UserResponseDto};
use crate::features::auth::model::ClientMetadata;
use crate::features::auth::services::AuthService;
use crate::shared::constants::OAUTH_STATE_COOKIE;
use crate::shared::types::ApiResponse;

const NO_STORE: &str = "no-cache, no-store, must-revalidate";

/// Start GitHub sign-in
///
/// Redirects to GitHub's consent page and pins the CSRF state in a short-lived cookie.
#[utoipa::path(
    get,
    path = "/api/auth/signin/github",
    responses(
        (status = 303, description = "Redirect to GitHub authorization page")
    ),
    tag = "auth"
)]
pub async fn signin_github(State(service): State<Arc<AuthService>>) -> Response {
    let (url, state) = service.begin_sign_in();
    tracing::debug!("Redirecting to {} authorization", service.provider_name());

    (
        AppendHeaders([
            (header::SET_COOKIE, service.state_cookie(&state)),
            (header::CACHE_CONTROL, NO_STORE.to_string()),
        ]),
        Redirect::to(&url),
    )
        .into_response()
}

/// GitHub OAuth callback
///
/// On success sets the session cookie and redirects to `/`. Failures redirect to
/// `/?error=no_code`, `/?error=invalid_state` or `/?error=auth_error`.
#[utoipa::path(
    get,
    path = "/api/auth/callback/github",
    params(OAuthCallbackQuery),
    responses(
        (status = 303, description = "Redirect back to the application")
    ),
    tag = "auth"
)]
pub async fn callback_github(
    State(service): State<Arc<AuthService>>,
    Query(query): Query<OAuthCallbackQuery>,
    headers: HeaderMap,
) -> Response {
    let cookies = cookie_header(&headers);
    let expected_state = cookies
        .as_deref()
        .and_then(|h| find_cookie(h, OAUTH_STATE_COOKIE));

    let outcome = service
        .complete_sign_in(
            query.code.as_deref(),
            query.state.as_deref(),
            expected_state,
            ClientMetadata::from_headers(&headers),
        )
        .await;

    match outcome {
        Ok(session) => (
            AppendHeaders([
                (
                    header::SET_COOKIE,
                    service.sessions().session_cookie(&session.id),
                ),
                (header::SET_COOKIE, service.clear_state_cookie()),
                (header::CACHE_CONTROL, NO_STORE.to_string()),
            ]),
            Redirect::to("/"),
        )
            .into_response(),
        Err(e) => (
            AppendHeaders([
                (header::SET_COOKIE, service.clear_state_cookie()),
                (header::CACHE_CONTROL, NO_STORE.to_string()),
            ]),
            Redirect::to(&format!("/?error={}", e.as_query_value())),
        )
            .into_response(),
    }
}

/// Get the current session's user
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "No live session")
    ),
    tag = "auth",
    security(
        ("session_cookie" = [])
    )
)]
pub async fn get_session(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let cookies = cookie_header(&headers);
    let user = service
        .sessions()
        .resolve_session(cookies.as_deref())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()))?;

    Ok(Json(ApiResponse::success(Some(user.into()), None, None)))
}

/// Sign out
///
/// Deletes the session if one is live and always clears the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/signout",
    responses(
        (status = 200, description = "Signed out", body = ApiResponse<SignOutResponseDto>)
    ),
    tag = "auth"
)]
pub async fn sign_out(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let sessions = service.sessions();
    let cookies = cookie_header(&headers);

    let signed_out = match sessions.resolve_session(cookies.as_deref()).await? {
        Some(user) => sessions.sign_out(&user.session_id).await?,
        None => false,
    };

    Ok((
        AppendHeaders([(header::SET_COOKIE, sessions.clear_cookie())]),
        Json(ApiResponse::success(
            Some(SignOutResponseDto { signed_out }),
            Some("Signed out".to_string()),
            None,
        )),
    ))
}
