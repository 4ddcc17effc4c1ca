use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::dtos::UserResponseDto;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::OwnedFileResponseDto;
use crate::features::files::FileService;
use crate::shared::types::{ApiResponse, Meta};

/// Get the signed-in user
#[utoipa::path(
    get,
    path = "/api/user",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn get_current_user(user: AuthenticatedUser) -> Json<ApiResponse<UserResponseDto>> {
    Json(ApiResponse::success(Some(user.into()), None, None))
}

/// List the signed-in user's unexpired files, newest first
#[utoipa::path(
    get,
    path = "/api/user/files",
    tag = "users",
    responses(
        (status = 200, description = "Owned files", body = ApiResponse<Vec<OwnedFileResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn list_my_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
) -> Result<Json<ApiResponse<Vec<OwnedFileResponseDto>>>> {
    let files: Vec<OwnedFileResponseDto> = service
        .list_for_owner(user.user_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let total = files.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}
