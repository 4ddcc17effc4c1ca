use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    DeleteFileResponseDto, PublicFileResponseDto, UploadFileDto, UploadResponseDto,
};
use crate::features::files::services::{FileService, UploadInput};
use crate::shared::types::ApiResponse;
use crate::shared::validation::content_disposition;

/// Upload a file and get a share link
///
/// Accepts multipart/form-data with:
/// - `file`: The file to share (required)
/// - `expiresIn`: Days until expiry, 1-30 (optional, defaults to 7)
#[utoipa::path(
    post,
    path = "/api/file/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form with optional expiresIn (days)",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<UploadResponseDto>),
        (status = 400, description = "Missing file, bad lifetime or file too large"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponseDto>>), AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut expires_in_days = service.default_expires_in_days();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                content_type = field.content_type().map(|s| s.to_string());
                file_name = Some(
                    field
                        .file_name()
                        .filter(|s| !s.is_empty())
                        .unwrap_or("unnamed")
                        .to_string(),
                );

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;
                file_data = Some(data.to_vec());
            }
            "expiresIn" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read expiresIn field: {}", e))
                })?;
                if let Some(days) = parse_expires_in(&text) {
                    expires_in_days = days;
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let data = file_data.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let filename = file_name.unwrap_or_else(|| "unnamed".to_string());

    let record = service
        .upload(UploadInput {
            owner_id: user.user_id,
            filename,
            content_type,
            data,
            expires_in_days,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(record.into()), None, None)),
    ))
}

/// Get public metadata of a shared file
#[utoipa::path(
    get,
    path = "/api/file/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File share id")
    ),
    responses(
        (status = 200, description = "File is live", body = ApiResponse<PublicFileResponseDto>),
        (status = 404, description = "File not found or expired")
    )
)]
pub async fn get_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PublicFileResponseDto>>, AppError> {
    let file = service.get_live(parse_file_id(&id)?).await?;
    Ok(Json(ApiResponse::success(Some(file.into()), None, None)))
}

/// Download a shared file
///
/// Streams the stored bytes as an attachment and counts the download.
#[utoipa::path(
    get,
    path = "/api/file/{id}/download",
    tag = "files",
    params(
        ("id" = String, Path, description = "File share id")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found, expired or missing from storage")
    )
)]
pub async fn download_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let download = service.open_download(parse_file_id(&id)?).await?;
    let length = download.body.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&download.file.filename),
        )
        .header(header::CONTENT_LENGTH, length)
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(download.body))
        .map_err(|e| AppError::Internal(format!("Failed to build download response: {}", e)))
}

/// Delete one of your files
///
/// Only the owner of the file can delete it.
#[utoipa::path(
    delete,
    path = "/api/file/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File share id")
    ),
    responses(
        (status = 200, description = "File deleted successfully", body = ApiResponse<DeleteFileResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not authorized to delete this file"),
        (status = 404, description = "File not found")
    ),
    security(
        ("session_cookie" = [])
    )
)]
pub async fn delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>, AppError> {
    service
        .delete_owned_file(parse_file_id(&id)?, user.user_id)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted: true }),
        Some("File deleted successfully".to_string()),
        None,
    )))
}

/// Ids that are not UUIDs cannot name a file
fn parse_file_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound("File not found".to_string()))
}

/// Blank or non-numeric values fall back to the default lifetime
fn parse_expires_in(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}
