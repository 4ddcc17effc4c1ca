use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::files::models::{FileRecord, FileWithUploader};

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to share
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Days until the link expires (1-30, default 7)
    #[schema(example = 7)]
    #[serde(rename = "expiresIn")]
    pub expires_in: Option<i64>,
}

/// Response DTO for a completed upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    /// Share token; also the id used by the public endpoints
    pub file_id: Uuid,
    pub filename: String,
    pub size: i64,
    pub expires_at: DateTime<Utc>,
    /// Path of the share page for this file
    pub download_url: String,
}

impl From<FileRecord> for UploadResponseDto {
    fn from(file: FileRecord) -> Self {
        Self {
            download_url: share_path(file.id),
            file_id: file.id,
            filename: file.filename,
            size: file.size_bytes,
            expires_at: file.expires_at,
        }
    }
}

/// Public metadata shown on a share page
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicFileResponseDto {
    pub id: Uuid,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub expires_at: DateTime<Utc>,
    /// Always `false`; expired files are not served
    pub expired: bool,
    pub download_count: i64,
    pub uploader_name: Option<String>,
    pub uploader_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<FileWithUploader> for PublicFileResponseDto {
    fn from(row: FileWithUploader) -> Self {
        Self {
            id: row.file.id,
            filename: row.file.filename,
            content_type: row.file.content_type,
            size: row.file.size_bytes,
            expires_at: row.file.expires_at,
            expired: false,
            download_count: row.file.download_count,
            uploader_name: row.uploader_name,
            uploader_avatar: row.uploader_image,
            created_at: row.file.created_at,
        }
    }
}

/// A file in the owner's dashboard listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OwnedFileResponseDto {
    pub id: Uuid,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub expires_at: DateTime<Utc>,
    pub download_count: i64,
    pub download_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<FileRecord> for OwnedFileResponseDto {
    fn from(file: FileRecord) -> Self {
        Self {
            download_url: share_path(file.id),
            id: file.id,
            filename: file.filename,
            content_type: file.content_type,
            size: file.size_bytes,
            expires_at: file.expires_at,
            download_count: file.download_count,
            created_at: file.created_at,
        }
    }
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    pub deleted: bool,
}

fn share_path(id: Uuid) -> String {
    format!("/f/{}", id)
}
