use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{handle_db_error, Result};
use crate::features::files::models::{ExpiredFile, FileRecord, FileWithUploader, NewFileRecord};

/// Persistence for file metadata.
///
/// Every mutation is a single statement; the affected-row count is the only
/// arbiter between concurrent deleters.
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Insert a new record with a fresh v4 share id and a zero download count
    async fn insert(&self, file: NewFileRecord) -> Result<FileRecord>;

    async fn find_with_uploader(&self, id: Uuid) -> Result<Option<FileWithUploader>>;

    async fn find_expires_at(&self, id: Uuid) -> Result<Option<DateTime<Utc>>>;

    /// `DELETE ... WHERE id AND owner_id`; `true` if a row was removed
    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<bool>;

    /// `DELETE ... WHERE id AND expires_at <= now`; `true` if a row was removed
    async fn delete_expired(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool>;

    async fn increment_download_count(&self, id: Uuid) -> Result<bool>;

    /// Records with `expires_at > now`, newest first
    async fn list_active_for_owner(&self, owner_id: Uuid, now: DateTime<Utc>)
        -> Result<Vec<FileRecord>>;

    /// Records with `expires_at <= now`
    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<ExpiredFile>>;
}

pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn insert(&self, file: NewFileRecord) -> Result<FileRecord> {
        let record = sqlx::query_as(
            r#"
            INSERT INTO files (id, owner_id, filename, content_type, size_bytes, object_key, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_id, filename, content_type, size_bytes, object_key, expires_at,
                      download_count, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(file.owner_id)
        .bind(&file.filename)
        .bind(&file.content_type)
        .bind(file.size_bytes)
        .bind(&file.object_key)
        .bind(file.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)?;

        Ok(record)
    }

    async fn find_with_uploader(&self, id: Uuid) -> Result<Option<FileWithUploader>> {
        let file = sqlx::query_as(
            r#"
            SELECT f.id, f.owner_id, f.filename, f.content_type, f.size_bytes, f.object_key,
                   f.expires_at, f.download_count, f.created_at,
                   u.email AS uploader_email, u.name AS uploader_name, u.image AS uploader_image
            FROM files f
            JOIN users u ON u.id = f.owner_id
            WHERE f.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn find_expires_at(&self, id: Uuid) -> Result<Option<DateTime<Utc>>> {
        let expires_at = sqlx::query_scalar("SELECT expires_at FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(expires_at)
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1 AND expires_at <= $2")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_download_count(&self, id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("UPDATE files SET download_count = download_count + 1 WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_active_for_owner(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<FileRecord>> {
        let files = sqlx::query_as(
            r#"
            SELECT id, owner_id, filename, content_type, size_bytes, object_key, expires_at,
                   download_count, created_at
            FROM files
            WHERE owner_id = $1 AND expires_at > $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<ExpiredFile>> {
        let files = sqlx::query_as(
            r#"
            SELECT id, object_key
            FROM files
            WHERE expires_at <= $1
            ORDER BY expires_at ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }
}
