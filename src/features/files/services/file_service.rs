use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::FileConfig;
use crate::core::error::{AppError, Result};
use crate::features::files::models::{FileRecord, FileWithUploader, NewFileRecord};
use crate::features::files::repositories::FileRepository;
use crate::modules::storage::ObjectStore;
use crate::shared::constants::{DEFAULT_CONTENT_TYPE, MAX_EXPIRES_IN_DAYS, MIN_EXPIRES_IN_DAYS};
use crate::shared::validation::sanitize_key_filename;

/// Length of the random component of an object key
const KEY_SUFFIX_LEN: usize = 10;

/// Upload request after multipart parsing
#[derive(Debug, Clone)]
pub struct UploadInput {
    pub owner_id: Uuid,
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    pub expires_in_days: i64,
}

/// File payload ready to stream to a downloader
#[derive(Debug)]
pub struct DownloadedFile {
    pub file: FileRecord,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Service for the shared-file lifecycle
pub struct FileService {
    files: Arc<dyn FileRepository>,
    storage: Arc<dyn ObjectStore>,
    config: FileConfig,
}

impl FileService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        storage: Arc<dyn ObjectStore>,
        config: FileConfig,
    ) -> Self {
        Self {
            files,
            storage,
            config,
        }
    }

    pub fn max_upload_size(&self) -> usize {
        self.config.max_upload_size
    }

    pub fn default_expires_in_days(&self) -> i64 {
        self.config.default_expires_in_days
    }

    /// Insert a file record for an object that is already stored.
    ///
    /// Rejects out-of-range lifetimes and sizes before touching the store.
    pub async fn create(
        &self,
        owner_id: Uuid,
        filename: &str,
        content_type: Option<String>,
        size_bytes: i64,
        expires_in_days: i64,
        object_key: String,
    ) -> Result<FileRecord> {
        validate_expires_in_days(expires_in_days)?;
        self.validate_size(size_bytes)?;

        let record = self
            .files
            .insert(NewFileRecord {
                owner_id,
                filename: filename.to_string(),
                content_type,
                size_bytes,
                object_key,
                expires_at: Utc::now() + Duration::days(expires_in_days),
            })
            .await?;

        info!(
            "File record created: id={}, owner_id={}, size={}, expires_at={}",
            record.id, record.owner_id, record.size_bytes, record.expires_at
        );

        Ok(record)
    }

    /// `{owner_id}/{unix_millis}-{random}-{sanitized filename}`
    pub fn generate_object_key(&self, owner_id: Uuid, filename: &str) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(KEY_SUFFIX_LEN)
            .map(char::from)
            .collect();

        format!(
            "{}/{}-{}-{}",
            owner_id,
            Utc::now().timestamp_millis(),
            suffix,
            sanitize_key_filename(filename)
        )
    }

    /// Fetch a record with its uploader. No ownership check.
    pub async fn get_by_id(&self, file_id: Uuid) -> Result<Option<FileWithUploader>> {
        self.files.find_with_uploader(file_id).await
    }

    /// Ownership-scoped delete of the metadata row. `false` if nothing matched.
    pub async fn delete(&self, file_id: Uuid, requester_id: Uuid) -> Result<bool> {
        self.files.delete_owned(file_id, requester_id).await
    }

    /// A missing record counts as expired
    pub async fn is_expired(&self, file_id: Uuid) -> Result<bool> {
        let now = Utc::now();
        Ok(match self.files.find_expires_at(file_id).await? {
            Some(expires_at) => expires_at <= now,
            None => true,
        })
    }

    pub async fn increment_download_count(&self, file_id: Uuid) -> Result<()> {
        self.files.increment_download_count(file_id).await?;
        Ok(())
    }

    /// Unexpired records owned by `owner_id`, newest first
    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<FileRecord>> {
        self.files.list_active_for_owner(owner_id, Utc::now()).await
    }

    /// Store the payload, confirm it is visible, then commit the metadata row.
    ///
    /// If the row cannot be written the object is removed again on a best-effort basis.
    pub async fn upload(&self, input: UploadInput) -> Result<FileRecord> {
        let size_bytes = i64::try_from(input.data.len())
            .map_err(|_| AppError::Validation("File too large".to_string()))?;
        validate_expires_in_days(input.expires_in_days)?;
        self.validate_size(size_bytes)?;

        let object_key = self.generate_object_key(input.owner_id, &input.filename);
        let content_type = input
            .content_type
            .clone()
            .filter(|ct| !ct.is_empty());
        let stored_type = content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);

        self.storage
            .put(&object_key, input.data, stored_type)
            .await?;
        debug!("Object stored: key={}", object_key);

        if !self.storage.head(&object_key).await? {
            return Err(AppError::Storage(format!(
                "Object '{}' not visible after upload",
                object_key
            )));
        }

        match self
            .create(
                input.owner_id,
                &input.filename,
                content_type,
                size_bytes,
                input.expires_in_days,
                object_key.clone(),
            )
            .await
        {
            Ok(record) => Ok(record),
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&object_key).await {
                    warn!(
                        "Failed to remove object '{}' after metadata insert failed: {}",
                        object_key, cleanup
                    );
                }
                Err(e)
            }
        }
    }

    /// Record visible on the public path; absent and expired both map to NotFound
    pub async fn get_live(&self, file_id: Uuid) -> Result<FileWithUploader> {
        let file = self
            .get_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        if self.is_expired(file_id).await? {
            debug!("File {} requested after expiry", file_id);
            return Err(AppError::NotFound("File not found".to_string()));
        }

        Ok(file)
    }

    /// Fetch the payload of a live file and count the download.
    ///
    /// A failed counter update is logged and does not fail the download.
    pub async fn open_download(&self, file_id: Uuid) -> Result<DownloadedFile> {
        let FileWithUploader { file, .. } = self.get_live(file_id).await?;

        let object = self
            .storage
            .get(&file.object_key)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found in storage".to_string()))?;

        if let Err(e) = self.increment_download_count(file_id).await {
            warn!("Failed to increment download count for {}: {}", file_id, e);
        }

        let content_type = file
            .content_type
            .clone()
            .or(object.content_type)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Ok(DownloadedFile {
            file,
            content_type,
            body: object.body,
        })
    }

    /// Owner-initiated removal of both the row and the object.
    ///
    /// The object is only deleted by the caller whose row delete actually matched.
    pub async fn delete_owned_file(&self, file_id: Uuid, requester_id: Uuid) -> Result<()> {
        let FileWithUploader { file, .. } = self
            .get_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        if file.owner_id != requester_id {
            return Err(AppError::Forbidden(
                "You do not have permission to delete this file".to_string(),
            ));
        }

        if !self.delete(file_id, requester_id).await? {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        self.storage.delete(&file.object_key).await?;
        info!("File deleted by owner: id={}, key={}", file.id, file.object_key);

        Ok(())
    }

    fn validate_size(&self, size_bytes: i64) -> Result<()> {
        let max = self.config.max_upload_size as i64;
        if size_bytes < 0 {
            return Err(AppError::Validation(
                "File size cannot be negative".to_string(),
            ));
        }
        if size_bytes > max {
            return Err(AppError::Validation(format!(
                "File too large. Maximum size is {}MB",
                max / 1024 / 1024
            )));
        }
        Ok(())
    }
}

fn validate_expires_in_days(days: i64) -> Result<()> {
    if !(MIN_EXPIRES_IN_DAYS..=MAX_EXPIRES_IN_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "Expiration time must be between {} and {} days",
            MIN_EXPIRES_IN_DAYS, MAX_EXPIRES_IN_DAYS
        )));
    }
    Ok(())
}
