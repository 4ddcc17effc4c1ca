use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for shared files
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FileRecord {
    /// Public share token
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Client-supplied name; untrusted
    pub filename: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub object_key: String,
    pub expires_at: DateTime<Utc>,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// File record joined with the uploader's public profile
#[derive(Debug, Clone, FromRow)]
pub struct FileWithUploader {
    #[sqlx(flatten)]
    pub file: FileRecord,
    pub uploader_email: String,
    pub uploader_name: Option<String>,
    pub uploader_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub owner_id: Uuid,
    pub filename: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub object_key: String,
    pub expires_at: DateTime<Utc>,
}

/// Minimal projection used by the expiration sweep
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ExpiredFile {
    pub id: Uuid,
    pub object_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_expired_at_boundary() {
        let now = Utc::now();
        let record = FileRecord {
            id: Uuid::new_v4(),
            owner_id: Uuid::now_v7(),
            filename: "a.txt".to_string(),
            content_type: None,
            size_bytes: 1,
            object_key: "k".to_string(),
            expires_at: now,
            download_count: 0,
            created_at: now - Duration::days(1),
        };

        assert!(record.is_expired_at(now));
        assert!(record.is_expired_at(now + Duration::seconds(1)));
        assert!(!record.is_expired_at(now - Duration::seconds(1)));
    }
}
