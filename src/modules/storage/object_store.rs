use async_trait::async_trait;

use crate::core::error::Result;

/// An object read back from the store
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub size: u64,
}

/// Key-addressed binary blob storage.
///
/// Implementations must be `Send + Sync`; every call is a single remote operation
/// that either completes or surfaces as an error.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `data` under `key`, replacing anything already stored there.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Read the object at `key`. Returns `None` if no such object exists.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>>;

    /// Delete the object at `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check whether an object exists at `key`.
    async fn head(&self, key: &str) -> Result<bool>;
}
