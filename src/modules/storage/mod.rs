//! Storage module for file payloads
//!
//! Defines the [`ObjectStore`] capability used by the file lifecycle and the
//! expiration reconciler, and a MinIO/S3-compatible implementation of it.

mod minio_client;
mod object_store;

pub use minio_client::MinIOClient;
pub use object_store::{ObjectStore, StoredObject};
