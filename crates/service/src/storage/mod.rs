//! File storage abstractions for the service layer.
//!
//! Uploads produce a public URL; URLs are the handle for delete, presign and
//! key extraction so callers never deal with paths directly.

use async_trait::async_trait;
use thiserror::Error;

pub mod local;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("invalid file url: {0}")]
    InvalidUrl(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("signing error: {0}")]
    SignError(String),
}

/// Storage backend contract: upload, delete, presign, key extraction.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store the bytes and return the public URL of the new object.
    async fn upload(&self, bytes: &[u8], original_name: &str) -> Result<String, StorageError>;

    /// Remove the object a URL points at.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;

    /// Produce a time-limited signed variant of the URL.
    fn presigned_url(&self, url: &str, ttl_secs: i64) -> Result<String, StorageError>;

    /// Recover the storage key from a URL this backend issued.
    fn extract_key(&self, url: &str) -> Result<String, StorageError>;
}
