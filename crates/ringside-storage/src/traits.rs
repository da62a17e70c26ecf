//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use ringside_core::{AssetDescriptor, StorageProvider, UploadOptions};
use ringside_processing::ProcessingError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    #[error("Image processing failed: {0}")]
    Processing(#[from] ProcessingError),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::InvalidPath(_) => "INVALID_PATH",
            StorageError::InvalidContentType(_) => "INVALID_CONTENT_TYPE",
            StorageError::Processing(_) => "PROCESSING_ERROR",
            StorageError::UploadFailed(_) => "UPLOAD_FAILED",
            StorageError::DeleteFailed(_) => "DELETE_FAILED",
            StorageError::BackendError(_) => "BACKEND_UNAVAILABLE",
            StorageError::IoError(_) => "IO_ERROR",
            StorageError::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// Whether the caller may retry the same request.
    ///
    /// Validation and processing failures are deterministic for the same input.
    /// Nothing is retried inside this crate.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageError::UploadFailed(_)
                | StorageError::DeleteFailed(_)
                | StorageError::BackendError(_)
                | StorageError::IoError(_)
        )
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Both drivers (local filesystem, remote object store) implement this trait
/// and behave identically from the caller's point of view: same key layout,
/// same validation, same idempotent delete.
///
/// **Key format:** `{directory}/{uuid}.{ext}` or `{uuid}.{ext}` when no
/// directory is requested. See the `keys` module.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Transform an image and persist the result.
    ///
    /// The stored object is always in the configured output format, so the
    /// returned `mime_type` is that format's MIME type, not `mime_type`.
    async fn store(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        mime_type: &str,
        options: &UploadOptions,
    ) -> StorageResult<AssetDescriptor>;

    /// Persist bytes verbatim (e.g. video), keeping the original extension
    /// and the declared MIME type.
    async fn store_raw(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        mime_type: &str,
        options: &UploadOptions,
    ) -> StorageResult<AssetDescriptor>;

    /// Delete an asset by key. Deleting an absent asset succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Public URL for a key. Pure: no I/O and no validation.
    fn get_url(&self, key: &str) -> String;

    /// The provider answering calls
    fn provider(&self) -> StorageProvider;
}
