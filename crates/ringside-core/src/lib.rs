//! Ringside Core Library
//!
//! Domain types and configuration shared by the media processing and storage
//! crates: the asset descriptor returned by every store call, upload options,
//! the storage provider tag and the image output format.

pub mod config;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{ImageConfig, LocalStorageConfig, RemoteStorageConfig, StorageConfig};
pub use models::{AssetDescriptor, UploadOptions};
pub use storage_types::{OutputFormat, StorageProvider};
