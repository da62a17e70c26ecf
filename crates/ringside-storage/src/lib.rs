//! Ringside Storage Library
//!
//! Storage abstraction for user-submitted media (profile photos, club photos,
//! training videos). Provides the Storage trait, a local filesystem driver, a
//! remote object store driver and the facade that selects between them.
//!
//! # Storage key format
//!
//! All drivers use the same key layout:
//!
//! - **No directory**: `{uuid}.{ext}`
//! - **With directory**: `{directory}/{uuid}.{ext}`
//!
//! The directory is caller-supplied and sanitized before use. Keys never contain
//! `..` or a leading `/`. Key generation is centralized in the `keys` module so
//! all drivers stay consistent.

pub mod driver;
pub mod factory;
pub mod keys;
pub mod local;
#[cfg(feature = "storage-remote")]
pub mod remote;
pub mod service;
pub mod traits;

// Re-export commonly used types
pub use driver::StorageDriver;
pub use factory::StorageSelector;
pub use local::LocalStorage;
#[cfg(feature = "storage-remote")]
pub use remote::{BucketPolicy, RemoteStorage};
pub use ringside_core::{AssetDescriptor, StorageProvider, UploadOptions};
pub use service::MediaStorage;
pub use traits::{Storage, StorageError, StorageResult};
