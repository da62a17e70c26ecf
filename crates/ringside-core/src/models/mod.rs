//! Data models for the media storage layer

mod asset;

pub use asset::{AssetDescriptor, UploadOptions};
