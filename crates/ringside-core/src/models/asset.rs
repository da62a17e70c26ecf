//! Asset descriptor and upload options.

use serde::{Deserialize, Serialize};

/// Result of every successful store operation.
///
/// `key` is the backend-relative identifier used for later `delete` and
/// `get_url` calls; `url` is the publicly fetchable location derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescriptor {
    pub key: String,
    pub url: String,
    /// Size in bytes of what the backend accepted (post-transform for images).
    pub size: u64,
    pub mime_type: String,
}

/// Caller-supplied options for a store call.
///
/// `directory` is untrusted input and is sanitized before it becomes part of a key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

impl UploadOptions {
    pub fn in_directory(directory: impl Into<String>) -> Self {
        UploadOptions {
            directory: Some(directory.into()),
        }
    }
}
