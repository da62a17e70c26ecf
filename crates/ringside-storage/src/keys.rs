//! Shared key generation and path validation for storage backends.
//!
//! Key format: `{directory}/{uuid}.{ext}`, or `{uuid}.{ext}` without a directory.
//! The uuid is random (v4) and never derived from the caller's filename.
//!
//! Two checks guard the two boundaries:
//! - [`sanitize_directory`] whitelists characters of the caller-supplied directory
//!   on the write path, where the value is used to build a new location.
//! - [`validate_key`] rejects traversal and absolute keys on delete/lookup. Drivers
//!   with a filesystem also re-check containment of the resolved path.

use crate::traits::{StorageError, StorageResult};
use ringside_core::UploadOptions;
use std::path::Path;
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 16;

/// Validate and normalize a caller-supplied directory.
///
/// Leading and trailing slashes are stripped. The result may only contain
/// `[A-Za-z0-9_-]` and single `/` separators. An empty result means "no directory".
pub fn sanitize_directory(input: &str) -> StorageResult<String> {
    let stripped = input.trim_matches('/');

    if stripped.contains("..") || stripped.contains("//") || stripped.starts_with('/') {
        return Err(StorageError::InvalidPath(format!(
            "directory contains a traversal or empty segment: {:?}",
            input
        )));
    }

    if let Some(c) = stripped
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/')))
    {
        return Err(StorageError::InvalidPath(format!(
            "directory contains disallowed character {:?}",
            c
        )));
    }

    Ok(stripped.to_string())
}

/// Validate a key received on delete/lookup.
///
/// No character whitelist here: keys written by older validation rules must
/// stay deletable.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidPath(
            "storage key is empty".to_string(),
        ));
    }

    if key.contains("..") {
        return Err(StorageError::InvalidPath(
            "storage key contains a traversal sequence".to_string(),
        ));
    }

    if key.starts_with('/') || key.starts_with('\\') || Path::new(key).has_root() {
        return Err(StorageError::InvalidPath(
            "storage key must be relative".to_string(),
        ));
    }

    if key.contains('\0') {
        return Err(StorageError::InvalidPath(
            "storage key contains a NUL byte".to_string(),
        ));
    }

    Ok(())
}

/// Extract the extension of a caller-supplied filename.
///
/// Returns `None` when the filename has no extension. The extension is kept
/// verbatim but must be ASCII alphanumeric.
pub fn extension_of(filename: &str) -> StorageResult<Option<String>> {
    let name = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    let extension = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext,
        _ => return Ok(None),
    };

    if extension.len() > MAX_EXTENSION_LEN
        || !extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(StorageError::InvalidPath(format!(
            "file extension is not allowed: {:?}",
            extension
        )));
    }

    Ok(Some(extension.to_string()))
}

/// Validate a declared MIME type before it is echoed back or sent as a header.
pub fn validate_mime_type(mime_type: &str) -> StorageResult<()> {
    let is_token = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&^_.+-".contains(c))
    };

    match mime_type.split_once('/') {
        Some((kind, subtype)) if is_token(kind) && is_token(subtype) => Ok(()),
        _ => Err(StorageError::InvalidContentType(mime_type.to_string())),
    }
}

/// Generate a fresh opaque key under an already-sanitized directory.
pub fn generate_key(directory: Option<&str>, extension: Option<&str>) -> String {
    let name = match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    };

    match directory {
        Some(dir) if !dir.is_empty() => format!("{}/{}", dir, name),
        _ => name,
    }
}

/// Sanitize the requested directory and generate a key inside it.
pub fn build_key(options: &UploadOptions, extension: Option<&str>) -> StorageResult<String> {
    let directory = options
        .directory
        .as_deref()
        .map(sanitize_directory)
        .transpose()?;

    Ok(generate_key(directory.as_deref(), extension))
}
