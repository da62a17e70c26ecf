//! Configuration module
//!
//! This module provides the configuration consumed by the media pipeline:
//! which storage provider is active, where the local driver writes, how the
//! remote object store is reached and how uploaded images are normalized.

use std::env;

use crate::storage_types::OutputFormat;

// Common constants
const LOCAL_STORAGE_PATH: &str = "./uploads";
const LOCAL_STORAGE_BASE_URL: &str = "/uploads";
const IMAGE_MAX_WIDTH: u32 = 1200;
const IMAGE_MAX_HEIGHT: u32 = 1200;
const IMAGE_QUALITY: u8 = 80;
const REMOTE_STORAGE_BUCKET: &str = "media";
const REMOTE_STORAGE_MAX_FILE_SIZE_MB: u64 = 50;
const REMOTE_STORAGE_TIMEOUT_SECS: u64 = 60;
const REMOTE_STORAGE_ALLOWED_MIME_TYPES: &str =
    "image/jpeg,image/png,image/gif,image/webp,video/mp4,video/quicktime,video/webm";

/// Local filesystem driver settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalStorageConfig {
    pub path: String,
    pub base_url: String,
}

/// Image transform settings applied to every `store` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
    pub output_format: OutputFormat,
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            max_width: IMAGE_MAX_WIDTH,
            max_height: IMAGE_MAX_HEIGHT,
            quality: IMAGE_QUALITY,
            output_format: OutputFormat::default(),
        }
    }
}

/// Remote object store settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteStorageConfig {
    /// API base URL (e.g. "https://project.supabase.co")
    pub url: Option<String>,
    /// Base URL used for public object links; defaults to `url`
    pub public_url: Option<String>,
    pub bucket: String,
    pub api_key: Option<String>,
    /// Container-level object size limit applied when provisioning the bucket
    pub max_file_size_bytes: u64,
    /// Container-level MIME allow-list applied when provisioning the bucket
    pub allowed_mime_types: Vec<String>,
    pub timeout_secs: u64,
}

impl RemoteStorageConfig {
    /// Returns the API URL and key when both are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.url.as_deref(), self.api_key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some((url, key)),
            _ => None,
        }
    }

    pub fn public_base_url(&self) -> Option<&str> {
        self.public_url.as_deref().or(self.url.as_deref())
    }
}

/// Media storage configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    /// Raw provider tag as configured; unknown values are resolved by the selector
    pub provider: Option<String>,
    pub local: LocalStorageConfig,
    pub remote: RemoteStorageConfig,
    pub image: ImageConfig,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let output_format = match var("IMAGE_OUTPUT_FORMAT") {
            Some(value) => value
                .parse::<OutputFormat>()
                .map_err(|_| {
                    anyhow::anyhow!("IMAGE_OUTPUT_FORMAT must be one of webp, jpeg, png")
                })?,
            None => OutputFormat::default(),
        };

        let image = ImageConfig {
            max_width: var("IMAGE_MAX_WIDTH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(IMAGE_MAX_WIDTH),
            max_height: var("IMAGE_MAX_HEIGHT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(IMAGE_MAX_HEIGHT),
            quality: var("IMAGE_QUALITY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(IMAGE_QUALITY),
            output_format,
        };

        let local = LocalStorageConfig {
            path: var("LOCAL_STORAGE_PATH").unwrap_or_else(|| LOCAL_STORAGE_PATH.to_string()),
            base_url: var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|| LOCAL_STORAGE_BASE_URL.to_string()),
        };

        let max_file_size_mb = var("REMOTE_STORAGE_MAX_FILE_SIZE_MB")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(REMOTE_STORAGE_MAX_FILE_SIZE_MB);
        let max_file_size_bytes = max_file_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "REMOTE_STORAGE_MAX_FILE_SIZE_MB is too large: {}",
                    max_file_size_mb
                )
            })?;

        let remote = RemoteStorageConfig {
            url: var("REMOTE_STORAGE_URL"),
            public_url: var("REMOTE_STORAGE_PUBLIC_URL"),
            bucket: var("REMOTE_STORAGE_BUCKET")
                .unwrap_or_else(|| REMOTE_STORAGE_BUCKET.to_string()),
            api_key: var("REMOTE_STORAGE_API_KEY"),
            max_file_size_bytes,
            allowed_mime_types: var("REMOTE_STORAGE_ALLOWED_MIME_TYPES")
                .unwrap_or_else(|| REMOTE_STORAGE_ALLOWED_MIME_TYPES.to_string())
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            timeout_secs: var("REMOTE_STORAGE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(REMOTE_STORAGE_TIMEOUT_SECS),
        };

        Ok(StorageConfig {
            provider: var("STORAGE_PROVIDER").map(|s| s.trim().to_string()),
            local,
            remote,
            image,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.image.max_width == 0 || self.image.max_height == 0 {
            return Err(anyhow::anyhow!(
                "IMAGE_MAX_WIDTH and IMAGE_MAX_HEIGHT must be greater than zero"
            ));
        }

        if !(1..=100).contains(&self.image.quality) {
            return Err(anyhow::anyhow!("IMAGE_QUALITY must be between 1 and 100"));
        }

        if self.local.path.trim().is_empty() {
            return Err(anyhow::anyhow!("LOCAL_STORAGE_PATH must not be empty"));
        }

        if self.remote.bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("REMOTE_STORAGE_BUCKET must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<StorageConfig, anyhow::Error> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StorageConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.provider, None);
        assert_eq!(config.local.path, "./uploads");
        assert_eq!(config.local.base_url, "/uploads");
        assert_eq!(config.image, ImageConfig::default());
        assert_eq!(config.remote.bucket, "media");
        assert_eq!(config.remote.max_file_size_bytes, 50 * 1024 * 1024);
        assert!(config
            .remote
            .allowed_mime_types
            .contains(&"video/mp4".to_string()));
        assert!(config.remote.credentials().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("STORAGE_PROVIDER", " remote "),
            ("IMAGE_MAX_WIDTH", "800"),
            ("IMAGE_MAX_HEIGHT", "600"),
            ("IMAGE_QUALITY", "70"),
            ("IMAGE_OUTPUT_FORMAT", "jpeg"),
            ("REMOTE_STORAGE_URL", "https://project.example.co"),
            ("REMOTE_STORAGE_API_KEY", "secret"),
            ("REMOTE_STORAGE_ALLOWED_MIME_TYPES", "image/webp, Video/MP4"),
        ])
        .unwrap();

        assert_eq!(config.provider.as_deref(), Some("remote"));
        assert_eq!(config.image.max_width, 800);
        assert_eq!(config.image.max_height, 600);
        assert_eq!(config.image.quality, 70);
        assert_eq!(config.image.output_format, OutputFormat::Jpeg);
        assert_eq!(
            config.remote.credentials(),
            Some(("https://project.example.co", "secret"))
        );
        assert_eq!(
            config.remote.public_base_url(),
            Some("https://project.example.co")
        );
        assert_eq!(
            config.remote.allowed_mime_types,
            vec!["image/webp".to_string(), "video/mp4".to_string()]
        );
    }

    #[test]
    fn test_unparseable_numbers_fall_back() {
        let config = config_from(&[("IMAGE_MAX_WIDTH", "wide"), ("IMAGE_QUALITY", "-3")]).unwrap();
        assert_eq!(config.image.max_width, 1200);
        assert_eq!(config.image.quality, 80);
    }

    #[test]
    fn test_max_file_size_overflow_rejected() {
        let huge = ("REMOTE_STORAGE_MAX_FILE_SIZE_MB", "18446744073709551615");
        let err = config_from(&[huge]).unwrap_err();
        assert!(err.to_string().contains("REMOTE_STORAGE_MAX_FILE_SIZE_MB"));

        let config = config_from(&[("REMOTE_STORAGE_MAX_FILE_SIZE_MB", "2048")]).unwrap();
        assert_eq!(config.remote.max_file_size_bytes, 2048 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_output_format_rejected() {
        assert!(config_from(&[("IMAGE_OUTPUT_FORMAT", "bmp")]).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_image_settings() {
        let config = config_from(&[("IMAGE_QUALITY", "0")]).unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[("IMAGE_MAX_HEIGHT", "0")]).unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[("IMAGE_QUALITY", "101")]).unwrap();
        assert!(config.validate().is_err());
    }
}
