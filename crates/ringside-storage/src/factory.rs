use crate::driver::StorageDriver;
use crate::local::LocalStorage;
#[cfg(feature = "storage-remote")]
use crate::remote::RemoteStorage;
use crate::{StorageError, StorageResult};
use ringside_core::{StorageConfig, StorageProvider};
use ringside_processing::ImageTransformer;

/// Picks the storage driver from configuration.
///
/// Selection never fails: unknown tags, the `s3` placeholder and an incomplete
/// remote configuration all fall back to the local filesystem with a warning.
#[derive(Debug, Clone)]
pub struct StorageSelector {
    config: StorageConfig,
    transformer: ImageTransformer,
}

impl StorageSelector {
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let transformer = ImageTransformer::new(&config.image)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        Ok(StorageSelector {
            config,
            transformer,
        })
    }

    /// Driver for the configured `STORAGE_PROVIDER`
    pub fn select_default(&self) -> StorageDriver {
        self.select(self.config.provider.as_deref())
    }

    /// Driver for an explicit provider tag. Performs no I/O.
    pub fn select(&self, tag: Option<&str>) -> StorageDriver {
        let provider = match tag {
            Some(tag) => match tag.parse::<StorageProvider>() {
                Ok(provider) => provider,
                Err(e) => {
                    tracing::warn!(
                        provider = %tag,
                        error = %e,
                        "Unknown storage provider, falling back to local storage"
                    );
                    StorageProvider::Local
                }
            },
            None => StorageProvider::Local,
        };

        match provider {
            StorageProvider::Local => self.local(),

            #[cfg(feature = "storage-remote")]
            StorageProvider::Remote => {
                match RemoteStorage::new(&self.config.remote, self.transformer.clone()) {
                    Ok(storage) => {
                        tracing::info!(
                            bucket = %storage.bucket(),
                            "Using remote object storage"
                        );
                        StorageDriver::Remote(storage)
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "Remote storage not configured, falling back to local storage"
                        );
                        self.local()
                    }
                }
            }

            #[cfg(not(feature = "storage-remote"))]
            StorageProvider::Remote => {
                tracing::warn!(
                    "Remote storage not compiled in (storage-remote), falling back to local storage"
                );
                self.local()
            }

            StorageProvider::S3 => {
                tracing::warn!(
                    "S3 storage is not implemented yet, falling back to local storage"
                );
                self.local()
            }
        }
    }

    fn local(&self) -> StorageDriver {
        tracing::info!(
            path = %self.config.local.path,
            base_url = %self.config.local.base_url,
            "Using local filesystem storage"
        );
        StorageDriver::Local(LocalStorage::new(
            &self.config.local.path,
            &self.config.local.base_url,
            self.transformer.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Storage;
    use ringside_core::{ImageConfig, LocalStorageConfig, RemoteStorageConfig};

    fn config(
        provider: Option<&str>,
        remote_url: Option<&str>,
        remote_key: Option<&str>,
    ) -> StorageConfig {
        StorageConfig {
            provider: provider.map(String::from),
            local: LocalStorageConfig {
                path: "./uploads".to_string(),
                base_url: "/uploads".to_string(),
            },
            remote: RemoteStorageConfig {
                url: remote_url.map(String::from),
                public_url: None,
                bucket: "media".to_string(),
                api_key: remote_key.map(String::from),
                max_file_size_bytes: 50 * 1024 * 1024,
                allowed_mime_types: Vec::new(),
                timeout_secs: 60,
            },
            image: ImageConfig::default(),
        }
    }

    #[test]
    fn test_default_is_local() {
        let selector = StorageSelector::new(config(None, None, None)).unwrap();
        assert_eq!(selector.select_default().provider(), StorageProvider::Local);
    }

    #[test]
    fn test_unknown_tag_falls_back_to_local() {
        let selector = StorageSelector::new(config(Some("ftp"), None, None)).unwrap();
        let driver = selector.select_default();
        assert_eq!(driver.provider(), StorageProvider::Local);
        assert_eq!(driver.get_url("k.webp"), "/uploads/k.webp");
    }

    #[test]
    fn test_s3_placeholder_falls_back_to_local() {
        let selector = StorageSelector::new(config(None, None, None)).unwrap();
        assert_eq!(
            selector.select(Some("s3")).provider(),
            StorageProvider::Local
        );
    }

    #[test]
    fn test_remote_without_credentials_falls_back_to_local() {
        let cfg = config(Some("remote"), Some("https://p.example.co"), None);
        let selector = StorageSelector::new(cfg).unwrap();
        assert_eq!(selector.select_default().provider(), StorageProvider::Local);
    }

    #[cfg(feature = "storage-remote")]
    #[test]
    fn test_remote_selected_when_configured() {
        let selector = StorageSelector::new(config(
            Some("Supabase"),
            Some("https://p.example.co"),
            Some("service-key"),
        ))
        .unwrap();
        let driver = selector.select_default();
        assert_eq!(driver.provider(), StorageProvider::Remote);
        assert_eq!(
            driver.get_url("avatars/a.webp"),
            "https://p.example.co/storage/v1/object/public/media/avatars/a.webp"
        );
    }

    #[test]
    fn test_invalid_image_config_is_rejected() {
        let mut cfg = config(None, None, None);
        cfg.image.quality = 0;
        assert!(matches!(
            StorageSelector::new(cfg),
            Err(StorageError::ConfigError(_))
        ));
    }
}
