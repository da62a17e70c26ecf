//! Media storage facade, built once at startup and shared by every caller.

use crate::driver::StorageDriver;
use crate::factory::StorageSelector;
use crate::traits::{Storage, StorageResult};
use async_trait::async_trait;
use ringside_core::{AssetDescriptor, StorageConfig, StorageProvider, UploadOptions};
use std::sync::Arc;

/// Storage facade over the selected driver
#[derive(Debug, Clone)]
pub struct MediaStorage {
    driver: Arc<StorageDriver>,
}

impl MediaStorage {
    pub fn new(driver: StorageDriver) -> Self {
        Self {
            driver: Arc::new(driver),
        }
    }

    /// Select the configured driver. Fails only on invalid image settings.
    pub fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        tracing::info!("Initializing media storage...");
        let driver = StorageSelector::new(config.clone())?.select_default();
        tracing::info!(
            provider = %driver.provider(),
            "Media storage initialized"
        );
        Ok(Self::new(driver))
    }

    pub fn driver(&self) -> &StorageDriver {
        &self.driver
    }

    /// Make sure the backing container exists. See [`StorageDriver::provision`].
    pub async fn provision(&self) -> StorageResult<bool> {
        self.driver.provision().await
    }
}

#[async_trait]
impl Storage for MediaStorage {
    async fn store(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        mime_type: &str,
        options: &UploadOptions,
    ) -> StorageResult<AssetDescriptor> {
        self.driver
            .store(data, original_filename, mime_type, options)
            .await
    }

    async fn store_raw(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        mime_type: &str,
        options: &UploadOptions,
    ) -> StorageResult<AssetDescriptor> {
        self.driver
            .store_raw(data, original_filename, mime_type, options)
            .await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.driver.delete(storage_key).await
    }

    fn get_url(&self, key: &str) -> String {
        self.driver.get_url(key)
    }

    fn provider(&self) -> StorageProvider {
        self.driver.provider()
    }
}
