use crate::local::LocalStorage;
#[cfg(feature = "storage-remote")]
use crate::remote::RemoteStorage;
use crate::traits::{Storage, StorageResult};
use async_trait::async_trait;
use ringside_core::{AssetDescriptor, StorageProvider, UploadOptions};

/// A concrete, selected storage driver
#[derive(Debug, Clone)]
pub enum StorageDriver {
    Local(LocalStorage),
    #[cfg(feature = "storage-remote")]
    Remote(RemoteStorage),
}

impl StorageDriver {
    fn inner(&self) -> &dyn Storage {
        match self {
            StorageDriver::Local(storage) => storage,
            #[cfg(feature = "storage-remote")]
            StorageDriver::Remote(storage) => storage,
        }
    }

    /// Make sure the backing container exists.
    ///
    /// Local storage creates directories lazily on write, so this is a no-op there.
    /// Returns `true` when a remote bucket was created.
    pub async fn provision(&self) -> StorageResult<bool> {
        match self {
            StorageDriver::Local(_) => Ok(false),
            #[cfg(feature = "storage-remote")]
            StorageDriver::Remote(storage) => storage.ensure_bucket().await,
        }
    }
}

#[async_trait]
impl Storage for StorageDriver {
    async fn store(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        mime_type: &str,
        options: &UploadOptions,
    ) -> StorageResult<AssetDescriptor> {
        self.inner()
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
        self.inner()
            .store_raw(data, original_filename, mime_type, options)
            .await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.inner().delete(storage_key).await
    }

    fn get_url(&self, key: &str) -> String {
        self.inner().get_url(key)
    }

    fn provider(&self) -> StorageProvider {
        self.inner().provider()
    }
}
