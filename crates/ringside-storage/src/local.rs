use crate::keys;
use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use ringside_core::{AssetDescriptor, StorageProvider, UploadOptions};
use ringside_processing::ImageTransformer;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    transformer: ImageTransformer,
}

impl LocalStorage {
    /// Create a new LocalStorage instance. Performs no I/O: directories are
    /// created on first write.
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/ringside/uploads")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/uploads")
    /// * `transformer` - Image pipeline applied by `store`
    pub fn new(
        base_path: impl Into<PathBuf>,
        base_url: impl Into<String>,
        transformer: ImageTransformer,
    ) -> Self {
        LocalStorage {
            base_path: base_path.into(),
            base_url: base_url.into(),
            transformer,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// The key is validated first, then the resolved path is checked to stay
    /// inside the base directory after symlink resolution. Containment is
    /// derived on every call.
    async fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        keys::validate_key(storage_key)?;

        if Path::new(storage_key)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(StorageError::InvalidPath(
                "Storage key contains invalid path components".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);

        let base_resolved = resolve_existing_prefix(&self.base_path).await;
        let path_resolved = resolve_existing_prefix(&path).await;

        if !path_resolved.starts_with(&base_resolved) || path_resolved == base_resolved {
            tracing::warn!(
                key = %storage_key,
                resolved = %path_resolved.display(),
                "Storage key resolves outside storage directory"
            );
            return Err(StorageError::InvalidPath(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    ///
    /// `create_dir_all` treats an already existing directory as success, so
    /// concurrent uploads into the same new directory do not fail each other.
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write a new file; never overwrites an existing one.
    async fn write_new_file(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        self.ensure_parent_dir(path).await?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let written = async {
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            // Leave no partial file behind
            drop(file);
            if let Err(cleanup) = fs::remove_file(path).await {
                tracing::warn!(
                    path = %path.display(),
                    error = %cleanup,
                    "Failed to remove partially written file"
                );
            }
            return Err(StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            )));
        }

        Ok(())
    }

    async fn persist(
        &self,
        key: String,
        data: &[u8],
        mime_type: String,
        start: std::time::Instant,
    ) -> StorageResult<AssetDescriptor> {
        let path = self.key_to_path(&key).await?;
        self.write_new_file(&path, data).await?;

        let url = self.generate_url(&key);
        let size = data.len() as u64;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            mime_type = %mime_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(AssetDescriptor {
            key,
            url,
            size,
            mime_type,
        })
    }

    /// Check whether a key is present on disk.
    pub async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key).await?;
        Ok(fs::try_exists(&path).await?)
    }
}

/// Resolve symlinks in the longest existing prefix of `path` and re-append
/// the components that do not exist yet.
async fn resolve_existing_prefix(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        if let Ok(canonical) = fs::canonicalize(&existing).await {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc, part| acc.join(part));
        }

        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = if parent.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    parent.to_path_buf()
                };
            }
            _ => return path.to_path_buf(),
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        mime_type: &str,
        options: &UploadOptions,
    ) -> StorageResult<AssetDescriptor> {
        let start = std::time::Instant::now();
        let key = keys::build_key(options, Some(self.transformer.output_format().extension()))?;
        // Containment is checked before any decode or write
        self.key_to_path(&key).await?;

        tracing::debug!(
            original_filename = %original_filename,
            source_mime_type = %mime_type,
            input_bytes = data.len(),
            "Transforming image for local storage"
        );

        let transformer = self.transformer.clone();
        let transformed = tokio::task::spawn_blocking(move || transformer.transform(&data))
            .await
            .map_err(|e| {
                StorageError::BackendError(format!("Image processing task failed: {}", e))
            })??;

        self.persist(
            key,
            &transformed.data,
            transformed.mime_type().to_string(),
            start,
        )
        .await
    }

    async fn store_raw(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        mime_type: &str,
        options: &UploadOptions,
    ) -> StorageResult<AssetDescriptor> {
        let start = std::time::Instant::now();
        keys::validate_mime_type(mime_type)?;
        let extension = keys::extension_of(original_filename)?;
        let key = keys::build_key(options, extension.as_deref())?;

        self.persist(key, &data, mime_type.to_string(), start).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key).await?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage delete successful"
                );
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    key = %storage_key,
                    "Local storage delete: file already absent"
                );
                Ok(())
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn get_url(&self, key: &str) -> String {
        self.generate_url(key)
    }

    fn provider(&self) -> StorageProvider {
        StorageProvider::Local
    }
}
