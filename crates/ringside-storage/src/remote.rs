//! Remote object store driver
//!
//! Speaks the Supabase Storage REST API: objects live in a single bucket and
//! are served publicly from `{public_url}/storage/v1/object/public/{bucket}/{key}`.

use crate::keys;
use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use ringside_core::{AssetDescriptor, RemoteStorageConfig, StorageProvider, UploadOptions};
use ringside_processing::ImageTransformer;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::time::Duration;

const OBJECT_CACHE_CONTROL: &str = "max-age=3600";

/// Container-level settings applied when the bucket is provisioned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPolicy {
    pub public: bool,
    pub allowed_mime_types: Vec<String>,
    pub file_size_limit: u64,
}

/// Remote object store implementation
#[derive(Clone)]
pub struct RemoteStorage {
    client: reqwest::Client,
    api_url: String,
    public_url: String,
    bucket: String,
    api_key: String,
    policy: BucketPolicy,
    transformer: ImageTransformer,
}

impl Debug for RemoteStorage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RemoteStorage")
            .field("api_url", &self.api_url)
            .field("public_url", &self.public_url)
            .field("bucket", &self.bucket)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct CreateBucketRequest<'a> {
    id: &'a str,
    name: &'a str,
    public: bool,
    allowed_mime_types: &'a [String],
    file_size_limit: u64,
}

/// Error body returned by the storage API
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default, rename = "statusCode")]
    status_code: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// A non-success response, normalized
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    code: Option<String>,
    error: Option<String>,
    message: String,
}

impl ApiError {
    async fn from_response(response: Response) -> Self {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();

        let code = body.status_code.map(|value| match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        let message = body
            .message
            .or_else(|| body.error.clone())
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            });

        ApiError {
            status,
            code,
            error: body.error,
            message,
        }
    }

    fn has_code(&self, code: u16) -> bool {
        self.status.as_u16() == code || self.code.as_deref() == Some(code.to_string().as_str())
    }

    fn is_not_found(&self) -> bool {
        self.has_code(404)
            || self.error.as_deref().is_some_and(|e| {
                e.eq_ignore_ascii_case("not_found") || e.eq_ignore_ascii_case("not found")
            })
    }

    fn mentions_bucket(&self) -> bool {
        self.message.to_lowercase().contains("bucket")
            || self
                .error
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains("bucket"))
    }

    /// Not found at object level. A missing bucket does not count.
    fn is_object_not_found(&self) -> bool {
        self.is_not_found() && !self.mentions_bucket()
    }

    fn is_conflict(&self) -> bool {
        self.has_code(409)
            || self
                .error
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case("duplicate"))
            || self.message.to_lowercase().contains("already exists")
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl RemoteStorage {
    /// Create a new RemoteStorage instance. Performs no I/O.
    ///
    /// Fails with `ConfigError` when the API URL or key is missing.
    pub fn new(config: &RemoteStorageConfig, transformer: ImageTransformer) -> StorageResult<Self> {
        let (api_url, api_key) = config.credentials().ok_or_else(|| {
            StorageError::ConfigError(
                "REMOTE_STORAGE_URL and REMOTE_STORAGE_API_KEY must be set".to_string(),
            )
        })?;
        let public_url = config.public_base_url().unwrap_or(api_url);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(RemoteStorage {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            api_key: api_key.to_string(),
            policy: BucketPolicy {
                public: true,
                allowed_mime_types: config.allowed_mime_types.clone(),
                file_size_limit: config.max_file_size_bytes,
            },
            transformer,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn policy(&self) -> &BucketPolicy {
        &self.policy
    }

    fn object_endpoint(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/storage/v1/object/{}/{}",
            self.api_url,
            urlencoding::encode(&self.bucket),
            encoded.join("/")
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("apikey", &self.api_key)
    }

    /// Upload without overwrite; a colliding key is rejected by the backend.
    async fn upload_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let size = data.len();

        let response = self
            .authorized(self.client.post(self.object_endpoint(key)))
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, OBJECT_CACHE_CONTROL)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Remote upload request failed"
                );
                StorageError::BackendError(e.to_string())
            })?;

        if !response.status().is_success() {
            let error = ApiError::from_response(response).await;
            tracing::error!(
                error = %error,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Remote upload failed"
            );
            if error.is_conflict() {
                return Err(StorageError::UploadFailed(format!(
                    "object {} already exists",
                    key
                )));
            }
            return Err(StorageError::UploadFailed(error.to_string()));
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote upload successful"
        );

        Ok(())
    }

    async fn persist(
        &self,
        key: String,
        data: Vec<u8>,
        mime_type: String,
    ) -> StorageResult<AssetDescriptor> {
        let size = data.len() as u64;
        self.upload_object(&key, data, &mime_type).await?;
        let url = self.get_url(&key);

        Ok(AssetDescriptor {
            key,
            url,
            size,
            mime_type,
        })
    }

    /// Check whether the configured bucket exists.
    pub async fn check_bucket(&self) -> StorageResult<bool> {
        let url = format!(
            "{}/storage/v1/bucket/{}",
            self.api_url,
            urlencoding::encode(&self.bucket)
        );
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        if response.status().is_success() {
            return Ok(true);
        }

        let error = ApiError::from_response(response).await;
        if error.is_not_found() {
            return Ok(false);
        }
        Err(StorageError::BackendError(format!(
            "Failed to look up bucket {}: {}",
            self.bucket, error
        )))
    }

    /// Create the bucket as public-read with the configured MIME allow-list
    /// and object size limit. An existing bucket is left untouched.
    pub async fn create_bucket(&self) -> StorageResult<()> {
        let body = CreateBucketRequest {
            id: &self.bucket,
            name: &self.bucket,
            public: self.policy.public,
            allowed_mime_types: &self.policy.allowed_mime_types,
            file_size_limit: self.policy.file_size_limit,
        };

        let url = format!("{}/storage/v1/bucket", self.api_url);
        let response = self
            .authorized(self.client.post(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        if response.status().is_success() {
            tracing::info!(
                bucket = %self.bucket,
                allowed_mime_types = ?self.policy.allowed_mime_types,
                file_size_limit = self.policy.file_size_limit,
                "Remote bucket created"
            );
            return Ok(());
        }

        let error = ApiError::from_response(response).await;
        if error.is_conflict() {
            tracing::info!(bucket = %self.bucket, "Remote bucket already exists");
            return Ok(());
        }
        Err(StorageError::BackendError(format!(
            "Failed to create bucket {}: {}",
            self.bucket, error
        )))
    }

    /// Provision the bucket if missing. Returns `true` when it was created.
    pub async fn ensure_bucket(&self) -> StorageResult<bool> {
        if self.check_bucket().await? {
            tracing::debug!(bucket = %self.bucket, "Remote bucket present");
            return Ok(false);
        }
        self.create_bucket().await?;
        Ok(true)
    }
}

#[async_trait]
impl Storage for RemoteStorage {
    async fn store(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        mime_type: &str,
        options: &UploadOptions,
    ) -> StorageResult<AssetDescriptor> {
        let key = keys::build_key(options, Some(self.transformer.output_format().extension()))?;

        tracing::debug!(
            original_filename = %original_filename,
            source_mime_type = %mime_type,
            input_bytes = data.len(),
            "Transforming image for remote storage"
        );

        let transformer = self.transformer.clone();
        let transformed = tokio::task::spawn_blocking(move || transformer.transform(&data))
            .await
            .map_err(|e| {
                StorageError::BackendError(format!("Image processing task failed: {}", e))
            })??;

        let mime_type = transformed.mime_type().to_string();
        let data = transformed.data.to_vec();
        self.persist(key, data, mime_type).await
    }

    async fn store_raw(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        mime_type: &str,
        options: &UploadOptions,
    ) -> StorageResult<AssetDescriptor> {
        keys::validate_mime_type(mime_type)?;
        let extension = keys::extension_of(original_filename)?;
        let key = keys::build_key(options, extension.as_deref())?;

        self.persist(key, data, mime_type.to_string()).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        keys::validate_key(storage_key)?;
        let start = std::time::Instant::now();

        let response = self
            .authorized(self.client.delete(self.object_endpoint(storage_key)))
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        if response.status().is_success() {
            tracing::info!(
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Remote delete successful"
            );
            return Ok(());
        }

        let error = ApiError::from_response(response).await;
        if error.is_object_not_found() {
            tracing::info!(
                bucket = %self.bucket,
                key = %storage_key,
                "Remote delete: object already absent"
            );
            return Ok(());
        }

        tracing::error!(
            error = %error,
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote delete failed"
        );
        Err(StorageError::DeleteFailed(error.to_string()))
    }

    fn get_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.public_url, self.bucket, key
        )
    }

    fn provider(&self) -> StorageProvider {
        StorageProvider::Remote
    }
}
