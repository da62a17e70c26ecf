use ringside_infra::{init_telemetry, LogFormat, TelemetryConfig};
use ringside_storage::{MediaStorage, Storage, StorageDriver};
use serde_json::{json, Value};
use std::path::Path;

/// Guess an image MIME type from a file extension.
pub fn guess_image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// File name component, or the whole path when it has none.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Where the active driver puts assets, for `provision` output.
pub fn describe_target(storage: &MediaStorage) -> Value {
    match storage.driver() {
        StorageDriver::Local(local) => json!({
            "provider": storage.provider().to_string(),
            "path": local.base_path().display().to_string(),
        }),
        StorageDriver::Remote(remote) => json!({
            "provider": storage.provider().to_string(),
            "bucket": remote.bucket(),
            "public": remote.policy().public,
            "allowedMimeTypes": remote.policy().allowed_mime_types,
            "fileSizeLimit": remote.policy().file_size_limit,
        }),
    }
}

/// Initialize tracing for CLI binaries. `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() -> anyhow::Result<()> {
    let format = match std::env::var("LOG_FORMAT") {
        Ok(value) => value.parse()?,
        Err(_) => LogFormat::Pretty,
    };

    init_telemetry(&TelemetryConfig {
        service_name: "ringside-media".to_string(),
        format,
        default_filter: "warn,ringside_storage=info".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringside_core::StorageConfig;

    #[test]
    fn guess_image_mime_type_known() {
        assert_eq!(
            guess_image_mime_type(Path::new("a.JPG")),
            Some("image/jpeg")
        );
        assert_eq!(
            guess_image_mime_type(Path::new("dir/a.webp")),
            Some("image/webp")
        );
    }

    #[test]
    fn guess_image_mime_type_unknown() {
        assert_eq!(guess_image_mime_type(Path::new("clip.mp4")), None);
        assert_eq!(guess_image_mime_type(Path::new("README")), None);
    }

    #[test]
    fn file_name_of_strips_directories() {
        assert_eq!(file_name_of(Path::new("/tmp/photos/me.png")), "me.png");
        assert_eq!(file_name_of(Path::new("clip.mp4")), "clip.mp4");
    }

    #[test]
    fn describe_target_local() {
        let config = StorageConfig::from_lookup(|key| match key {
            "LOCAL_STORAGE_PATH" => Some("/srv/ringside/uploads".to_string()),
            _ => None,
        })
        .unwrap();
        let storage = MediaStorage::from_config(&config).unwrap();

        let target = describe_target(&storage);
        assert_eq!(target["provider"], "local");
        assert_eq!(target["path"], "/srv/ringside/uploads");
    }

    #[test]
    fn describe_target_remote() {
        let config = StorageConfig::from_lookup(|key| match key {
            "STORAGE_PROVIDER" => Some("remote".to_string()),
            "REMOTE_STORAGE_URL" => Some("https://project.example.co".to_string()),
            "REMOTE_STORAGE_API_KEY" => Some("service-key".to_string()),
            "REMOTE_STORAGE_BUCKET" => Some("club-media".to_string()),
            _ => None,
        })
        .unwrap();
        let storage = MediaStorage::from_config(&config).unwrap();

        let target = describe_target(&storage);
        assert_eq!(target["provider"], "remote");
        assert_eq!(target["bucket"], "club-media");
        assert_eq!(target["public"], true);
        assert_eq!(target["fileSizeLimit"], 50 * 1024 * 1024);
    }
}
