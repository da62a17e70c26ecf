//! Ringside media CLI: store, delete and resolve assets against the configured backend.
//!
//! Configuration is read from the environment (and `.env`). See `StorageConfig::from_env`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use ringside_cli::{describe_target, file_name_of, guess_image_mime_type, init_tracing};
use ringside_core::{StorageConfig, UploadOptions};
use ringside_storage::{MediaStorage, Storage, StorageSelector};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ringside-media", about = "Ringside media storage CLI")]
struct Cli {
    /// Override STORAGE_PROVIDER: local, remote
    #[arg(long, global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform an image and store it
    Store {
        /// Path to the image file
        file: PathBuf,
        /// Target directory, e.g. avatars
        #[arg(long)]
        dir: Option<String>,
    },
    /// Store a file verbatim (e.g. video)
    StoreRaw {
        /// Path to the file
        file: PathBuf,
        /// Declared MIME type, e.g. video/mp4
        #[arg(long)]
        mime: String,
        /// Target directory, e.g. videos
        #[arg(long)]
        dir: Option<String>,
    },
    /// Delete an asset by key
    Delete {
        /// Storage key
        key: String,
    },
    /// Print the public URL of a key
    Url {
        /// Storage key
        key: String,
    },
    /// Create the remote bucket if it does not exist
    Provision,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn upload_options(dir: Option<String>) -> UploadOptions {
    UploadOptions { directory: dir }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();

    let config = StorageConfig::from_env().context("Failed to load storage configuration")?;
    config.validate()?;

    let storage = match cli.provider.as_deref() {
        Some(provider) => MediaStorage::new(StorageSelector::new(config)?.select(Some(provider))),
        None => MediaStorage::from_config(&config)?,
    };

    match cli.command {
        Commands::Store { file, dir } => {
            tracing::info!(file = %file.display(), dir = ?dir, "Storing image");
            let mime_type = guess_image_mime_type(&file).unwrap_or("application/octet-stream");
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let descriptor = storage
                .store(data, &file_name_of(&file), mime_type, &upload_options(dir))
                .await?;
            print_json(&descriptor)?;
        }
        Commands::StoreRaw { file, mime, dir } => {
            tracing::info!(
                file = %file.display(),
                mime_type = %mime,
                dir = ?dir,
                "Storing raw file"
            );
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let descriptor = storage
                .store_raw(data, &file_name_of(&file), &mime, &upload_options(dir))
                .await?;
            print_json(&descriptor)?;
        }
        Commands::Delete { key } => {
            tracing::info!(key = %key, "Deleting asset");
            storage.delete(&key).await?;
            print_json(&serde_json::json!({ "success": true, "key": key }))?;
        }
        Commands::Url { key } => {
            print_json(&serde_json::json!({ "key": key, "url": storage.get_url(&key) }))?;
        }
        Commands::Provision => {
            tracing::info!(provider = %storage.provider(), "Provisioning storage");
            let created = storage.provision().await?;
            let mut output = describe_target(&storage);
            output["created"] = serde_json::Value::Bool(created);
            print_json(&output)?;
        }
    }

    Ok(())
}
