//! Configuration module
//!
//! This module provides the configuration consumed by the storage and
//! processing crates: filesystem roots, streaming chunk size, upload size
//! limit, thumbnail target height, and the external tool paths.

use std::env;
use std::path::PathBuf;

// Common constants
const UPLOAD_CHUNK_SIZE_BYTES: usize = 1024 * 1024;
const MAX_UPLOAD_SIZE_MB: u64 = 50;
const THUMBNAIL_TARGET_HEIGHT: u32 = 720;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Root directory for persisted uploads and thumbnails.
    pub storage_root: PathBuf,
    /// Directory for per-request scratch files (video frame extraction).
    pub temp_dir: PathBuf,
    /// Fixed chunk size for streaming uploads to disk.
    pub upload_chunk_size_bytes: usize,
    /// Maximum accepted size for a single uploaded file.
    pub max_upload_size_bytes: u64,
    /// Output height for generated thumbnails; sources at or below this
    /// height are never upscaled.
    pub thumbnail_target_height: u32,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let storage_root = env::var("STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/media"));

        let temp_dir = env::var("TEMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir());

        let upload_chunk_size_bytes = env::var("UPLOAD_CHUNK_SIZE_BYTES")
            .unwrap_or_else(|_| UPLOAD_CHUNK_SIZE_BYTES.to_string())
            .parse::<usize>()
            .unwrap_or(UPLOAD_CHUNK_SIZE_BYTES);

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let thumbnail_target_height = env::var("THUMBNAIL_TARGET_HEIGHT")
            .unwrap_or_else(|_| THUMBNAIL_TARGET_HEIGHT.to_string())
            .parse::<u32>()
            .unwrap_or(THUMBNAIL_TARGET_HEIGHT);

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "jpg,jpeg,png,gif,webp,mp4,webm,pdf".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| {
                "image/jpeg,image/png,image/gif,image/webp,video/mp4,video/webm,application/pdf"
                    .to_string()
            })
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let config = Config {
            storage_root,
            temp_dir,
            upload_chunk_size_bytes,
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            thumbnail_target_height,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            allowed_extensions,
            allowed_content_types,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload_chunk_size_bytes == 0 {
            return Err(anyhow::anyhow!("UPLOAD_CHUNK_SIZE_BYTES must be non-zero"));
        }
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be non-zero"));
        }
        if self.thumbnail_target_height == 0 {
            return Err(anyhow::anyhow!("THUMBNAIL_TARGET_HEIGHT must be non-zero"));
        }
        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }
        Ok(())
    }
}
