//! Upload pipeline: validate → store → metadata → thumbnail.
//!
//! The canonical flow for a batch of uploaded files: each file's declaration
//! is validated, its stream lands on disk through the size-limited receiver,
//! attached metadata is validated and backed up next to the files, and a
//! thumbnail is generated from the user-supplied source or the first
//! image-typed file.

use std::sync::Arc;

use chrono::Utc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use uuid::Uuid;

use mediarc_core::{AppError, Config, MediaKind, MetadataKind, StoredFile};
use mediarc_storage::{keys, LocalStorage};

use super::types::{CompletedUpload, UploadSource};
use crate::thumbnail::{ThumbnailGenerator, STILL_IMAGE_TYPES};
use crate::validator::MediaValidator;

fn sanitize_filename(filename: &str) -> String {
    const MAX: usize = 255;
    let path = std::path::Path::new(filename);
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    if base.contains("..") {
        return "invalid_filename".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim().is_empty() || s.len() < 3 {
        "file".to_string()
    } else {
        s
    }
}

fn extension_of(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

pub struct UploadPipeline {
    storage: Arc<LocalStorage>,
    validator: MediaValidator,
    thumbnails: ThumbnailGenerator,
    max_upload_size: u64,
}

impl UploadPipeline {
    pub fn new(config: &Config, storage: Arc<LocalStorage>) -> Result<Self, AppError> {
        let validator = MediaValidator::new(
            config.max_upload_size_bytes,
            config.allowed_extensions.clone(),
            config.allowed_content_types.clone(),
        );

        let thumbnails = ThumbnailGenerator::new(
            config.thumbnail_target_height,
            &config.temp_dir,
            &config.ffmpeg_path,
            &config.ffprobe_path,
        )?;

        Ok(Self {
            storage,
            validator,
            thumbnails,
            max_upload_size: config.max_upload_size_bytes,
        })
    }

    /// Run the upload pipeline for one upload batch.
    ///
    /// Files are streamed to `uploads/{upload_id}/files/`; metadata is
    /// validated against its kind's schema and backed up as pretty-printed
    /// JSON; the thumbnail source is the explicit `user_thumbnail` when
    /// given (still images only), otherwise the first `image/*` file.
    #[tracing::instrument(skip(self, files, metadata, user_thumbnail), fields(file_count = files.len()))]
    pub async fn store_upload<R>(
        &self,
        upload_id: Uuid,
        files: Vec<UploadSource<R>>,
        metadata: Option<(MetadataKind, String)>,
        user_thumbnail: Option<UploadSource<R>>,
    ) -> Result<CompletedUpload, AppError>
    where
        R: AsyncRead + AsyncSeek + Send + Unpin,
    {
        if files.is_empty() {
            return Err(AppError::BadRequest(
                "Upload must contain at least one file".to_string(),
            ));
        }

        let mut stored = Vec::with_capacity(files.len());

        for (index, mut source) in files.into_iter().enumerate() {
            self.validator
                .validate_declaration(&source.filename, &source.content_type)?;

            let extension = extension_of(&source.filename);
            let generated_filename = keys::generate_filename(index);
            let storage_key = keys::upload_file_key(upload_id, &generated_filename, &extension);

            let bytes_written = self
                .storage
                .receive_stream(&storage_key, &mut source.reader, self.max_upload_size)
                .await?;

            self.validator.validate_file_size(bytes_written)?;

            stored.push(StoredFile {
                upload_id,
                original_filename: sanitize_filename(&source.filename),
                generated_filename,
                extension,
                content_type: source.content_type.to_lowercase(),
                storage_key,
                size_bytes: bytes_written,
                created_at: Utc::now(),
            });
        }

        let validated_metadata = match metadata {
            Some((kind, raw)) => {
                let value = mediarc_core::validate_metadata(kind, &raw)?;
                let backup = serde_json::to_string_pretty(&value)
                    .map_err(|e| AppError::Internal(format!("Failed to render metadata: {}", e)))?;
                self.storage
                    .upload(&keys::metadata_backup_key(upload_id), backup.into_bytes())
                    .await?;
                Some(value)
            }
            None => None,
        };

        let thumbnail_key = self
            .generate_thumbnail(upload_id, &stored, user_thumbnail)
            .await?;

        tracing::info!(
            upload_id = %upload_id,
            file_count = stored.len(),
            total_bytes = stored.iter().map(|f| f.size_bytes).sum::<u64>(),
            thumbnail = thumbnail_key.is_some(),
            "Upload stored"
        );

        Ok(CompletedUpload {
            upload_id,
            files: stored,
            metadata: validated_metadata,
            thumbnail_key,
        })
    }

    /// Pick the thumbnail source and generate `uploads/{id}/thumbnail.jpg`.
    /// Returns the thumbnail's storage key, or `None` when no source among
    /// the uploads can be thumbnailed.
    async fn generate_thumbnail<R>(
        &self,
        upload_id: Uuid,
        stored: &[StoredFile],
        user_thumbnail: Option<UploadSource<R>>,
    ) -> Result<Option<String>, AppError>
    where
        R: AsyncRead + AsyncSeek + Send + Unpin,
    {
        let (content_type, data) = match user_thumbnail {
            Some(mut source) => {
                // User-supplied thumbnails must already be a still image.
                if !STILL_IMAGE_TYPES.contains(&source.content_type.to_lowercase().as_str()) {
                    return Err(AppError::BadRequest(
                        "Thumbnail must be 'image/jpeg', 'image/png' or 'image/webp'".to_string(),
                    ));
                }
                let mut data = Vec::new();
                source.reader.rewind().await?;
                source.reader.read_to_end(&mut data).await?;
                (source.content_type, data)
            }
            None => {
                let Some(file) = stored
                    .iter()
                    .find(|f| MediaKind::from_content_type(&f.content_type).is_image())
                else {
                    return Ok(None);
                };
                let data = self.storage.download(&file.storage_key).await?;
                (file.content_type.clone(), data)
            }
        };

        let key = keys::thumbnail_key(upload_id);
        let destination = self.storage.key_to_path(&key)?;

        let generated = self
            .thumbnails
            .generate(&content_type, data, &destination)
            .await?;

        Ok(generated.then_some(key))
    }
}
