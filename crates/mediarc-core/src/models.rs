//! Shared model types for uploads and stored files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse media classification derived from a declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    pub fn from_content_type(content_type: &str) -> Self {
        let normalized = content_type.to_lowercase();
        match normalized.split('/').next() {
            Some("image") => MediaKind::Image,
            Some("video") => MediaKind::Video,
            _ => MediaKind::Other,
        }
    }

    pub fn is_image(self) -> bool {
        self == MediaKind::Image
    }
}

/// Record produced for each file streamed to disk. The enclosing service
/// persists this alongside the upload row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub upload_id: Uuid,
    pub original_filename: String,
    pub generated_filename: String,
    pub extension: String,
    pub content_type: String,
    /// Storage key of the file relative to the storage root.
    pub storage_key: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}
