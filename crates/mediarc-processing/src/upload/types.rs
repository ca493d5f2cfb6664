//! Types for the upload pipeline.

use serde_json::Value;
use uuid::Uuid;

use mediarc_core::StoredFile;

/// One incoming file: a declared name and content type plus the byte stream.
/// The reader may already have been partially consumed; the receiver rewinds
/// it before storing.
pub struct UploadSource<R> {
    pub filename: String,
    pub content_type: String,
    pub reader: R,
}

impl<R> UploadSource<R> {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, reader: R) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            reader,
        }
    }
}

/// Result of a completed upload: stored file records, the validated metadata
/// (if any), and where the thumbnail landed (if one could be generated).
#[derive(Debug, Clone)]
pub struct CompletedUpload {
    pub upload_id: Uuid,
    pub files: Vec<StoredFile>,
    pub metadata: Option<Value>,
    pub thumbnail_key: Option<String>,
}

impl CompletedUpload {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }
}
