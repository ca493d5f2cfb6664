//! Shared key generation for upload storage.
//!
//! Key format: everything belonging to one upload lives under
//! `uploads/{upload_id}/` — streamed files under `files/`, the generated
//! thumbnail and the metadata backup at the top of the upload directory.

use chrono::Utc;
use uuid::Uuid;

/// Generate a filename for a streamed file: microsecond UTC timestamp plus
/// the file's index within the upload batch (unique within one upload).
pub fn generate_filename(index: usize) -> String {
    format!("{}_{}", Utc::now().timestamp_micros(), index)
}

/// Storage key for an uploaded file.
pub fn upload_file_key(upload_id: Uuid, filename: &str, extension: &str) -> String {
    if extension.is_empty() {
        format!("uploads/{}/files/{}", upload_id, filename)
    } else {
        format!("uploads/{}/files/{}.{}", upload_id, filename, extension)
    }
}

/// Storage key for an upload's generated thumbnail.
pub fn thumbnail_key(upload_id: Uuid) -> String {
    format!("uploads/{}/thumbnail.jpg", upload_id)
}

/// Storage key for an upload's pretty-printed metadata backup.
pub fn metadata_backup_key(upload_id: Uuid) -> String {
    format!("uploads/{}/metadata.json", upload_id)
}
