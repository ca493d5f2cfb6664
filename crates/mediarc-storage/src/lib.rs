//! Mediarc Storage Library
//!
//! Local-filesystem persistence for uploads: the chunked, size-limited
//! streaming receiver and the key-addressed storage backend.
//!
//! # Storage key format
//!
//! Everything belonging to one upload lives under `uploads/{upload_id}/`:
//!
//! - streamed files: `uploads/{upload_id}/files/{generated}.{ext}`
//! - generated thumbnail: `uploads/{upload_id}/thumbnail.jpg`
//! - metadata backup: `uploads/{upload_id}/metadata.json`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is
//! centralized in the `keys` module.

pub mod error;
pub mod keys;
pub mod local;
pub mod receiver;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use local::LocalStorage;
pub use receiver::UploadReceiver;
