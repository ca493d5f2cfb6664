//! Mediarc Media Processing Library
//!
//! This crate provides media validation, thumbnail generation, and the
//! upload pipeline that streams files to storage and derives their preview.

pub mod image;
pub mod thumbnail;
pub mod upload;
pub mod validator;
pub mod video;

// Re-export commonly used types
pub use thumbnail::ThumbnailGenerator;
pub use upload::{CompletedUpload, UploadPipeline, UploadSource};
pub use validator::{MediaValidator, ValidationError};
pub use video::{FrameExtractor, VideoProbe};
