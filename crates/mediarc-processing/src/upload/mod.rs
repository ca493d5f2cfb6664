//! Upload pipeline: validate → store → metadata → thumbnail.

pub mod pipeline;
pub mod types;

pub use pipeline::UploadPipeline;
pub use types::{CompletedUpload, UploadSource};
