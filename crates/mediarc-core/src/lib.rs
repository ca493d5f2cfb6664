//! Mediarc Core Library
//!
//! This crate provides configuration, error types, metadata kinds/validation,
//! and shared model types used by the storage and processing crates.

pub mod config;
pub mod error;
pub mod metadata;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel, SchemaViolationDetail};
pub use metadata::{validate_metadata, MetadataKind};
pub use models::{MediaKind, StoredFile};
