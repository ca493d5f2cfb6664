//! Metadata kinds and schema validation.
//!
//! An upload may carry a JSON metadata payload tagged with a [`MetadataKind`].
//! Every kind except [`MetadataKind::Other`] has a schema descriptor
//! registered in [`schema`]; [`validate::validate_metadata`] checks a raw
//! payload against it and returns the parsed value for persistence.

pub mod schema;
pub mod validate;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use schema::{schema_for, FieldType, MetadataSchema, SchemaField};
pub use validate::validate_metadata;

/// Enumerated tag identifying which JSON schema, if any, applies to an
/// upload's attached metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataKind {
    Reddit,
    Gallery,
    /// Free-form metadata, accepted without structural validation.
    Other,
}

impl MetadataKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKind::Reddit => "reddit",
            MetadataKind::Gallery => "gallery",
            MetadataKind::Other => "other",
        }
    }
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reddit" => Ok(MetadataKind::Reddit),
            "gallery" => Ok(MetadataKind::Gallery),
            "other" => Ok(MetadataKind::Other),
            other => Err(AppError::BadRequest(format!(
                "Unknown metadata kind '{}'",
                other
            ))),
        }
    }
}
