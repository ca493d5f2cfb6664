//! Schema descriptors for metadata kinds.
//!
//! Each validated kind maps to a static [`MetadataSchema`]: an explicit table
//! of field names, type constraints, and required flags. Dispatch goes
//! through [`schema_for`] so adding a kind means adding a table and an arm,
//! nothing dynamic.

use super::MetadataKind;

/// Type constraint for a single metadata field.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    String,
    /// String or JSON null.
    NullableString,
    Integer,
    /// Any JSON number.
    Number,
    /// Number or JSON null.
    NullableNumber,
    Boolean,
    /// Nested object validated against its own schema.
    Object(&'static MetadataSchema),
    /// Array whose every element matches the item type.
    Array(&'static FieldType),
}

impl FieldType {
    /// Human-readable name used in violation messages.
    pub fn expected_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::NullableString => "string or null",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::NullableNumber => "number or null",
            FieldType::Boolean => "boolean",
            FieldType::Object(_) => "object",
            FieldType::Array(_) => "array",
        }
    }
}

#[derive(Debug)]
pub struct SchemaField {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

#[derive(Debug)]
pub struct MetadataSchema {
    pub fields: &'static [SchemaField],
}

const fn required(name: &'static str, ty: FieldType) -> SchemaField {
    SchemaField {
        name,
        ty,
        required: true,
    }
}

const fn optional(name: &'static str, ty: FieldType) -> SchemaField {
    SchemaField {
        name,
        ty,
        required: false,
    }
}

static REDDIT_SCHEMA: MetadataSchema = MetadataSchema {
    fields: &[
        optional("author", FieldType::NullableString),
        optional("author_flair_text", FieldType::NullableString),
        required("created_utc", FieldType::Number),
        optional("distinguished", FieldType::NullableString),
        optional("edited", FieldType::NullableNumber),
        required("id", FieldType::String),
        required("is_original_content", FieldType::Boolean),
        required("is_self", FieldType::Boolean),
        optional("link_flair_template_id", FieldType::NullableString),
        optional("link_flair_text", FieldType::NullableString),
        required("locked", FieldType::Boolean),
        required("name", FieldType::String),
        required("num_comments", FieldType::Integer),
        required("over_18", FieldType::Boolean),
        required("permalink", FieldType::String),
        required("score", FieldType::Integer),
        optional("selftext", FieldType::NullableString),
        required("spoiler", FieldType::Boolean),
        required("stickied", FieldType::Boolean),
        required("subreddit", FieldType::String),
        required("title", FieldType::String),
        required("upvote_ratio", FieldType::Number),
        required("url", FieldType::String),
    ],
};

static GALLERY_TITLE1_SCHEMA: MetadataSchema = MetadataSchema {
    fields: &[
        optional("before", FieldType::NullableString),
        required("pretty", FieldType::String),
        optional("after", FieldType::NullableString),
    ],
};

static GALLERY_TITLE2_SCHEMA: MetadataSchema = MetadataSchema {
    fields: &[
        optional("before", FieldType::NullableString),
        optional("pretty", FieldType::NullableString),
        optional("after", FieldType::NullableString),
    ],
};

static GALLERY_SCHEMA: MetadataSchema = MetadataSchema {
    fields: &[
        required("title1", FieldType::Object(&GALLERY_TITLE1_SCHEMA)),
        required("title2", FieldType::Object(&GALLERY_TITLE2_SCHEMA)),
        required("id", FieldType::String),
        required("parodies", FieldType::Array(&FieldType::NullableString)),
        required("characters", FieldType::Array(&FieldType::NullableString)),
        required("tags", FieldType::Array(&FieldType::String)),
        required("artists", FieldType::Array(&FieldType::String)),
        required("groups", FieldType::Array(&FieldType::NullableString)),
        required("languages", FieldType::Array(&FieldType::String)),
        required("categories", FieldType::Array(&FieldType::String)),
        required("pages", FieldType::Integer),
        required("uploaded", FieldType::Number),
    ],
};

/// Look up the schema registered for a kind. `Other` is schema-exempt and
/// returns `None`.
pub fn schema_for(kind: MetadataKind) -> Option<&'static MetadataSchema> {
    match kind {
        MetadataKind::Reddit => Some(&REDDIT_SCHEMA),
        MetadataKind::Gallery => Some(&GALLERY_SCHEMA),
        MetadataKind::Other => None,
    }
}
