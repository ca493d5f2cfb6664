//! Metadata payload validation against registered schema descriptors.

use serde_json::Value;

use super::schema::{schema_for, FieldType, MetadataSchema};
use super::MetadataKind;
use crate::error::{AppError, SchemaViolationDetail};

/// Parse `raw` as JSON and validate it against the schema registered for
/// `kind`.
///
/// `Other` is schema-exempt: the parsed value is returned unchanged. A parse
/// failure is `MalformedJson`, a kind without a registered schema is
/// `BadRequest`, and structural mismatches are `SchemaViolation` carrying one
/// detail entry per offending field.
///
/// On success the parsed (not re-serialized) value is returned for the caller
/// to persist.
pub fn validate_metadata(kind: MetadataKind, raw: &str) -> Result<Value, AppError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| AppError::MalformedJson(e.to_string()))?;

    if kind == MetadataKind::Other {
        return Ok(value);
    }

    let schema = schema_for(kind).ok_or_else(|| {
        AppError::BadRequest(format!("No metadata schema registered for kind '{}'", kind))
    })?;

    let mut violations = Vec::new();
    check_object(schema, &value, "$", &mut violations);

    if !violations.is_empty() {
        return Err(AppError::SchemaViolation {
            kind: kind.to_string(),
            violations,
        });
    }

    Ok(value)
}

fn check_object(
    schema: &MetadataSchema,
    value: &Value,
    path: &str,
    violations: &mut Vec<SchemaViolationDetail>,
) {
    let Some(obj) = value.as_object() else {
        violations.push(SchemaViolationDetail {
            path: path.to_string(),
            message: "expected an object".to_string(),
        });
        return;
    };

    // Unknown extra fields are accepted; only declared fields are checked.
    for field in schema.fields {
        let field_path = format!("{}.{}", path, field.name);
        match obj.get(field.name) {
            None => {
                if field.required {
                    violations.push(SchemaViolationDetail {
                        path: field_path,
                        message: "required field is missing".to_string(),
                    });
                }
            }
            Some(v) => check_value(&field.ty, v, &field_path, violations),
        }
    }
}

fn check_value(
    ty: &FieldType,
    value: &Value,
    path: &str,
    violations: &mut Vec<SchemaViolationDetail>,
) {
    let matches = match *ty {
        FieldType::String => value.is_string(),
        FieldType::NullableString => value.is_string() || value.is_null(),
        FieldType::Integer => value.is_i64() || value.is_u64(),
        FieldType::Number => value.is_number(),
        FieldType::NullableNumber => value.is_number() || value.is_null(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Object(nested) => {
            check_object(nested, value, path, violations);
            return;
        }
        FieldType::Array(item_ty) => {
            let Some(items) = value.as_array() else {
                violations.push(SchemaViolationDetail {
                    path: path.to_string(),
                    message: "expected array".to_string(),
                });
                return;
            };
            for (i, item) in items.iter().enumerate() {
                check_value(item_ty, item, &format!("{}[{}]", path, i), violations);
            }
            return;
        }
    };

    if !matches {
        violations.push(SchemaViolationDetail {
            path: path.to_string(),
            message: format!("expected {}", ty.expected_name()),
        });
    }
}
