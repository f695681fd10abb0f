//! Shape validation for change-log responses
//!
//! Runs on the raw JSON body before it is deserialized or cached, and stops
//! at the first violation.

use serde_json::Value;
use thiserror::Error;

/// Keys every change record must carry with a non-null value.
///
/// The id is sent as `_id`; a plain `id` is accepted as well.
pub const REQUIRED_FIELDS: [&str; 5] = ["_id", "date", "field", "previousValue", "currentValue"];

/// First shape violation found in a response body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("response is not a JSON object")]
    NotAMapping,

    #[error("'content' is missing or not an array")]
    MissingContent,

    #[error("content[{index}] is not an object")]
    ContentItemNotAMapping { index: usize },

    #[error("content[{index}].changes is not an array")]
    ChangesNotASequence { index: usize },

    #[error("content[{entry}].changes[{change}] is not an object")]
    ChangeNotAMapping { entry: usize, change: usize },

    #[error("content[{entry}].changes[{change}] is missing '{field}'")]
    MissingRequiredField {
        entry: usize,
        change: usize,
        field: &'static str,
    },
}

impl ValidationError {
    /// Stable reason code for logs and CLI output
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NotAMapping => "not-a-mapping",
            ValidationError::MissingContent => "missing-content",
            ValidationError::ContentItemNotAMapping { .. } => "content-item-not-a-mapping",
            ValidationError::ChangesNotASequence { .. } => "changes-not-a-sequence",
            ValidationError::ChangeNotAMapping { .. } => "change-not-a-mapping",
            ValidationError::MissingRequiredField { .. } => "missing-required-field",
        }
    }
}

/// Check that `body` is a well-formed change-log response.
pub fn validate_response(body: &Value) -> Result<(), ValidationError> {
    let root = body.as_object().ok_or(ValidationError::NotAMapping)?;

    let content = root
        .get("content")
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingContent)?;

    for (index, item) in content.iter().enumerate() {
        let item = item
            .as_object()
            .ok_or(ValidationError::ContentItemNotAMapping { index })?;

        let changes = item
            .get("changes")
            .and_then(Value::as_array)
            .ok_or(ValidationError::ChangesNotASequence { index })?;

        for (change_index, change) in changes.iter().enumerate() {
            let change = change.as_object().ok_or(ValidationError::ChangeNotAMapping {
                entry: index,
                change: change_index,
            })?;

            for field in REQUIRED_FIELDS {
                let value = match field {
                    "_id" => change.get("_id").or_else(|| change.get("id")),
                    _ => change.get(field),
                };
                if value.is_none_or(Value::is_null) {
                    return Err(ValidationError::MissingRequiredField {
                        entry: index,
                        change: change_index,
                        field,
                    });
                }
            }
        }
    }

    Ok(())
}
