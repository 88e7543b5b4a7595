/*
 * Responsibility
 * - Response bodies for the token demo endpoints
 */
use serde::Serialize;
use serde_json::Value;

/// Echo of one `RequestFields` entry. `value` is `null` when the stage found nothing.
#[derive(Debug, Serialize)]
pub struct FieldResponse {
    pub field: String,
    pub value: Value,
}

impl FieldResponse {
    pub fn new(field: impl Into<String>, value: Option<&Value>) -> Self {
        Self {
            field: field.into(),
            value: value.cloned().unwrap_or(Value::Null),
        }
    }
}
