use std::collections::HashMap;

use serde_json::Value;

/// Per-request values written by the token stages.
///
/// Stored in the request's `http::Extensions`. A key that was never written is
/// absent; a stage that found nothing writes an explicit `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFields(HashMap<String, Value>);

impl RequestFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Writes `value` under `key`, replacing whatever an earlier stage left there.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// String value of `key`, if the field holds one.
    pub fn token(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}
