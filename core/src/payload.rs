//! JSON request bodies built from field name to value pairs.

use serde_json::{Map, Value};

use crate::error::ApiError;

/// A request body under construction.
///
/// Field order is irrelevant to the remote API; later inserts replace
/// earlier ones with the same key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Serialize to the JSON wire format.
    pub fn build(&self) -> Result<Vec<u8>, ApiError> {
        serde_json::to_vec(&self.fields).map_err(ApiError::Encoding)
    }
}
