//! JSON export decoder

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use tracing::warn;

/// Decoder for JSON export files.
///
/// The payload is either a bare array of records or an object wrapping
/// them, in which case `records_path` (dotted keys) points at the array.
/// A single top-level object without a records path is treated as one
/// record. Field names pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    pub records_path: Option<String>,
}

impl JsonDecoder {
    pub fn new(records_path: Option<String>) -> Self {
        Self { records_path }
    }

    pub fn decode(&self, content: &[u8]) -> Result<Vec<Record>> {
        let data: JsonValue = serde_json::from_slice(content)?;

        let records = match &self.records_path {
            Some(path) => {
                let mut current = &data;
                for key in path.split('.') {
                    match current.get(key) {
                        Some(next) => current = next,
                        None => {
                            warn!("Could not find records at path '{path}'");
                            return Ok(Vec::new());
                        }
                    }
                }
                current
            }
            None => &data,
        };

        match records {
            JsonValue::Array(items) => items
                .iter()
                .map(|item| match item {
                    JsonValue::Object(obj) => Ok(obj.clone()),
                    other => Err(Error::decode(format!(
                        "expected a JSON object in records array, got {other}"
                    ))),
                })
                .collect(),
            JsonValue::Object(obj) => Ok(vec![obj.clone()]),
            other => Err(Error::decode(format!(
                "expected a JSON array or object, got {other}"
            ))),
        }
    }
}
