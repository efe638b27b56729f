//! Parsed translation payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A nested mapping of keys to localized strings for one language.
///
/// Documents are parsed in full before anyone sees them and are replaced
/// wholesale on refresh, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationDocument(Map<String, Value>);

impl TranslationDocument {
    /// Parse a JSON payload from raw bytes. The root must be an object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Walk a dot-separated key path. Only a string at the end of the path
    /// counts as a hit.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut value = self.0.get(first)?;

        for segment in segments {
            value = value.as_object()?.get(segment)?;
        }

        value.as_str()
    }

    /// Number of string leaves in the document.
    pub fn key_count(&self) -> usize {
        fn count(value: &Value) -> usize {
            match value {
                Value::String(_) => 1,
                Value::Object(map) => map.values().map(count).sum(),
                _ => 0,
            }
        }
        self.0.values().map(count).sum()
    }
}
