//! Raw filing records as handed over by the fetch layer.

use insider_core::{Error, Result, SourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys under which upstream APIs nest their result lists.
const ENVELOPE_KEYS: [&str; 3] = ["filings", "transactions", "data"];

/// One upstream document, tagged with the schema it follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFilingRecord {
    /// Upstream schema.
    pub source: SourceKind,
    /// Document as received (EDGAR documents already converted from XML).
    pub payload: Value,
}

impl RawFilingRecord {
    /// Create a new raw record.
    pub fn new(source: SourceKind, payload: Value) -> Self {
        Self { source, payload }
    }

    /// Parse a single JSON document.
    pub fn from_json_str(source: SourceKind, json: &str) -> Result<Self> {
        let payload: Value = serde_json::from_str(json)?;
        if !payload.is_object() {
            return Err(Error::malformed(format!(
                "{source} record must be a JSON object"
            )));
        }
        Ok(Self::new(source, payload))
    }

    /// Split an API response into records.
    ///
    /// Accepts a bare array, an envelope object holding the array under
    /// `filings`, `transactions` or `data`, or a single record object.
    pub fn batch_from_json_str(source: SourceKind, json: &str) -> Result<Vec<Self>> {
        let payload: Value = serde_json::from_str(json)?;
        Ok(Self::batch_from_value(source, payload))
    }

    /// Split an already-parsed API response into records.
    pub fn batch_from_value(source: SourceKind, payload: Value) -> Vec<Self> {
        match payload {
            Value::Array(items) => items.into_iter().map(|p| Self::new(source, p)).collect(),
            Value::Object(mut map) => {
                let envelope = ENVELOPE_KEYS
                    .iter()
                    .find(|key| map.get(**key).is_some_and(Value::is_array))
                    .and_then(|key| map.remove(*key));
                match envelope {
                    Some(Value::Array(items)) => {
                        items.into_iter().map(|p| Self::new(source, p)).collect()
                    }
                    _ => vec![Self::new(source, Value::Object(map))],
                }
            }
            Value::Null => Vec::new(),
            other => vec![Self::new(source, other)],
        }
    }
}
