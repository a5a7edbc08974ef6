//! Remote tool descriptors and the source catalog they arrive in
//!
//! The bridge answers with a JSON object keyed by source name, each entry carrying a
//! `tools` array. Everything is validated here so the reconciler only ever sees typed
//! descriptors.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, SyncError};

/// A callable tool as advertised by the bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name, unique within its source
    pub name: String,
    /// Human-readable description
    #[serde(default, deserialize_with = "string_or_empty")]
    pub description: String,
    /// JSON schema for the call arguments
    #[serde(rename = "inputSchema", default = "empty_schema")]
    pub input_schema: Value,
}

fn empty_schema() -> Value {
    Value::Object(serde_json::Map::new())
}

fn string_or_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ToolDescriptor {
    /// Create a descriptor with an empty schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: empty_schema(),
        }
    }

    /// Set input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Required parameter names, in schema order
    pub fn required_params(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }

    /// First required parameter, used to wrap scalar arguments
    pub fn first_required(&self) -> Option<&str> {
        self.required_params().into_iter().next()
    }
}

/// One source entry of the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntry {
    /// Source (server) name
    pub name: String,
    /// Tools, or None when the entry had no usable `tools` array
    pub tools: Option<Vec<ToolDescriptor>>,
}

/// Catalog of tools keyed by source name, in the order the bridge sent them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceCatalog {
    entries: Vec<SourceEntry>,
}

impl SourceCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source with a tool list
    pub fn with_source(mut self, name: impl Into<String>, tools: Vec<ToolDescriptor>) -> Self {
        self.entries.push(SourceEntry {
            name: name.into(),
            tools: Some(tools),
        });
        self
    }

    /// Parse a catalog from raw JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SyncError::Decode(format!("Catalog is not valid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Validate a JSON value into a catalog
    ///
    /// Entries without a `tools` array are kept with `tools: None`; a tool entry that is
    /// not a valid descriptor fails the whole catalog.
    pub fn from_value(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(SyncError::Decode(format!(
                    "Catalog must be a JSON object, got {}",
                    json_kind(&other)
                )));
            }
        };

        let mut entries = Vec::with_capacity(map.len());
        for (name, entry) in map {
            let tools = match entry.get("tools") {
                Some(Value::Array(items)) => Some(
                    items
                        .iter()
                        .enumerate()
                        .map(|(index, item)| {
                            serde_json::from_value::<ToolDescriptor>(item.clone()).map_err(|e| {
                                SyncError::Decode(format!("Source '{}' tool #{}: {}", name, index, e))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?,
                ),
                _ => None,
            };
            entries.push(SourceEntry { name, tools });
        }

        Ok(Self { entries })
    }

    /// All source entries
    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    /// Number of sources, including ones without tools
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if catalog has no sources
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
