//! Plugin record and related types
//!
//! Every stored value carries an explicit origin tag. Values tagged `managed` belong to
//! the sync pass and decode into a typed PluginRecord. Everything else is foreign: it was
//! written by another actor and is kept as the raw JSON it was stored as.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::tool::ToolDescriptor;
use crate::id::external_key;

/// Emoji shown for every synced plugin
pub const PLUGIN_EMOJI: &str = "🔌";

/// A plugin record owned by the sync pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRecord {
    //=== Identity ===
    /// Stable surrogate key, minted once per logical plugin
    pub identity: Uuid,

    /// Key correlating records across passes (`mcp_{tool}` for managed records)
    pub external_key: String,

    /// Always `managed` for records built here
    pub origin: Origin,

    /// Source the tool came from
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,

    //=== Generated content ===
    #[serde(default)]
    pub display: DisplayInfo,

    #[serde(default)]
    pub invocation_spec: InvocationSpec,

    /// Callable wrapper definition for an external runtime
    #[serde(default)]
    pub wrapper_body: String,

    /// Fields this crate does not know about, kept for round-trips
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ownership tag of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Created and replaced by the sync pass
    Managed,
    /// Created by another actor
    Foreign,
}

/// Human-facing metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub title: String,
    pub overview: String,
    pub emoji: String,
}

/// Declarative call contract mirrored from the tool schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl PluginRecord {
    /// Build a managed record from a tool descriptor
    ///
    /// Everything except `identity` is derived from the descriptor, so regenerating a
    /// record never carries stale metadata forward.
    pub fn managed(identity: Uuid, source: &str, tool: &ToolDescriptor, wrapper_body: String) -> Self {
        let key = external_key(&tool.name);
        let overview = if tool.description.trim().is_empty() {
            format!("{} tool from {}", tool.name, source)
        } else {
            tool.description.clone()
        };

        Self {
            identity,
            external_key: key.clone(),
            origin: Origin::Managed,
            source: source.to_string(),
            display: DisplayInfo {
                title: tool.name.clone(),
                overview,
                emoji: PLUGIN_EMOJI.to_string(),
            },
            invocation_spec: InvocationSpec {
                name: key,
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
            wrapper_body,
            extra: Map::new(),
        }
    }
}

/// One stored value, split by its origin tag
///
/// Foreign values are never decoded beyond the tag, so they are written back exactly as
/// they were read.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredRecord {
    Managed(PluginRecord),
    Foreign(Value),
}

impl StoredRecord {
    /// Classify a raw stored value, decoding it only if it is tagged `managed`
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        if has_managed_tag(&value) {
            serde_json::from_value(value).map(StoredRecord::Managed)
        } else {
            Ok(StoredRecord::Foreign(value))
        }
    }

    /// The value to persist
    pub fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            StoredRecord::Managed(record) => serde_json::to_value(record),
            StoredRecord::Foreign(value) => Ok(value.clone()),
        }
    }

    pub fn origin(&self) -> Origin {
        match self {
            StoredRecord::Managed(_) => Origin::Managed,
            StoredRecord::Foreign(_) => Origin::Foreign,
        }
    }

    pub fn is_managed(&self) -> bool {
        matches!(self, StoredRecord::Managed(_))
    }

    pub fn as_managed(&self) -> Option<&PluginRecord> {
        match self {
            StoredRecord::Managed(record) => Some(record),
            StoredRecord::Foreign(_) => None,
        }
    }

    /// External key, if the value has a string `externalKey`
    pub fn external_key(&self) -> Option<&str> {
        match self {
            StoredRecord::Managed(record) => Some(&record.external_key),
            StoredRecord::Foreign(value) => value.get("externalKey").and_then(Value::as_str),
        }
    }
}

impl From<PluginRecord> for StoredRecord {
    fn from(record: PluginRecord) -> Self {
        StoredRecord::Managed(record)
    }
}

/// True if `value` is an object whose `origin` is the string `managed`
fn has_managed_tag(value: &Value) -> bool {
    value.get("origin").and_then(Value::as_str) == Some("managed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add_tool() -> ToolDescriptor {
        ToolDescriptor::new("add", "Adds numbers").with_schema(json!({
            "type": "object",
            "properties": { "x": { "type": "number" } },
            "required": ["x"]
        }))
    }

    #[test]
    fn test_managed_record_fields() {
        let id = Uuid::new_v4();
        let record = PluginRecord::managed(id, "calc", &add_tool(), "body".to_string());

        assert_eq!(record.identity, id);
        assert_eq!(record.external_key, "mcp_add");
        assert_eq!(record.origin, Origin::Managed);
        assert_eq!(record.source, "calc");
        assert_eq!(record.display.title, "add");
        assert_eq!(record.display.overview, "Adds numbers");
        assert_eq!(record.display.emoji, PLUGIN_EMOJI);
        assert_eq!(record.invocation_spec.name, "mcp_add");
        assert_eq!(record.invocation_spec.parameters["required"][0], "x");
        assert_eq!(record.wrapper_body, "body");
    }

    #[test]
    fn test_managed_record_overview_fallback() {
        let tool = ToolDescriptor::new("ping", "  ");
        let record = PluginRecord::managed(Uuid::new_v4(), "net", &tool, String::new());
        assert_eq!(record.display.overview, "ping tool from net");
        assert_eq!(record.invocation_spec.description, "  ");
    }

    #[test]
    fn test_origin_serialization() {
        assert_eq!(serde_json::to_string(&Origin::Managed).unwrap(), "\"managed\"");
        assert_eq!(serde_json::to_string(&Origin::Foreign).unwrap(), "\"foreign\"");
    }

    #[test]
    fn test_managed_value_decodes_typed() {
        let record = PluginRecord::managed(Uuid::new_v4(), "calc", &add_tool(), "body".to_string());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["origin"], "managed");

        let stored = StoredRecord::from_value(value.clone()).unwrap();
        assert_eq!(stored.as_managed(), Some(&record));
        assert_eq!(stored.to_value().unwrap(), value);
    }

    #[test]
    fn test_untagged_value_is_foreign_and_kept_verbatim() {
        let raw = json!({
            "identity": "6f1c1e3a-3a0b-4d55-9a3e-2f1f0c9b8a77",
            "externalKey": "weather",
            "author": "x"
        });
        let stored = StoredRecord::from_value(raw.clone()).unwrap();

        assert_eq!(stored.origin(), Origin::Foreign);
        assert_eq!(stored.external_key(), Some("weather"));
        assert_eq!(stored.to_value().unwrap(), raw);
    }

    #[test]
    fn test_foreign_values_are_not_validated() {
        for raw in [
            json!({ "identity": "notes-plugin-1", "display": { "title": 7 } }),
            json!({ "origin": "foreign", "identity": 42 }),
            json!({ "origin": ["managed"] }),
            json!("just a string"),
        ] {
            let stored = StoredRecord::from_value(raw.clone()).unwrap();
            assert!(!stored.is_managed());
            assert_eq!(stored.to_value().unwrap(), raw);
        }
    }

    #[test]
    fn test_malformed_managed_value_is_an_error() {
        let raw = json!({ "origin": "managed", "identity": "not-a-uuid", "externalKey": "mcp_add" });
        assert!(StoredRecord::from_value(raw).is_err());
    }
}
