//! ID generation utilities for plugsync
//!
//! Plugin identities are random UUIDs minted once per logical plugin. External keys are
//! derived from tool names and are what correlates records across sync passes.

use uuid::Uuid;

/// Prefix applied to tool names to form external keys
pub const EXTERNAL_KEY_PREFIX: &str = "mcp_";

/// Generate a fresh plugin identity
pub fn generate_plugin_id() -> Uuid {
    Uuid::new_v4()
}

/// Derive the external key for a tool
///
/// Format: `mcp_{tool_name}`
/// Example: `"add"` -> `"mcp_add"`
pub fn external_key(tool_name: &str) -> String {
    format!("{}{}", EXTERNAL_KEY_PREFIX, tool_name)
}
