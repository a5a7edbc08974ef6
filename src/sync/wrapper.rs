//! Wrapper definition generation
//!
//! Each managed plugin carries a self-contained JavaScript async function that forwards
//! its argument to the bridge's per-tool call endpoint. The text is produced here and
//! executed only by an external runtime.

use reqwest::Url;
use serde_json::{Map, Value};

use crate::catalog::join_url;
use crate::domain::ToolDescriptor;
use crate::id::external_key;

/// URL of the bridge endpoint that invokes one tool
///
/// The tool name is a single percent-encoded path segment.
pub fn tool_call_url(bridge_base: &str, tool_name: &str) -> String {
    match Url::parse(bridge_base) {
        Ok(mut url) if !url.cannot_be_a_base() => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().extend(["mcp", "tools", tool_name, "call"]);
            }
            url.to_string()
        }
        _ => join_url(bridge_base, &format!("mcp/tools/{}/call", tool_name)),
    }
}

/// Request body a wrapper sends for the given argument
///
/// A string argument is wrapped under the first required parameter when the schema has
/// one; anything else goes through unchanged.
pub fn request_body(tool: &ToolDescriptor, data: Value) -> Value {
    match (data, tool.first_required()) {
        (Value::String(text), Some(param)) => {
            let mut wrapped = Map::new();
            wrapped.insert(param.to_string(), Value::String(text));
            Value::Object(wrapped)
        }
        (data, _) => data,
    }
}

/// Identifier used as the wrapper's function name
pub fn wrapper_function_name(tool_name: &str) -> String {
    external_key(tool_name)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect()
}

/// Generate the wrapper body for a tool
pub fn generate_wrapper(bridge_base: &str, tool: &ToolDescriptor) -> String {
    let url = js_string(&tool_call_url(bridge_base, &tool.name));
    let body_expr = match tool.first_required() {
        Some(param) => format!(
            "typeof data === \"string\" ? {{ {}: data }} : data",
            js_string(param)
        ),
        None => "data".to_string(),
    };

    format!(
        r#"async function {name}(data) {{
  const body = {body_expr};
  const response = await fetch({url}, {{
    method: "POST",
    headers: {{ "Content-Type": "application/json" }},
    body: JSON.stringify(body),
  }});
  if (!response.ok) {{
    const error = new Error(`Tool call failed: ${{response.statusText}}`);
    error.name = "InvocationError";
    throw error;
  }}
  return await response.json();
}}"#,
        name = wrapper_function_name(&tool.name),
    )
}

/// Encode text as a JavaScript string literal
fn js_string(text: &str) -> String {
    // JSON string literals are valid JavaScript string literals
    Value::String(text.to_string()).to_string()
}
