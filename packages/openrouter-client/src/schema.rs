//! Tool-schema generation for forced function calling.
//!
//! Uses `schemars` to derive JSON schemas from Rust types, flattened into
//! the shape strict function-calling validators accept.

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

use crate::types::{ToolChoice, ToolDefinition};

/// Trait for types that can be used as a forced tool-call payload.
///
/// Automatically implemented for any `JsonSchema + DeserializeOwned` type.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Deserialize, JsonSchema)]
/// struct Report { title: String }
///
/// let tool = Report::tool_definition("report", "Report the result");
/// let request = ChatRequest::new("openai/gpt-4o").forced_tool(tool);
/// ```
pub trait StructuredTool: JsonSchema + DeserializeOwned {
    /// Build a function-tool definition whose parameters schema is derived
    /// from this type.
    ///
    /// Strict validators require `additionalProperties: false` on every
    /// object, all properties listed in `required`, and no `$ref`
    /// indirection; the schemars output is rewritten to satisfy all three.
    fn tool_definition(name: &str, description: &str) -> ToolDefinition {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        tighten_object_schemas(&mut value);
        inline_refs(&mut value);

        if let serde_json::Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
            map.remove("title");
        }

        ToolDefinition::function(name, description, value)
    }

    /// Tool choice that forces this tool by name.
    fn forced_choice(name: &str) -> ToolChoice {
        ToolChoice::force(name)
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredTool for T {}

/// Add `additionalProperties: false` and a complete `required` list to
/// every object schema, recursively.
fn tighten_object_schemas(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if map.get("type") == Some(&serde_json::Value::String("object".to_string())) {
                map.insert(
                    "additionalProperties".to_string(),
                    serde_json::Value::Bool(false),
                );
                if let Some(serde_json::Value::Object(props)) = map.get("properties") {
                    let all_keys: Vec<serde_json::Value> = props
                        .keys()
                        .map(|k| serde_json::Value::String(k.clone()))
                        .collect();
                    map.insert("required".to_string(), serde_json::Value::Array(all_keys));
                }
            }
            for (_, v) in map.iter_mut() {
                tighten_object_schemas(v);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                tighten_object_schemas(item);
            }
        }
        _ => {}
    }
}

/// Replace `$ref` references with their inlined definitions.
fn inline_refs(value: &mut serde_json::Value) {
    let definitions = match value {
        serde_json::Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };
    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(type_name) = ref_path.strip_prefix("#/definitions/") {
                    if let Some(def) = definitions.get(type_name) {
                        *value = def.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }
            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}
