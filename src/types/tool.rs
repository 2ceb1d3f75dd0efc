//! Tool calling definitions exchanged with the realtime model session

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, ErrorContext};
use crate::Result;

/// Tool definition advertised to the model session.
///
/// Serializes to the flat realtime form:
/// `{"type": "function", "name": ..., "description": ..., "parameters": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String, // "function"
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema
}

impl ToolDefinition {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Names listed under the schema's top-level `required` array.
    pub fn required_fields(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(|r| r.as_array())
            .map(|fields| fields.iter().filter_map(|f| f.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Tool call (invocation from the model session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    /// Correlation id assigned by the session, echoed back with the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

impl FunctionCallRequest {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
            call_id: None,
        }
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    /// Build a request from a JSON value such as `json!({"date": "2025-03-01"})`.
    ///
    /// `null` is treated as "no arguments"; any other non-object is rejected.
    pub fn from_value(name: impl Into<String>, arguments: Value) -> Result<Self> {
        let name = name.into();
        let arguments = into_argument_map(&name, arguments)?;
        Ok(Self::new(name, arguments))
    }

    /// Parse a realtime `response.function_call_arguments.done` event (or a
    /// `function_call` output item, which has the same fields).
    ///
    /// The session delivers `arguments` as a JSON-encoded string.
    pub fn from_realtime_event(event: &Value) -> Result<Self> {
        let name = event
            .get("name")
            .and_then(|n| n.as_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                Error::validation_with_context(
                    "function call event has no name",
                    ErrorContext::new()
                        .with_field_path("name")
                        .with_source("realtime_event"),
                )
            })?
            .to_string();

        let arguments = match event.get("arguments") {
            None | Some(Value::Null) => Value::Null,
            Some(Value::String(raw)) if raw.trim().is_empty() => Value::Null,
            Some(Value::String(raw)) => serde_json::from_str(raw)?,
            Some(other) => other.clone(),
        };

        let request = Self::new(name.clone(), into_argument_map(&name, arguments)?);
        Ok(match event.get("call_id").and_then(|c| c.as_str()) {
            Some(call_id) => request.with_call_id(call_id),
            None => request,
        })
    }
}

fn into_argument_map(name: &str, arguments: Value) -> Result<Map<String, Value>> {
    match arguments {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(Error::validation_with_context(
            "tool arguments must be a JSON object",
            ErrorContext::new()
                .with_field_path(format!("{name}.arguments"))
                .with_details(format!("got {other}"))
                .with_source("realtime_event"),
        )),
    }
}
