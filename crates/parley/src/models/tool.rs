use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool that can be offered to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// JSON schema of the parameters the tool accepts
    pub parameters: Value,
}

impl Tool {
    /// Create a new tool with the given name, description and parameter schema
    pub fn new<N, D>(name: N, description: D, parameters: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// The function part of a tool call, as emitted by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON encoded arguments. Kept as the raw string the model produced,
    /// it is only parsed once we know which tool is being called.
    pub arguments: String,
}

/// A request from the model to run a tool before it continues
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_call_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn new<I, N, A>(id: I, name: N, arguments: A) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        ToolCall {
            id: id.into(),
            call_type: default_call_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

fn default_call_type() -> String {
    "function".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_call_wire_shape() {
        let call = ToolCall::new("call_1", "search_web", r#"{"query":"wsop"}"#);
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "call_1",
                "type": "function",
                "function": {"name": "search_web", "arguments": "{\"query\":\"wsop\"}"}
            })
        );
    }

    #[test]
    fn test_tool_call_type_defaults_when_missing() {
        let call: ToolCall = serde_json::from_value(json!({
            "id": "call_2",
            "function": {"name": "search_web", "arguments": "{}"}
        }))
        .unwrap();
        assert_eq!(call.call_type, "function");
    }
}
