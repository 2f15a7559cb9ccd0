use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::role::Role;
use super::tool::ToolCall;
use crate::errors::{ChatError, ChatResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message to or from the model
pub struct Message {
    pub role: Role,
    /// Text of the message. Only an assistant message that carries tool calls
    /// may leave this empty.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl Message {
    fn new<S: Into<String>>(role: Role, content: S) -> Self {
        Message {
            role,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// An assistant message that asks for tools to be run
    pub fn assistant_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Message {
            role: Role::Assistant,
            content: None,
            tool_call_id: None,
            tool_calls: Some(tool_calls),
        }
    }

    /// The result of a tool call, tied back to the call that requested it
    pub fn tool<I: Into<String>, S: Into<String>>(tool_call_id: I, content: S) -> Self {
        Message {
            role: Role::Tool,
            content: Some(content.into()),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: None,
        }
    }

    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    pub fn first_tool_call(&self) -> Option<&ToolCall> {
        self.tool_calls.as_ref().and_then(|calls| calls.first())
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Parse and validate an untrusted request body.
    pub fn from_slice(body: &[u8]) -> ChatResult<Self> {
        if body.is_empty() {
            return Err(ChatError::MalformedInput("request body is empty".into()));
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ChatError::MalformedInput(format!("body is not valid JSON: {}", e)))?;

        let messages = validate_messages(value.get("messages").unwrap_or(&Value::Null))?;

        let model = match value.get("model") {
            None | Some(Value::Null) => None,
            Some(Value::String(model)) => Some(model.clone()),
            Some(_) => {
                return Err(ChatError::MalformedInput("model must be a string".into()));
            }
        };
        let temperature = match value.get("temperature") {
            None | Some(Value::Null) => None,
            Some(t) => Some(t.as_f64().ok_or_else(|| {
                ChatError::MalformedInput("temperature must be a number".into())
            })? as f32),
        };

        Ok(ChatRequest {
            messages,
            model,
            temperature,
        })
    }
}

/// Check that `value` is a non-empty array of well formed messages and
/// convert it.
///
/// Every message needs a known string `role` and a string `content`; an
/// assistant message carrying `tool_calls` may have null content. A `tool`
/// message must answer a call made by the assistant message right before it.
pub fn validate_messages(value: &Value) -> ChatResult<Vec<Message>> {
    let items = value
        .as_array()
        .ok_or_else(|| ChatError::MalformedInput("messages must be an array".into()))?;
    if items.is_empty() {
        return Err(ChatError::MalformedInput("messages must not be empty".into()));
    }

    let mut messages = Vec::with_capacity(items.len());
    let mut open_calls: HashSet<String> = HashSet::new();

    for (index, item) in items.iter().enumerate() {
        let malformed = |reason: &str| ChatError::MalformedInput(format!("messages[{}] {}", index, reason));

        if !item.is_object() {
            return Err(malformed("is not an object"));
        }
        let role = item
            .get("role")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("has no string role"))?;
        let role = Role::from_str(role).map_err(|_| malformed("has an unknown role"))?;

        let message: Message = serde_json::from_value(item.clone())
            .map_err(|e| malformed(&format!("could not be read: {}", e)))?;

        let carries_calls = role == Role::Assistant && message.has_tool_calls();
        match item.get("content") {
            Some(Value::String(_)) => {}
            None | Some(Value::Null) if carries_calls => {}
            _ => return Err(malformed("has no string content")),
        }

        match role {
            Role::Assistant => {
                open_calls = message
                    .tool_calls
                    .iter()
                    .flatten()
                    .map(|call| call.id.clone())
                    .collect();
            }
            Role::Tool => {
                let id = message
                    .tool_call_id
                    .as_deref()
                    .ok_or_else(|| malformed("is a tool message without tool_call_id"))?;
                if !open_calls.contains(id) {
                    return Err(malformed("answers a tool call the previous assistant message did not make"));
                }
            }
            Role::System | Role::User => open_calls.clear(),
        }

        messages.push(message);
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_conversation() {
        let messages = validate_messages(&json!([
            {"role": "system", "content": "You are a poker coach."},
            {"role": "user", "content": "Who won the main event?"}
        ]))
        .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].text(), "Who won the main event?");
    }

    #[test]
    fn test_rejects_empty_and_non_array() {
        assert!(matches!(
            validate_messages(&json!([])),
            Err(ChatError::MalformedInput(_))
        ));
        assert!(matches!(
            validate_messages(&json!({"role": "user"})),
            Err(ChatError::MalformedInput(_))
        ));
        assert!(matches!(
            validate_messages(&Value::Null),
            Err(ChatError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_rejects_bad_role_or_content() {
        let err = validate_messages(&json!([{"role": 3, "content": "hi"}])).unwrap_err();
        assert!(err.to_string().contains("messages[0]"));

        assert!(validate_messages(&json!([{"role": "wizard", "content": "hi"}])).is_err());
        assert!(validate_messages(&json!([{"role": "user", "content": 12}])).is_err());
        assert!(validate_messages(&json!([{"role": "user"}])).is_err());
        assert!(validate_messages(&json!(["hello"])).is_err());
    }

    #[test]
    fn test_tool_message_must_answer_previous_call() {
        let call = json!({
            "id": "call_9",
            "type": "function",
            "function": {"name": "search_web", "arguments": "{\"query\":\"x\"}"}
        });

        let ok = validate_messages(&json!([
            {"role": "user", "content": "search x"},
            {"role": "assistant", "content": null, "tool_calls": [call]},
            {"role": "tool", "tool_call_id": "call_9", "content": "results"}
        ]));
        assert!(ok.is_ok());

        let wrong_id = validate_messages(&json!([
            {"role": "user", "content": "search x"},
            {"role": "assistant", "content": null, "tool_calls": [call]},
            {"role": "tool", "tool_call_id": "call_10", "content": "results"}
        ]));
        assert!(wrong_id.is_err());

        let orphan = validate_messages(&json!([
            {"role": "user", "content": "search x"},
            {"role": "tool", "tool_call_id": "call_9", "content": "results"}
        ]));
        assert!(orphan.is_err());
    }

    #[test]
    fn test_request_from_slice() {
        let request = ChatRequest::from_slice(
            br#"{"messages":[{"role":"user","content":"hi"}],"model":"gpt-4o","temperature":0.2}"#,
        )
        .unwrap();
        assert_eq!(request.model.as_deref(), Some("gpt-4o"));
        assert_eq!(request.temperature, Some(0.2));

        let request = ChatRequest::from_slice(br#"{"messages":[{"role":"user","content":"hi"}]}"#)
            .unwrap();
        assert_eq!(request.model, None);
        assert_eq!(request.temperature, None);
    }

    #[test]
    fn test_request_from_slice_rejects_garbage() {
        assert!(matches!(
            ChatRequest::from_slice(b"{not json"),
            Err(ChatError::MalformedInput(_))
        ));
        assert!(matches!(
            ChatRequest::from_slice(b""),
            Err(ChatError::MalformedInput(_))
        ));
        assert!(matches!(
            ChatRequest::from_slice(br#"{"messages":"hi"}"#),
            Err(ChatError::MalformedInput(_))
        ));
        assert!(matches!(
            ChatRequest::from_slice(br#"{"messages":[{"role":"user","content":"hi"}],"temperature":"hot"}"#),
            Err(ChatError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_tool_call_message_serializes_null_content() {
        let message = Message::assistant_tool_calls(vec![ToolCall::new("c1", "search_web", "{}")]);
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["content"], Value::Null);
        assert_eq!(value["tool_calls"][0]["id"], "c1");
        assert!(value.get("tool_call_id").is_none());
    }
}
