use std::collections::HashSet;

use serde_json::{json, Value};

use super::base::{Completion, CompletionOutcome, CompletionRequest, Usage};
use crate::errors::{ChatError, ChatResult};
use crate::models::message::Message;
use crate::models::role::Role;
use crate::models::tool::Tool;

/// Convert tool definitions to openai's `tools` entries
pub fn tools_to_openai_spec(tools: &[Tool]) -> ChatResult<Vec<Value>> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(ChatError::MalformedInput(format!(
                "Duplicate tool name: {}",
                tool.name
            )));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            }
        }));
    }

    Ok(result)
}

/// Build the `/v1/chat/completions` body for a request
pub fn completion_payload(request: &CompletionRequest, stream: bool) -> ChatResult<Value> {
    let mut payload = json!({
        "model": request.model,
        "messages": request.messages,
        "stream": stream,
    });
    let object = payload
        .as_object_mut()
        .ok_or_else(|| ChatError::Transport("payload is not an object".into()))?;

    if !request.tools.is_empty() {
        object.insert("tools".to_string(), json!(tools_to_openai_spec(&request.tools)?));
        object.insert("tool_choice".to_string(), json!("auto"));
    }
    if let Some(temp) = request.temperature {
        object.insert("temperature".to_string(), json!(temp));
    }

    Ok(payload)
}

/// Pull a readable message out of an openai `error` object
pub fn openai_error_message(error: &Value) -> String {
    match error {
        Value::String(text) => text.clone(),
        _ => {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            match error.get("code").and_then(Value::as_str) {
                Some(code) => format!("{} ({})", message, code),
                None => message.to_string(),
            }
        }
    }
}

pub fn get_usage(data: &Value) -> Option<Usage> {
    let usage = data.get("usage")?;

    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

    Some(Usage::new(input_tokens, output_tokens, total_tokens))
}

/// Narrow an untyped completion response into a [`Completion`].
///
/// Only the first tool call is honoured; the assistant message is trimmed to
/// it so the follow up transcript answers every call it contains.
pub fn classify_completion(response: Value) -> Completion {
    let id = response.get("id").and_then(Value::as_str).map(String::from);
    let model = response.get("model").and_then(Value::as_str).map(String::from);
    let usage = get_usage(&response);

    let outcome = classify_outcome(&response);
    Completion {
        id,
        model,
        usage,
        outcome,
    }
}

fn classify_outcome(response: &Value) -> CompletionOutcome {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        return CompletionOutcome::ProviderError {
            status: None,
            message: openai_error_message(error),
        };
    }

    let Some(raw) = response.pointer("/choices/0/message") else {
        return CompletionOutcome::ProviderError {
            status: None,
            message: "Response has no choices[0].message".to_string(),
        };
    };

    let mut message: Message = match serde_json::from_value(raw.clone()) {
        Ok(message) => message,
        Err(e) => {
            return CompletionOutcome::ProviderError {
                status: None,
                message: format!("Could not read response message: {}", e),
            }
        }
    };

    if message.role != Role::Assistant {
        return CompletionOutcome::ProviderError {
            status: None,
            message: format!("Expected an assistant message, got {}", message.role),
        };
    }

    match message.tool_calls.take().and_then(|calls| calls.into_iter().next()) {
        Some(call) => {
            message.tool_calls = Some(vec![call.clone()]);
            CompletionOutcome::ToolInvocation { message, call }
        }
        None => {
            if message.content.is_none() {
                message.content = Some(String::new());
            }
            CompletionOutcome::FinalMessage(message)
        }
    }
}
