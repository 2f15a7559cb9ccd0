use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ChatResult;
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolCall};
use crate::relay::ByteStream;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Everything needed for one call to the provider
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
    /// Offered with automatic tool choice when not empty
    pub tools: Vec<Tool>,
}

/// What the model decided to do with a non streaming call.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    /// A plain answer, ready to show
    FinalMessage(Message),
    /// The model wants a tool run first. `message` is the assistant message
    /// that carried the request, narrowed to `call`.
    ToolInvocation { message: Message, call: ToolCall },
    /// The provider answered but reported a failure in the body
    ProviderError {
        status: Option<u16>,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub id: Option<String>,
    pub model: Option<String>,
    pub usage: Option<Usage>,
    pub outcome: CompletionOutcome,
}

/// Base trait for completion providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Ask for the next message and wait for the whole of it
    async fn complete(&self, request: &CompletionRequest) -> ChatResult<Completion>;

    /// Ask for the next message as a stream of provider formatted SSE bytes
    async fn complete_stream(&self, request: &CompletionRequest) -> ChatResult<ByteStream>;
}
