use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::{error, info};

use crate::errors::{ChatError, ChatResult};
use crate::models::message::{ChatRequest, Message};
use crate::models::tool::Tool;
use crate::providers::base::{CompletionOutcome, CompletionRequest, Provider};
use crate::relay::{final_message_stream, ByteStream};
use crate::tool::{parse_search_arguments, search_web_tool, Search, SimulatedSearch, SEARCH_WEB};

pub const DEFAULT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// How to return an answer the model gave without calling a tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DirectReply {
    /// One JSON object in the shape of a completion response
    #[default]
    Json,
    /// The same message framed as an event stream, so every reply streams
    Stream,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub message: Message,
    pub index: u32,
    pub finish_reason: String,
}

/// Body returned when the model answered directly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReply {
    pub choices: Vec<Choice>,
    pub model: Option<String>,
    pub id: Option<String>,
}

impl FinalReply {
    pub fn new(message: Message, model: Option<String>, id: Option<String>) -> Self {
        Self {
            choices: vec![Choice {
                message,
                index: 0,
                finish_reason: "stop".to_string(),
            }],
            model,
            id,
        }
    }
}

pub enum Reply {
    Final(FinalReply),
    Stream(ByteStream),
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Final(reply) => f.debug_tuple("Final").field(reply).finish(),
            Reply::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Runs the decide-tool / final-answer exchange with the provider
pub struct Agent {
    provider: Arc<dyn Provider>,
    search: Arc<dyn Search>,
    tools: Vec<Tool>,
    model: String,
    temperature: f32,
    direct_reply: DirectReply,
}

impl Agent {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            search: Arc::new(SimulatedSearch),
            tools: vec![search_web_tool()],
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            direct_reply: DirectReply::default(),
        }
    }

    pub fn with_search(mut self, search: Arc<dyn Search>) -> Self {
        self.search = search;
        self
    }

    /// Model and temperature used when a request leaves them out
    pub fn with_defaults<S: Into<String>>(mut self, model: S, temperature: f32) -> Self {
        self.model = model.into();
        self.temperature = temperature;
        self
    }

    pub fn with_direct_reply(mut self, direct_reply: DirectReply) -> Self {
        self.direct_reply = direct_reply;
        self
    }

    /// Answer a chat request. The request is only read; any tool exchange is
    /// built on a copy of its messages.
    pub async fn reply(&self, request: &ChatRequest) -> ChatResult<Reply> {
        if request.messages.is_empty() {
            return Err(ChatError::MalformedInput("messages must not be empty".into()));
        }

        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let temperature = Some(request.temperature.unwrap_or(self.temperature));

        let decision = CompletionRequest {
            model: model.clone(),
            messages: request.messages.clone(),
            temperature,
            tools: self.tools.clone(),
        };
        info!(
            model = %model,
            messages = decision.messages.len(),
            "asking model whether to call a tool"
        );

        let completion = self.provider.complete(&decision).await.map_err(|e| {
            error!("Decision call failed: {}", e);
            e
        })?;

        match completion.outcome {
            CompletionOutcome::ProviderError { status, message } => {
                error!("Provider reported an error: {}", message);
                Err(ChatError::Provider { status, message })
            }
            CompletionOutcome::FinalMessage(message) => {
                info!(mode = %self.direct_reply, "model answered without a tool");
                Ok(match self.direct_reply {
                    DirectReply::Json => {
                        Reply::Final(FinalReply::new(message, completion.model, completion.id))
                    }
                    DirectReply::Stream => Reply::Stream(final_message_stream(
                        completion.id.as_deref(),
                        completion.model.as_deref(),
                        &message,
                    )),
                })
            }
            CompletionOutcome::ToolInvocation { message, call } => {
                if call.function.name != SEARCH_WEB {
                    let err = ChatError::UnknownTool(call.function.name);
                    error!("{}", err);
                    return Err(err);
                }

                let query = parse_search_arguments(&call.function.arguments).map_err(|e| {
                    error!(arguments = %call.function.arguments, "{}", e);
                    e
                })?;
                info!(query = %query, "model called search_web");
                let results = self.search.search(&query);

                let mut messages = request.messages.clone();
                messages.push(message);
                messages.push(Message::tool(call.id, results));

                let follow_up = CompletionRequest {
                    model,
                    messages,
                    temperature,
                    tools: Vec::new(),
                };
                info!("sending search results back to the model for a streamed answer");
                let stream = self.provider.complete_stream(&follow_up).await.map_err(|e| {
                    error!("Follow up call with search results failed: {}", e);
                    e
                })?;
                Ok(Reply::Stream(stream))
            }
        }
    }
}
