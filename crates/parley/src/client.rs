use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::agent::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::errors::{ChatError, ChatResult};
use crate::models::message::Message;
use crate::models::role::Role;
use crate::providers::utils::openai_error_message;
use crate::session::Session;
use crate::sse::{SseDecoder, SseEvent};

/// Texts recorded in the transcript when a send does not produce a reply
#[derive(Debug, Clone)]
pub struct Fallbacks {
    pub provider_error: String,
    pub no_reply: String,
    pub connection_failed: String,
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            provider_error: "Model error".to_string(),
            no_reply: "Could not get a valid reply from the model.".to_string(),
            connection_failed: "An error occurred while connecting to the chat service."
                .to_string(),
        }
    }
}

/// How the reply to a send arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Direct,
    Streamed,
}

/// Talks to the chat handler on behalf of a [`Session`]
pub struct ChatClient {
    http: Client,
    url: String,
    model: String,
    temperature: f32,
    fallbacks: Fallbacks,
}

impl ChatClient {
    pub fn new<S: Into<String>>(url: S) -> ChatResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            fallbacks: Fallbacks::default(),
        })
    }

    pub fn with_model<S: Into<String>>(mut self, model: S, temperature: f32) -> Self {
        self.model = model.into();
        self.temperature = temperature;
        self
    }

    pub fn with_fallbacks(mut self, fallbacks: Fallbacks) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    /// Send `text` and record the reply in `session`.
    ///
    /// Streamed fragments are appended to one live assistant message and
    /// handed to `on_delta` as they arrive. On a transport failure the
    /// session still ends idle with an assistant message explaining the
    /// failure, and the error is returned.
    pub async fn send<F>(&self, session: &mut Session, text: &str, mut on_delta: F) -> ChatResult<Delivery>
    where
        F: FnMut(&str),
    {
        session.begin_send(text)?;

        match self.exchange(session, &mut on_delta).await {
            Ok(delivery) => Ok(delivery),
            Err(e) => {
                error!("Chat exchange failed: {}", e);
                session.fail(self.fallbacks.connection_failed.clone());
                Err(e)
            }
        }
    }

    async fn exchange<F>(&self, session: &mut Session, on_delta: &mut F) -> ChatResult<Delivery>
    where
        F: FnMut(&str),
    {
        let payload = json!({
            "model": self.model,
            "messages": session.messages(),
            "temperature": self.temperature,
        });
        debug!(url = %self.url, messages = session.messages().len(), "sending chat request");

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let is_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/event-stream"));

        if !is_stream {
            session.begin_direct();
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| ChatError::Transport(e.to_string()))?;
            let value: Value = serde_json::from_slice(&body).unwrap_or_else(|_| {
                warn!(status = status.as_u16(), "handler returned a body that is not JSON");
                Value::Null
            });
            session.finish_direct(self.reply_message(&value));
            return Ok(Delivery::Direct);
        }

        session.begin_streaming();
        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| ChatError::Transport(e.to_string()))?;
            decoder.feed(&chunk);
            apply_events(&mut decoder, session, on_delta)?;
            if decoder.is_done() {
                break;
            }
        }
        decoder.finish();
        apply_events(&mut decoder, session, on_delta)?;

        session.finish_streaming();
        Ok(Delivery::Streamed)
    }

    /// Pick the assistant message out of a one-shot handler reply.
    pub fn reply_message(&self, value: &Value) -> Message {
        if let Some(message) = value
            .pointer("/choices/0/message")
            .and_then(|m| serde_json::from_value::<Message>(m.clone()).ok())
            .filter(|m| m.role == Role::Assistant)
        {
            return message;
        }

        if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
            error!("Handler returned an error: {}", error);
            return Message::assistant(format!(
                "{}: {}",
                self.fallbacks.provider_error,
                openai_error_message(error)
            ));
        }

        error!("Unexpected reply shape: {}", value);
        Message::assistant(self.fallbacks.no_reply.clone())
    }
}

/// Append every decoded delta to the live message, in order, up to the
/// first bad record.
fn apply_events<F>(decoder: &mut SseDecoder, session: &mut Session, on_delta: &mut F) -> ChatResult<()>
where
    F: FnMut(&str),
{
    for event in decoder.events() {
        if let SseEvent::Delta(fragment) = event? {
            session.append_to_last(&fragment);
            on_delta(&fragment);
        }
    }
    Ok(())
}
