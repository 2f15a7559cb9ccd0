use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use super::base::{Completion, CompletionRequest, Provider};
use super::configs::OpenAiProviderConfig;
use super::utils::{classify_completion, completion_payload, openai_error_message};
use crate::errors::{ChatError, ChatResult};
use crate::relay::{ByteStream, RelayStream};

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> ChatResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> ChatResult<reqwest::Response> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Keep whatever the provider said about the failure, it is surfaced to the caller
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<Value>(&body) {
            Ok(value) => value
                .get("error")
                .map(openai_error_message)
                .unwrap_or(body),
            Err(_) if body.is_empty() => status.to_string(),
            Err(_) => body,
        };
        error!(status = status.as_u16(), %message, "completion request failed");
        Err(ChatError::provider(Some(status.as_u16()), message))
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> ChatResult<Completion> {
        let payload = completion_payload(request, false)?;
        let response: Value = self.post(payload).await?.json().await?;

        let completion = classify_completion(response);
        if let Some(usage) = &completion.usage {
            debug!(?usage, model = ?completion.model, "completion usage");
        }
        Ok(completion)
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> ChatResult<ByteStream> {
        let payload = completion_payload(request, true)?;
        let response = self.post(payload).await?;

        Ok(Box::pin(RelayStream::new(Box::pin(response.bytes_stream()))))
    }
}
