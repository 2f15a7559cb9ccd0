use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;

use crate::errors::{ChatError, ChatResult};
use crate::providers::base::{Completion, CompletionRequest, Provider};
use crate::relay::ByteStream;

/// A mock provider that returns pre-configured completions and records
/// every request it was given
#[derive(Clone, Default)]
pub struct MockProvider {
    completions: Arc<Mutex<Vec<ChatResult<Completion>>>>,
    stream_frames: Arc<Mutex<Vec<ChatResult<Bytes>>>>,
    pub requests: Arc<Mutex<Vec<(CompletionRequest, bool)>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of completions
    pub fn new(completions: Vec<ChatResult<Completion>>) -> Self {
        Self {
            completions: Arc::new(Mutex::new(completions)),
            ..Default::default()
        }
    }

    /// Frames returned by the next streamed call
    pub fn with_stream(self, frames: Vec<ChatResult<Bytes>>) -> Self {
        *self.stream_frames.lock().unwrap() = frames;
        self
    }

    pub fn recorded(&self) -> Vec<(CompletionRequest, bool)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> ChatResult<Completion> {
        self.requests.lock().unwrap().push((request.clone(), false));
        let mut completions = self.completions.lock().unwrap();
        if completions.is_empty() {
            Err(ChatError::provider(None, "no more mock completions"))
        } else {
            completions.remove(0)
        }
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> ChatResult<ByteStream> {
        self.requests.lock().unwrap().push((request.clone(), true));
        let frames = std::mem::take(&mut *self.stream_frames.lock().unwrap());
        Ok(Box::pin(stream::iter(frames)))
    }
}
