//! Bridges a provider's byte stream into a response body.
//!
//! The relay never reads ahead: an upstream chunk is only pulled when the
//! consumer asks for the next item, so a slow client slows the provider
//! read down instead of piling bytes up in memory.
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{self, FusedStream};
use futures::Stream;
use serde_json::json;
use tracing::{debug, error};

use crate::errors::{ChatError, ChatResult};
use crate::models::message::Message;

/// Byte stream handed to the HTTP layer
pub type ByteStream = Pin<Box<dyn Stream<Item = ChatResult<Bytes>> + Send>>;

pub struct RelayStream<S> {
    upstream: Option<S>,
}

impl<S> RelayStream<S> {
    pub fn new(upstream: S) -> Self {
        Self {
            upstream: Some(upstream),
        }
    }
}

impl<S, E> Stream for RelayStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    type Item = ChatResult<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(upstream) = self.upstream.as_mut() else {
            return Poll::Ready(None);
        };

        let polled = Pin::new(upstream).poll_next(cx);
        match polled {
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(Some(Err(e))) => {
                error!("Upstream stream failed: {}", e);
                // Release the reader, nothing more is read after an error
                self.upstream = None;
                Poll::Ready(Some(Err(ChatError::Transport(e.to_string()))))
            }
            Poll::Ready(None) => {
                debug!("Upstream stream finished");
                self.upstream = None;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<S, E> FusedStream for RelayStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    fn is_terminated(&self) -> bool {
        self.upstream.is_none()
    }
}

/// Frame an already complete message the way a provider would stream it:
/// one delta carrying the whole text, a stop chunk and the `[DONE]` sentinel.
pub fn final_message_stream(id: Option<&str>, model: Option<&str>, message: &Message) -> ByteStream {
    let chunk = |delta: serde_json::Value, finish_reason: Option<&str>| -> ChatResult<Bytes> {
        let frame = json!({
            "id": id,
            "object": "chat.completion.chunk",
            "model": model,
            "choices": [{"index": 0, "delta": delta, "finish_reason": finish_reason}]
        });
        Ok(Bytes::from(format!("data: {}\n\n", frame)))
    };

    let frames = vec![
        chunk(json!({"role": "assistant", "content": message.text()}), None),
        chunk(json!({}), Some("stop")),
        Ok(Bytes::from_static(b"data: [DONE]\n\n")),
    ];
    Box::pin(stream::iter(frames))
}
