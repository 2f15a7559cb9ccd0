use bytes::{Buf, BufMut, BytesMut};
use serde_json::Value;

use crate::errors::{ChatError, ChatResult};
use crate::providers::utils::openai_error_message;

/// What a single SSE record meant to the chat transcript
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    /// A content fragment to append to the reply
    Delta(String),
    /// The `[DONE]` sentinel
    Done,
}

/// Incremental decoder for openai style completion streams.
///
/// Bytes can be fed in arbitrary pieces; records are only parsed once
/// their terminating blank line has arrived, so a split multi-byte character
/// or a half received JSON payload is simply kept until the rest shows up.
/// Records are decoded one at a time, so a bad record never hides the
/// events before it.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: BytesMut,
    /// Bytes of `buf` already searched for a blank line
    scanned: usize,
    /// The last byte fed was a CR, so a following LF belongs to it
    after_cr: bool,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `[DONE]` has been seen. Nothing is decoded after that.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Buffer a chunk. CRLF and lone CR line endings are stored as LF.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.done {
            return;
        }
        self.buf.reserve(chunk.len());
        for &byte in chunk {
            match byte {
                b'\r' => {
                    self.buf.put_u8(b'\n');
                    self.after_cr = true;
                }
                b'\n' if self.after_cr => self.after_cr = false,
                _ => {
                    self.buf.put_u8(byte);
                    self.after_cr = false;
                }
            }
        }
    }

    /// Decode the next complete record that means something to the
    /// transcript. `None` means more bytes are needed, or the stream is done.
    pub fn next_event(&mut self) -> Option<ChatResult<SseEvent>> {
        while !self.done {
            let pos = self.find_record_boundary()?;
            let record = self.buf.split_to(pos).freeze();
            self.buf.advance(2);
            self.scanned = 0;

            match parse_record(&record) {
                Ok(None) => continue,
                Ok(Some(SseEvent::Done)) => {
                    self.done = true;
                    self.buf.clear();
                    return Some(Ok(SseEvent::Done));
                }
                Ok(Some(event)) => return Some(Ok(event)),
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }

    /// Every event decodable from what has been fed so far
    pub fn events(&mut self) -> impl Iterator<Item = ChatResult<SseEvent>> + '_ {
        std::iter::from_fn(move || self.next_event())
    }

    /// Terminate a trailing record the stream ended without a blank line,
    /// so it can be drained like any other.
    pub fn finish(&mut self) {
        self.after_cr = false;
        if !self.done && !self.buf.is_empty() {
            self.buf.extend_from_slice(b"\n\n");
        }
    }

    /// Position of the first blank line, resuming where the last search
    /// stopped
    fn find_record_boundary(&mut self) -> Option<usize> {
        let from = self.scanned.saturating_sub(1);
        match self.buf[from..].windows(2).position(|w| w == b"\n\n") {
            Some(offset) => Some(from + offset),
            None => {
                self.scanned = self.buf.len();
                None
            }
        }
    }
}

fn parse_record(record: &[u8]) -> ChatResult<Option<SseEvent>> {
    let text = std::str::from_utf8(record).map_err(|e| ChatError::Decode(e.to_string()))?;

    let data_lines: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();
    if data_lines.is_empty() {
        return Ok(None);
    }

    let data = data_lines.join("\n");
    if data.trim() == "[DONE]" {
        return Ok(Some(SseEvent::Done));
    }

    let value: Value = serde_json::from_str(&data).map_err(|e| ChatError::Decode(e.to_string()))?;
    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        return Err(ChatError::provider(None, openai_error_message(error)));
    }

    Ok(value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .map(|content| SseEvent::Delta(content.to_string())))
}
