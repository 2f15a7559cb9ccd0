//! These models represent the objects passed between the chat client, the
//! edge handler and the completion provider.
//!
//! All three speak the same openai-style chat format, so unlike a multi
//! provider agent we keep a single set of wire-compatible structs and
//! validate untrusted input before it is converted into them.
pub mod message;
pub mod role;
pub mod tool;

pub use message::{validate_messages, ChatRequest, Message};
pub use role::Role;
pub use tool::{FunctionCall, Tool, ToolCall};
