pub mod ollama;

pub use ollama::OllamaClient;

use async_trait::async_trait;

use crate::state::ChatMessage;

/// Stored and shown in place of a reply when a request fails.
pub const FALLBACK_REPLY: &str = "Error processing request.";

/// Anything that can answer the current conversation with a line of text.
///
/// Implementations must not fail: errors are logged and mapped to
/// [`FALLBACK_REPLY`] so the chat loop keeps running.
#[async_trait]
pub trait ChatBackend {
    async fn reply(&self, messages: &[ChatMessage]) -> String;
}
