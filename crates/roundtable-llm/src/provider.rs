//! LLM provider trait definition

use async_trait::async_trait;

use crate::{Message, Response, Result};

/// Trait for chat-completions backends
///
/// Implementations provide a unified interface over OpenAI-compatible
/// servers; agents and speaker selection only depend on this trait.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send a conversation and wait for the complete response
    ///
    /// # Arguments
    /// * `messages` - Conversation history including the new message
    async fn send_message(&self, messages: Vec<Message>) -> Result<Response>;

    /// Get the model name/identifier
    fn model(&self) -> &str;

    /// Get the provider name
    fn name(&self) -> &str;
}
