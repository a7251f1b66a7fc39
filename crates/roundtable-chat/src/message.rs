//! Chat messages exchanged between agents

use serde::{Deserialize, Serialize};

/// A message in a group chat transcript, attributed to its speaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Name of the agent that produced the message
    pub name: String,
    /// Message body
    pub content: String,
}

impl ChatMessage {
    /// Create a message
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}
