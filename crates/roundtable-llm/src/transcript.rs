//! Transcript log for multi-turn interactions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Message, MessageRole};

/// An ordered log of provider messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Unique identifier for this transcript
    pub id: String,

    /// Messages in order
    messages: Vec<Message>,

    /// When this transcript was created
    pub created_at: DateTime<Utc>,

    /// When this transcript was last updated
    pub updated_at: DateTime<Utc>,
}

impl Transcript {
    /// Create a new empty transcript
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Add a system message
    pub fn push_system(&mut self, content: impl Into<String>) {
        self.push(Message::system(content));
    }

    /// Add a user message
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    /// Add an assistant message
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    /// All messages in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last message, if any
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The system message, if one was recorded
    pub fn system_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == MessageRole::System)
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
