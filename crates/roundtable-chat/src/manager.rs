//! Group chat manager
//!
//! Drives a [`GroupChat`] round by round: pick a speaker, collect its
//! reply, append to the log, stop on the termination condition. A manager
//! is itself an [`Agent`], so a managed chat can participate in a larger
//! chat as a single speaker.

use async_trait::async_trait;
use roundtable_llm::LLMProvider;
use std::sync::Arc;

use crate::{
    agent::Agent,
    error::{ChatError, Result},
    group::GroupChat,
    message::ChatMessage,
};

/// Predicate deciding whether a message ends the conversation
pub type TerminationPredicate = Box<dyn Fn(&ChatMessage) -> bool + Send + Sync>;

/// Default termination condition: an empty body or the literal marker
/// `TERMINATE` anywhere in the message.
pub fn is_termination_message(msg: &ChatMessage) -> bool {
    msg.content.is_empty() || msg.content.contains("TERMINATE")
}

/// Coordinates turn order among the agents of a [`GroupChat`]
pub struct GroupChatManager {
    name: String,
    system_message: Option<String>,
    description: Option<String>,
    group: GroupChat,
    provider: Arc<dyn LLMProvider>,
    is_termination_msg: TerminationPredicate,
}

impl GroupChatManager {
    /// Create a builder
    pub fn builder(name: impl Into<String>) -> GroupChatManagerBuilder {
        GroupChatManagerBuilder::new(name)
    }

    /// The manager's system message, if any
    pub fn system_message(&self) -> Option<&str> {
        self.system_message.as_deref()
    }

    /// Snapshot of the group's message log after the latest run
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.group.messages().await
    }

    /// Run the conversation for `task` and return the transcript
    ///
    /// The task is recorded as the opening message; afterwards up to
    /// `max_round` reply rounds run. The chat stops early when the
    /// termination predicate fires, when speaker selection returns no
    /// speaker, or when a speaker exceeds its consecutive-reply budget.
    pub async fn run(&self, task: &str) -> Result<Vec<ChatMessage>> {
        let mut messages: Vec<ChatMessage> = Vec::new();

        if self.group.send_introductions() {
            messages.push(ChatMessage::new(
                self.name.as_str(),
                self.group.introduction_message(),
            ));
        }
        messages.push(ChatMessage::new(self.name.as_str(), task));

        let mut last_speaker: Option<String> = None;
        let mut consecutive_replies = 0usize;

        for round in 0..self.group.max_round() {
            let Some(speaker) = self
                .group
                .select_speaker(last_speaker.as_deref(), &self.provider, &messages)
                .await?
            else {
                tracing::info!("{}: speaker selection ended the chat", self.name);
                break;
            };

            if last_speaker.as_deref() == Some(speaker.name()) {
                consecutive_replies += 1;
            } else {
                consecutive_replies = 1;
            }
            if consecutive_replies > speaker.max_consecutive_auto_reply() {
                tracing::info!(
                    "{}: {} exhausted its consecutive reply budget",
                    self.name,
                    speaker.name()
                );
                break;
            }

            let reply = speaker.generate_reply(&messages).await?;
            let message = ChatMessage::new(speaker.name(), reply.unwrap_or_default());
            tracing::debug!(
                "{}: round {} speaker {} replied with {} chars",
                self.name,
                round,
                speaker.name(),
                message.content.len()
            );

            let terminate = (self.is_termination_msg)(&message);
            messages.push(message);
            last_speaker = Some(speaker.name().to_string());

            if terminate {
                tracing::info!("{}: termination condition met", self.name);
                break;
            }
        }

        self.group.set_messages(messages.clone()).await;
        Ok(messages)
    }

    /// The final substantive reply of a transcript: the last message not
    /// authored by the manager whose content survives stripping the
    /// termination marker.
    fn final_reply(&self, transcript: &[ChatMessage]) -> Option<String> {
        transcript
            .iter()
            .rev()
            .filter(|m| m.name != self.name)
            .map(|m| m.content.replace("TERMINATE", "").trim().to_string())
            .find(|content| !content.is_empty())
    }
}

#[async_trait]
impl Agent for GroupChatManager {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    async fn generate_reply(&self, history: &[ChatMessage]) -> Result<Option<String>> {
        let Some(last) = history.last() else {
            return Ok(None);
        };

        let transcript = self.run(&last.content).await?;
        Ok(self.final_reply(&transcript))
    }
}

/// Builder for [`GroupChatManager`]
pub struct GroupChatManagerBuilder {
    name: String,
    system_message: Option<String>,
    description: Option<String>,
    group: Option<GroupChat>,
    provider: Option<Arc<dyn LLMProvider>>,
    is_termination_msg: Option<TerminationPredicate>,
}

impl GroupChatManagerBuilder {
    /// Create a builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_message: None,
            description: None,
            group: None,
            provider: None,
            is_termination_msg: None,
        }
    }

    /// Set the system message
    pub fn system_message(mut self, msg: impl Into<String>) -> Self {
        self.system_message = Some(msg.into());
        self
    }

    /// Set the roster description used when this manager joins another chat
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the group chat to coordinate
    pub fn group(mut self, group: GroupChat) -> Self {
        self.group = Some(group);
        self
    }

    /// Set the LLM provider used for speaker selection
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the termination predicate
    pub fn termination<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ChatMessage) -> bool + Send + Sync + 'static,
    {
        self.is_termination_msg = Some(Box::new(predicate));
        self
    }

    /// Build the manager
    pub fn build(self) -> Result<GroupChatManager> {
        if self.name.is_empty() {
            return Err(ChatError::config("manager name cannot be empty"));
        }
        let group = self
            .group
            .ok_or_else(|| ChatError::config("group chat not set"))?;
        let provider = self
            .provider
            .ok_or_else(|| ChatError::config("LLM provider not set"))?;

        Ok(GroupChatManager {
            name: self.name,
            system_message: self.system_message,
            description: self.description,
            group,
            provider,
            is_termination_msg: self
                .is_termination_msg
                .unwrap_or_else(|| Box::new(is_termination_message)),
        })
    }
}
