//! Conversable agents
//!
//! An agent is a named participant in a group chat. Replies come from an
//! LLM, from a code executor, or not at all; which one is decided at
//! construction time, not per call.

use async_trait::async_trait;
use roundtable_exec::{extract_code_blocks, CodeExecutor};
use roundtable_llm::{LLMProvider, Message};
use std::sync::Arc;

use crate::{
    error::{ChatError, Result},
    message::ChatMessage,
};

/// A named participant in a conversation
///
/// Implemented by [`ConversableAgent`] and by group chat managers, so a
/// whole managed chat can sit in another chat's roster as one participant.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name, unique within a roster
    fn name(&self) -> &str;

    /// Roster description used for speaker selection
    fn description(&self) -> Option<&str> {
        None
    }

    /// Consecutive replies this agent may produce before the chat ends
    fn max_consecutive_auto_reply(&self) -> usize {
        usize::MAX
    }

    /// Produce a reply to the conversation so far
    ///
    /// `Ok(None)` means the agent has nothing to say (for an executor
    /// agent: no code blocks in the last message).
    async fn generate_reply(&self, history: &[ChatMessage]) -> Result<Option<String>>;
}

/// A pre-configured conversational agent
pub struct ConversableAgent {
    name: String,
    system_message: Option<String>,
    description: Option<String>,
    provider: Option<Arc<dyn LLMProvider>>,
    executor: Option<Arc<dyn CodeExecutor>>,
    max_consecutive_auto_reply: usize,
}

impl ConversableAgent {
    /// Create a builder for an agent with the given name
    pub fn builder(name: impl Into<String>) -> ConversableAgentBuilder {
        ConversableAgentBuilder::new(name)
    }

    /// Map the shared transcript into provider messages from this agent's
    /// point of view: own turns become assistant messages, everything else
    /// arrives as user messages tagged with the speaker name.
    fn provider_messages(&self, history: &[ChatMessage]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);

        if let Some(system) = &self.system_message {
            messages.push(Message::system(system));
        }

        for msg in history {
            if msg.name == self.name {
                messages.push(Message::assistant(&msg.content).with_name(&msg.name));
            } else {
                messages.push(Message::user(&msg.content).with_name(&msg.name));
            }
        }

        messages
    }
}

#[async_trait]
impl Agent for ConversableAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn max_consecutive_auto_reply(&self) -> usize {
        self.max_consecutive_auto_reply
    }

    async fn generate_reply(&self, history: &[ChatMessage]) -> Result<Option<String>> {
        // Executor-backed agents reply with execution results only.
        if let Some(executor) = &self.executor {
            let Some(last) = history.last() else {
                return Ok(None);
            };

            let blocks = extract_code_blocks(&last.content);
            if blocks.is_empty() {
                tracing::debug!("{}: no code blocks in last message", self.name);
                return Ok(None);
            }

            tracing::info!("{}: executing {} code block(s)", self.name, blocks.len());
            let result = executor.execute_blocks(&blocks).await?;
            return Ok(Some(result.to_string()));
        }

        if let Some(provider) = &self.provider {
            let response = provider.send_message(self.provider_messages(history)).await?;
            return Ok(Some(response.content));
        }

        Ok(None)
    }
}

/// Builder for [`ConversableAgent`]
pub struct ConversableAgentBuilder {
    name: String,
    system_message: Option<String>,
    description: Option<String>,
    provider: Option<Arc<dyn LLMProvider>>,
    executor: Option<Arc<dyn CodeExecutor>>,
    max_consecutive_auto_reply: usize,
}

impl ConversableAgentBuilder {
    /// Create a builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_message: None,
            description: None,
            provider: None,
            executor: None,
            max_consecutive_auto_reply: 1,
        }
    }

    /// Set the system message
    pub fn system_message(mut self, msg: impl Into<String>) -> Self {
        self.system_message = Some(msg.into());
        self
    }

    /// Set the roster description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Back replies with an LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Back replies with a code executor
    pub fn executor(mut self, executor: Arc<dyn CodeExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Set the consecutive reply budget
    pub fn max_consecutive_auto_reply(mut self, max: usize) -> Self {
        self.max_consecutive_auto_reply = max;
        self
    }

    /// Build the agent
    pub fn build(self) -> Result<ConversableAgent> {
        if self.name.is_empty() {
            return Err(ChatError::config("agent name cannot be empty"));
        }

        Ok(ConversableAgent {
            name: self.name,
            system_message: self.system_message,
            description: self.description,
            provider: self.provider,
            executor: self.executor,
            max_consecutive_auto_reply: self.max_consecutive_auto_reply,
        })
    }
}
