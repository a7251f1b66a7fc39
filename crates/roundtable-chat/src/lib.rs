//! Conversable Agents and Group Chats
//!
//! Wires agent personas (code writer, code executor, general-knowledge
//! responder, human proxy) into coordinated conversations: a fixed
//! round-robin write-then-execute code loop, and an LLM-driven chat that
//! picks the next speaker from an arbitrary roster.
//!
//! # Example
//!
//! ```no_run
//! use roundtable_chat::factory;
//! use roundtable_core::{ExecutionSettings, LlmSettings};
//! use roundtable_llm::create_provider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = create_provider(&LlmSettings::default())?;
//!     let executor =
//!         factory::code_executor("./workdir", &ExecutionSettings::default()).await?;
//!
//!     let manager = factory::code_group_chat_manager(provider, executor, None, 1, 10)?;
//!     let transcript = manager.run("Print the first ten squares.").await?;
//!     for message in &transcript {
//!         println!("[{}] {}", message.name, message.content);
//!     }
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod error;
pub mod factory;
pub mod group;
pub mod manager;
pub mod message;

// Re-exports
pub use agent::{Agent, ConversableAgent, ConversableAgentBuilder};
pub use error::{ChatError, Result};
pub use group::{GroupChat, GroupChatBuilder, SpeakerSelectionMethod};
pub use manager::{is_termination_message, GroupChatManager, TerminationPredicate};
pub use message::ChatMessage;
