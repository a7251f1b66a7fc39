//! Error types for agents and group chats

use roundtable_exec::ExecError;
use roundtable_llm::LLMError;

/// Result type for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors raised while wiring or running agent conversations
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Invalid agent or group chat configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM call failed
    #[error("LLM error: {0}")]
    Llm(#[from] LLMError),

    /// Code execution failed
    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),
}

impl ChatError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
