//! Error types for code execution

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, ExecError>;

/// Errors raised while preparing or running generated code
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// I/O errors (work dir, code files, process spawning)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Virtual environment creation failed
    #[error("Virtual environment creation failed: {0}")]
    VenvCreation(String),

    /// Invalid executor configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid guard pattern
    #[error("Invalid guard pattern: {0}")]
    Pattern(String),
}

impl ExecError {
    /// Create a venv creation error
    pub fn venv<S: Into<String>>(msg: S) -> Self {
        Self::VenvCreation(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
