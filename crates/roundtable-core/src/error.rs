//! Error type shared across the roundtable crates

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by configuration and other shared plumbing
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file/env parsing errors
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] config::ConfigError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CoreError::config("missing api key");
        assert!(matches!(err, CoreError::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: missing api key");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = CoreError::from(io_err);
        assert!(matches!(err, CoreError::Io(_)));
    }
}
