//! Roundtable Core
//!
//! Shared plumbing for the roundtable workspace: the common error type,
//! layered configuration and logging setup.

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{
    load_config, load_config_or_default, ChatSettings, ExecutionSettings, LlmSettings,
    LoggingConfig, RoundtableConfig,
};
pub use error::{CoreError, Result};
pub use logging::init_logging;
