//! Configuration for the roundtable runtime
//!
//! Settings are layered from defaults, an optional configuration file
//! (TOML, JSON or YAML by extension) and `ROUNDTABLE_*` environment
//! variables. The defaults mirror the factory defaults used when wiring
//! agents and executors, so an empty config file yields a working setup.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the runtime
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundtableConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// LLM endpoint settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Code execution settings
    #[serde(default)]
    pub execution: ExecutionSettings,

    /// Group chat settings
    #[serde(default)]
    pub chat: ChatSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

/// Settings for the chat-completions endpoint the agents talk to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Base URL of an OpenAI-compatible server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; falls back to unauthenticated requests when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name to request
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

/// Settings for the code execution backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Run generated code inside a Docker container instead of locally
    #[serde(default)]
    pub run_code_in_docker: bool,

    /// Timeout for each code execution in seconds
    #[serde(default = "default_exec_timeout_secs")]
    pub timeout_secs: u64,

    /// Give the virtual environment access to system site packages
    #[serde(default = "default_true")]
    pub system_site_packages: bool,

    /// Restriction level for local execution; 2 and above enables the
    /// command guard
    #[serde(default = "default_restrictions_level")]
    pub restrictions_level: u8,

    /// Directory for the virtual environment; a unique name is generated
    /// when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venv_dir: Option<PathBuf>,

    /// Container image for Docker-backed execution
    #[serde(default = "default_docker_image")]
    pub docker_image: String,

    /// Working directory for generated code files; a temporary directory
    /// is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

/// Settings for group chat coordination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Consecutive replies an agent may produce before the chat ends
    #[serde(default = "default_max_consecutive_auto_reply")]
    pub max_consecutive_auto_reply: usize,

    /// Maximum number of conversation rounds
    #[serde(default = "default_max_round")]
    pub max_round: usize,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_exec_timeout_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_restrictions_level() -> u8 {
    2
}

fn default_docker_image() -> String {
    "python:3.10-slim-bullseye".to_string()
}

fn default_max_consecutive_auto_reply() -> usize {
    1
}

fn default_max_round() -> usize {
    10
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            run_code_in_docker: false,
            timeout_secs: default_exec_timeout_secs(),
            system_site_packages: default_true(),
            restrictions_level: default_restrictions_level(),
            venv_dir: None,
            docker_image: default_docker_image(),
            work_dir: None,
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_consecutive_auto_reply: default_max_consecutive_auto_reply(),
            max_round: default_max_round(),
        }
    }
}

/// Load configuration from a file, layered with `ROUNDTABLE_*` env vars
///
/// # Example
///
/// ```no_run
/// use roundtable_core::config::load_config;
///
/// let config = load_config("roundtable.toml").unwrap();
/// println!("model: {}", config.llm.model);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RoundtableConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CoreError::config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("ROUNDTABLE").separator("__"))
        .build()?;

    let config: RoundtableConfig = settings.try_deserialize()?;

    tracing::info!("Configuration loaded from {}", path.display());

    Ok(config)
}

/// Load configuration, falling back to defaults if the file is missing
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> RoundtableConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            RoundtableConfig::default()
        }
    }
}
