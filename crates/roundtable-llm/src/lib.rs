//! LLM Provider Abstraction
//!
//! A unified interface over chat-completions servers that speak the OpenAI
//! dialect, whether hosted or self-deployed.
//!
//! # Example
//!
//! ```no_run
//! use roundtable_llm::{LLMProvider, Message, OpenAIProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OpenAIProvider::with_base_url(
//!         "http://localhost:5000/v1",
//!         None,
//!         "llama-3.1-8b-instruct",
//!     )?;
//!
//!     let response = provider
//!         .send_message(vec![Message::user("Hello, how are you?")])
//!         .await?;
//!     println!("Response: {}", response.content);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod openai;
pub mod provider;
pub mod transcript;
pub mod types;

// Re-exports
pub use error::{LLMError, Result};
pub use openai::OpenAIProvider;
pub use provider::LLMProvider;
pub use transcript::Transcript;
pub use types::{Message, MessageRole, Response, TokenUsage};

use roundtable_core::LlmSettings;
use std::sync::Arc;
use std::time::Duration;

/// Create a provider from configuration
pub fn create_provider(settings: &LlmSettings) -> Result<Arc<dyn LLMProvider>> {
    let provider = OpenAIProvider::with_base_url(
        &settings.base_url,
        settings.api_key.clone(),
        &settings.model,
    )?
    .with_timeout(Duration::from_secs(settings.timeout_secs));

    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_from_settings() {
        let settings = LlmSettings {
            base_url: "http://127.0.0.1:8000/v1".to_string(),
            api_key: None,
            model: "local".to_string(),
            timeout_secs: 30,
        };

        let provider = create_provider(&settings).unwrap();
        assert_eq!(provider.model(), "local");
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_create_provider_rejects_empty_base_url() {
        let settings = LlmSettings {
            base_url: String::new(),
            api_key: None,
            model: "local".to_string(),
            timeout_secs: 30,
        };

        assert!(create_provider(&settings).is_err());
    }
}
