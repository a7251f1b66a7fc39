//! Fenced code block extraction from chat messages

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A single fenced code block lifted from a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language tag of the fence; unlabeled fences default to python
    pub language: String,
    /// The code inside the fence
    pub code: String,
}

impl CodeBlock {
    /// Create a code block
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
        }
    }
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // ```lang\n ... \n``` with an optional language tag
        Regex::new(r"(?s)```([A-Za-z0-9_+-]*)[ \t]*\r?\n(.*?)```").expect("valid fence regex")
    })
}

/// Extract all fenced code blocks from a message body
///
/// Unlabeled fences are treated as python; the writer agents are instructed
/// to emit python or sh.
pub fn extract_code_blocks(content: &str) -> Vec<CodeBlock> {
    fence_regex()
        .captures_iter(content)
        .map(|caps| {
            let language = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let language = if language.is_empty() {
                "python".to_string()
            } else {
                language.to_lowercase()
            };
            let code = caps
                .get(2)
                .map(|m| m.as_str())
                .unwrap_or("")
                .trim_end_matches(['\n', '\r'])
                .to_string();
            CodeBlock { language, code }
        })
        .filter(|block| !block.code.trim().is_empty())
        .collect()
}
