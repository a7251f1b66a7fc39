//! Executor trait and execution results

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{block::CodeBlock, Result};

/// Exit code reported when execution exceeds the configured timeout
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Outcome of running one or more code blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Exit code of the last command that ran (0 on success)
    pub exit_code: i32,
    /// Combined stdout/stderr of the executed blocks
    pub output: String,
}

impl ExecutionResult {
    /// Create a result
    pub fn new(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    /// Whether every block ran to completion successfully
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

impl fmt::Display for ExecutionResult {
    /// Render in the form agents exchange over chat:
    /// `exitcode: 0 (execution succeeded)\nCode output: ...`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.is_success() {
            "execution succeeded"
        } else {
            "execution failed"
        };
        write!(
            f,
            "exitcode: {} ({})\nCode output: {}",
            self.exit_code, verdict, self.output
        )
    }
}

/// Backend that runs generated code blocks
///
/// Implementations run blocks in order and stop at the first failure.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Execute the given blocks and return the combined result
    async fn execute_blocks(&self, blocks: &[CodeBlock]) -> Result<ExecutionResult>;

    /// Backend name (for logging)
    fn name(&self) -> &str;
}
