//! Local command-line executor
//!
//! Writes each code block to a file in the work dir and runs it with the
//! matching interpreter, optionally inside a virtual environment. Each
//! block gets its own timeout; the run stops at the first failing block.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use uuid::Uuid;

use crate::{
    block::CodeBlock,
    executor::{CodeExecutor, ExecutionResult, TIMEOUT_EXIT_CODE},
    guard::CommandGuard,
    venv::VirtualEnv,
    Result,
};

/// Executor that runs code blocks as local subprocesses
pub struct LocalCommandLineExecutor {
    timeout: Duration,
    work_dir: PathBuf,
    virtual_env: Option<VirtualEnv>,
    guard: Option<CommandGuard>,
}

impl LocalCommandLineExecutor {
    /// Create an executor writing code files into `work_dir`
    pub fn new(timeout: Duration, work_dir: impl Into<PathBuf>) -> Result<Self> {
        let work_dir = work_dir.into();
        std::fs::create_dir_all(&work_dir)?;

        Ok(Self {
            timeout,
            work_dir,
            virtual_env: None,
            guard: None,
        })
    }

    /// Run python blocks with the given virtual environment's interpreter
    ///
    /// `None` keeps the system interpreter.
    pub fn with_virtual_env(mut self, venv: Option<VirtualEnv>) -> Self {
        self.virtual_env = venv;
        self
    }

    /// Reject blocks matching the guard's deny-list before running them
    pub fn with_guard(mut self, guard: CommandGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Interpreter and file extension for a language tag
    fn command_for(&self, language: &str) -> Option<(PathBuf, &'static str)> {
        match language {
            "python" | "py" | "python3" => {
                let interpreter = self
                    .virtual_env
                    .as_ref()
                    .map(|venv| venv.python_path())
                    .unwrap_or_else(|| PathBuf::from("python3"));
                Some((interpreter, "py"))
            }
            "sh" | "bash" | "shell" => Some((PathBuf::from("sh"), "sh")),
            _ => None,
        }
    }

    /// Run a single block, honoring the per-block timeout
    async fn run_block(&self, block: &CodeBlock) -> Result<ExecutionResult> {
        if let Some(guard) = &self.guard {
            if let Some(reason) = guard.check(block) {
                tracing::warn!("Refusing to execute block: {}", reason);
                return Ok(ExecutionResult::new(
                    1,
                    format!("Execution blocked: {}", reason),
                ));
            }
        }

        let Some((program, extension)) = self.command_for(&block.language) else {
            return Ok(ExecutionResult::new(
                1,
                format!("unknown language: {}", block.language),
            ));
        };

        let filename = format!("tmp_code_{}.{}", Uuid::new_v4().simple(), extension);
        tokio::fs::write(self.work_dir.join(&filename), &block.code).await?;

        tracing::debug!(
            "Running {} {} in {}",
            program.display(),
            filename,
            self.work_dir.display()
        );

        let child = Command::new(&program)
            .arg(&filename)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // kill_on_drop reaps the child when the timeout wins the race
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let exit_code = output.status.code().unwrap_or(-1);
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                Ok(ExecutionResult::new(exit_code, combined))
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                tracing::warn!(
                    "Execution timed out after {:?}, killing {}",
                    self.timeout,
                    filename
                );
                Ok(ExecutionResult::new(TIMEOUT_EXIT_CODE, "Timeout"))
            }
        }
    }
}

#[async_trait]
impl CodeExecutor for LocalCommandLineExecutor {
    async fn execute_blocks(&self, blocks: &[CodeBlock]) -> Result<ExecutionResult> {
        let mut combined_output = String::new();

        for block in blocks {
            let result = self.run_block(block).await?;
            combined_output.push_str(&result.output);

            if !result.is_success() {
                return Ok(ExecutionResult::new(result.exit_code, combined_output));
            }
        }

        Ok(ExecutionResult::new(0, combined_output))
    }

    fn name(&self) -> &str {
        "local_command_line"
    }
}
