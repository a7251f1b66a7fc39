//! Docker command-line executor
//!
//! Runs code blocks inside a throwaway container with the work dir
//! bind-mounted. Container isolation stands in for the command guard used
//! by the local executor.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use uuid::Uuid;

use crate::{
    block::CodeBlock,
    executor::{CodeExecutor, ExecutionResult, TIMEOUT_EXIT_CODE},
    Result,
};

/// Executor that runs code blocks via `docker run`
pub struct DockerCommandLineExecutor {
    image: String,
    timeout: Duration,
    work_dir: PathBuf,
}

impl DockerCommandLineExecutor {
    /// Create an executor using `image` for the containers
    pub fn new(
        image: impl Into<String>,
        timeout: Duration,
        work_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let work_dir = work_dir.into();
        std::fs::create_dir_all(&work_dir)?;

        Ok(Self {
            image: image.into(),
            timeout,
            work_dir,
        })
    }

    /// Container image used for execution
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Interpreter and file extension for a language tag
    fn interpreter_for(language: &str) -> Option<(&'static str, &'static str)> {
        match language {
            "python" | "py" | "python3" => Some(("python3", "py")),
            "sh" | "bash" | "shell" => Some(("sh", "sh")),
            _ => None,
        }
    }

    /// Arguments for `docker run` executing `filename` with `interpreter`
    fn docker_run_args(&self, interpreter: &str, filename: &str) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "-v".to_string(),
            format!("{}:/workspace", self.work_dir.display()),
            "-w".to_string(),
            "/workspace".to_string(),
            self.image.clone(),
            interpreter.to_string(),
            filename.to_string(),
        ]
    }

    async fn run_block(&self, block: &CodeBlock) -> Result<ExecutionResult> {
        let Some((interpreter, extension)) = Self::interpreter_for(&block.language) else {
            return Ok(ExecutionResult::new(
                1,
                format!("unknown language: {}", block.language),
            ));
        };

        let filename = format!("tmp_code_{}.{}", Uuid::new_v4().simple(), extension);
        tokio::fs::write(self.work_dir.join(&filename), &block.code).await?;

        let args = self.docker_run_args(interpreter, &filename);
        tracing::debug!("docker {}", args.join(" "));

        let child = Command::new("docker")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let exit_code = output.status.code().unwrap_or(-1);
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                Ok(ExecutionResult::new(exit_code, combined))
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                tracing::warn!("Container execution timed out after {:?}", self.timeout);
                Ok(ExecutionResult::new(TIMEOUT_EXIT_CODE, "Timeout"))
            }
        }
    }
}

#[async_trait]
impl CodeExecutor for DockerCommandLineExecutor {
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
        "docker_command_line"
    }
}
