//! Code Execution Backends
//!
//! Runs code blocks produced by writer agents, either as local
//! subprocesses (optionally inside a virtual environment and behind a
//! command guard) or inside a Docker container.
//!
//! # Example
//!
//! ```no_run
//! use roundtable_exec::{extract_code_blocks, CodeExecutor, LocalCommandLineExecutor};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = LocalCommandLineExecutor::new(Duration::from_secs(60), "./workdir")?;
//!     let blocks = extract_code_blocks("```sh\necho hello\n```");
//!     let result = executor.execute_blocks(&blocks).await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

pub mod block;
pub mod docker;
pub mod error;
pub mod executor;
pub mod guard;
pub mod local;
pub mod venv;

// Re-exports
pub use block::{extract_code_blocks, CodeBlock};
pub use docker::DockerCommandLineExecutor;
pub use error::{ExecError, Result};
pub use executor::{CodeExecutor, ExecutionResult, TIMEOUT_EXIT_CODE};
pub use guard::CommandGuard;
pub use local::LocalCommandLineExecutor;
pub use venv::{running_inside_ide, VenvOptions, VirtualEnv};
