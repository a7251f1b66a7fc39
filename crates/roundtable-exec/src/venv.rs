//! Virtual environment creation for local python execution

use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::error::{ExecError, Result};

/// Options for virtual environment creation
#[derive(Debug, Clone)]
pub struct VenvOptions {
    /// Give the environment access to system site packages
    pub system_site_packages: bool,
    /// Install pip into the environment
    pub with_pip: bool,
    /// Symlink the interpreter instead of copying it
    pub symlinks: bool,
}

impl Default for VenvOptions {
    fn default() -> Self {
        Self {
            system_site_packages: true,
            with_pip: true,
            symlinks: true,
        }
    }
}

/// A created virtual environment
#[derive(Debug, Clone)]
pub struct VirtualEnv {
    root: PathBuf,
}

impl VirtualEnv {
    /// Create a virtual environment at `dir` with `python3 -m venv`
    pub async fn create(dir: impl Into<PathBuf>, options: &VenvOptions) -> Result<Self> {
        let root = dir.into();

        let mut cmd = Command::new("python3");
        cmd.arg("-m").arg("venv");
        if options.system_site_packages {
            cmd.arg("--system-site-packages");
        }
        if !options.with_pip {
            cmd.arg("--without-pip");
        }
        if options.symlinks {
            cmd.arg("--symlinks");
        } else {
            cmd.arg("--copies");
        }
        cmd.arg(&root);

        tracing::info!("Creating virtual environment at {}", root.display());

        let output = cmd
            .output()
            .await
            .map_err(|e| ExecError::venv(format!("failed to run python3 -m venv: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExecError::venv(format!(
                "python3 -m venv exited with {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        Ok(Self { root })
    }

    /// Wrap an environment that already exists on disk
    pub fn from_existing(dir: impl Into<PathBuf>) -> Self {
        Self { root: dir.into() }
    }

    /// Root directory of the environment
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the environment's python interpreter
    pub fn python_path(&self) -> PathBuf {
        if cfg!(target_os = "windows") {
            self.root.join("Scripts").join("python.exe")
        } else {
            self.root.join("bin").join("python")
        }
    }
}

/// Whether the process runs inside an IDE harness that breaks venv creation
///
/// PyCharm-style runners set PYCHARM_HOSTED; the executor factory falls back
/// to the system interpreter there and logs a warning.
pub fn running_inside_ide() -> bool {
    std::env::var_os("PYCHARM_HOSTED").is_some()
}
