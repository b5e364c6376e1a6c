//! `jupyter nbconvert` backed execution.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{Execute, ExecuteError};
use crate::debug;
use crate::utils::exec::{Cmd, NBCONVERT_FILTER};

/// Executes notebooks with `jupyter nbconvert --execute`.
///
/// The notebook travels over stdin and the executed copy comes back on
/// stdout, so nothing is written next to the source.
#[derive(Debug, Clone)]
pub struct JupyterExecutor {
    program: PathBuf,
    timeout: Option<u64>,
}

impl JupyterExecutor {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<u64>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Find `jupyter` in `PATH`.
    pub fn locate(timeout: Option<u64>) -> Result<Self, ExecuteError> {
        let program = which::which("jupyter").map_err(ExecuteError::JupyterNotFound)?;
        Ok(Self::new(program, timeout))
    }

    /// Arguments passed to `jupyter`.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "nbconvert",
            "--to",
            "notebook",
            "--execute",
            "--stdin",
            "--stdout",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        if let Some(secs) = self.timeout {
            args.push(format!("--ExecutePreprocessor.timeout={secs}"));
        }
        args
    }
}

impl Execute for JupyterExecutor {
    fn execute(&self, notebook: Value, cwd: &Path) -> Result<Value> {
        let input = serde_json::to_vec(&notebook).context("Failed to serialize notebook")?;
        debug!("execute"; "running {} in {}", self.program.display(), cwd.display());

        let output = Cmd::new(&self.program)
            .args(self.args())
            .cwd(cwd)
            .stdin(input)
            .filter(&NBCONVERT_FILTER)
            .run()?;

        let executed: Value = serde_json::from_slice(&output.stdout).map_err(ExecuteError::InvalidOutput)?;
        Ok(executed)
    }
}
