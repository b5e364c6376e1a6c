//! Notebook execution before export.
//!
//! Execution itself is delegated to `jupyter nbconvert`. This module only
//! decides how it is invoked and injects an optional preamble script.
//!
//! | Type              | Purpose                                          |
//! |-------------------|--------------------------------------------------|
//! | `Execute`         | Seam: run a notebook, return the executed one    |
//! | `JupyterExecutor` | `jupyter nbconvert --execute` over stdin/stdout  |
//! | `WithPreamble`    | Runs a setup script first, hides it afterwards   |

mod jupyter;
mod preamble;

pub use jupyter::JupyterExecutor;
pub use preamble::{PREAMBLE_CELL_ID, WithPreamble, insert_preamble, strip_preamble};

use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::NotebookConfig;

/// Execution errors raised before or after the external run.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("`jupyter` not found in PATH, required when `notebook.execute` is enabled")]
    JupyterNotFound(#[source] which::Error),

    #[error("IO error when reading preamble `{0}`")]
    Preamble(PathBuf, #[source] std::io::Error),

    #[error("notebook has no `cells` array")]
    MissingCells,

    #[error("executed notebook is not valid JSON")]
    InvalidOutput(#[source] serde_json::Error),
}

/// Runs every code cell of a notebook and returns it with fresh outputs.
pub trait Execute: Send + Sync {
    /// `cwd` is the directory the kernel starts in.
    fn execute(&self, notebook: Value, cwd: &Path) -> Result<Value>;
}

impl<F> Execute for F
where
    F: Fn(Value, &Path) -> Result<Value> + Send + Sync,
{
    fn execute(&self, notebook: Value, cwd: &Path) -> Result<Value> {
        self(notebook, cwd)
    }
}

/// Build the executor described by the `[notebook]` section.
///
/// Returns `None` when execution is disabled.
pub fn from_config(config: &NotebookConfig) -> Result<Option<Box<dyn Execute>>> {
    if !config.execute {
        return Ok(None);
    }

    let jupyter = JupyterExecutor::locate(config.timeout)?;
    Ok(Some(match &config.preamble {
        Some(preamble) => Box::new(WithPreamble::new(jupyter, preamble.clone())),
        None => Box::new(jupyter),
    }))
}
