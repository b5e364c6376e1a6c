//! `[notebook]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [notebook]
//! execute = true                    # Run notebooks before converting them
//! preamble = "scripts/setup.py"     # Executed first, in the same kernel
//! timeout = 600                     # Per-cell timeout in seconds
//! write_markdown = false            # Keep `<name>.md.tmp` next to each notebook
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

/// Notebook conversion settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookConfig {
    /// Execute notebooks before conversion.
    pub execute: bool,

    /// Script run in the kernel before the notebook's own cells.
    pub preamble: Option<PathBuf>,

    /// Per-cell execution timeout in seconds.
    pub timeout: Option<u64>,

    /// Also persist the intermediate Markdown next to the source.
    pub write_markdown: bool,
}

impl NotebookConfig {
    pub const PREAMBLE: FieldPath = FieldPath::new("notebook.preamble");
    pub const TIMEOUT: FieldPath = FieldPath::new("notebook.timeout");

    /// Validate resolved settings.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(preamble) = &self.preamble {
            if !preamble.is_file() {
                diag.error_with_hint(
                    Self::PREAMBLE,
                    format!("file `{}` does not exist", preamble.display()),
                    "paths are relative to the config file",
                );
            }
            if !self.execute {
                diag.warn(Self::PREAMBLE, "ignored unless `notebook.execute = true`");
            }
        }

        if self.timeout == Some(0) {
            diag.error_with_hint(
                Self::TIMEOUT,
                "timeout must be positive",
                "remove the field to use the kernel default",
            );
        }
    }
}
