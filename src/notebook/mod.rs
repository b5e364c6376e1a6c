//! Jupyter notebook document model (nbformat v4).
//!
//! Only the parts the exporter renders are modeled; unknown fields are
//! ignored on load. Execution works on the raw JSON value so nothing is lost
//! on the round trip through the kernel.

mod source;

pub use source::{MimeBundle, MultilineString};

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The only major nbformat version understood.
pub const NBFORMAT: u32 = 4;

/// Notebook loading errors.
#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed notebook JSON")]
    Json(#[from] serde_json::Error),

    #[error("unsupported nbformat version {0} (expected {NBFORMAT})")]
    UnsupportedVersion(u32),
}

/// A parsed notebook.
#[derive(Debug, Clone, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: NotebookMetadata,
    pub nbformat: u32,
    #[serde(default)]
    pub nbformat_minor: u32,
}

/// Notebook-level metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotebookMetadata {
    pub language_info: Option<LanguageInfo>,
    pub kernelspec: Option<KernelSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KernelSpec {
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// A notebook cell.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown {
        source: MultilineString,
    },
    Code {
        source: MultilineString,
        #[serde(default)]
        outputs: Vec<Output>,
        #[serde(default)]
        execution_count: Option<u32>,
    },
    Raw {
        source: MultilineString,
    },
}

impl Cell {
    pub fn source(&self) -> &str {
        match self {
            Self::Markdown { source } | Self::Code { source, .. } | Self::Raw { source } => {
                source.as_str()
            }
        }
    }
}

/// A code cell output.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    Stream {
        #[serde(default)]
        name: String,
        text: MultilineString,
    },
    DisplayData {
        data: MimeBundle,
        #[serde(default)]
        metadata: Map<String, Value>,
    },
    ExecuteResult {
        data: MimeBundle,
        #[serde(default)]
        metadata: Map<String, Value>,
        #[serde(default)]
        execution_count: Option<u32>,
    },
    Error {
        ename: String,
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

impl Notebook {
    /// Load a notebook from disk.
    pub fn from_path(path: &Path) -> Result<Self, NotebookError> {
        let content =
            fs::read_to_string(path).map_err(|err| NotebookError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Parse a notebook from its JSON text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, NotebookError> {
        Self::checked(serde_json::from_str(content)?)
    }

    /// Build a notebook from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, NotebookError> {
        Self::checked(serde_json::from_value(value)?)
    }

    fn checked(notebook: Self) -> Result<Self, NotebookError> {
        if notebook.nbformat != NBFORMAT {
            return Err(NotebookError::UnsupportedVersion(notebook.nbformat));
        }
        Ok(notebook)
    }

    /// Kernel language name, used as the info string of input code fences.
    pub fn language(&self) -> Option<&str> {
        self.metadata
            .language_info
            .as_ref()
            .map(|info| info.name.as_str())
            .or_else(|| {
                self.metadata
                    .kernelspec
                    .as_ref()
                    .and_then(|spec| spec.language.as_deref())
            })
    }
}

/// Read a notebook as raw JSON for execution.
pub fn read_raw(path: &Path) -> Result<Value, NotebookError> {
    let content =
        fs::read_to_string(path).map_err(|err| NotebookError::Io(path.to_path_buf(), err))?;
    Ok(serde_json::from_str(&content)?)
}
