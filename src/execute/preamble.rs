//! Preamble injection.
//!
//! The preamble script runs in the same kernel session as the notebook, right
//! before its first cell, so whatever it sets up (imports, plotting defaults,
//! seeds) is visible to the notebook. It is run as an extra leading code cell
//! which is removed again from the executed notebook.

use anyhow::Result;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

use super::{Execute, ExecuteError};

/// Cell id given to the injected preamble cell (nbformat 4.5+).
pub const PREAMBLE_CELL_ID: &str = "tola-notebook-preamble";

/// Executor decorator that runs a preamble script first.
#[derive(Debug, Clone)]
pub struct WithPreamble<E> {
    inner: E,
    preamble: PathBuf,
}

impl<E: Execute> WithPreamble<E> {
    pub fn new(inner: E, preamble: PathBuf) -> Self {
        Self { inner, preamble }
    }

    pub fn preamble(&self) -> &Path {
        &self.preamble
    }
}

impl<E: Execute> Execute for WithPreamble<E> {
    fn execute(&self, mut notebook: Value, cwd: &Path) -> Result<Value> {
        let script = fs::read_to_string(&self.preamble)
            .map_err(|err| ExecuteError::Preamble(self.preamble.clone(), err))?;

        insert_preamble(&mut notebook, &script)?;
        let mut executed = self.inner.execute(notebook, cwd)?;
        strip_preamble(&mut executed)?;
        Ok(executed)
    }
}

fn cells_mut(notebook: &mut Value) -> Result<&mut Vec<Value>, ExecuteError> {
    notebook
        .get_mut("cells")
        .and_then(Value::as_array_mut)
        .ok_or(ExecuteError::MissingCells)
}

/// Insert `script` as the first code cell.
pub fn insert_preamble(notebook: &mut Value, script: &str) -> Result<(), ExecuteError> {
    // Cell ids are only valid from nbformat 4.5 on
    let with_id = notebook
        .get("nbformat_minor")
        .and_then(Value::as_u64)
        .is_some_and(|minor| minor >= 5);

    let mut cell = json!({
        "cell_type": "code",
        "execution_count": null,
        "metadata": {},
        "outputs": [],
        "source": script,
    });
    if with_id {
        cell["id"] = Value::from(PREAMBLE_CELL_ID);
    }

    cells_mut(notebook)?.insert(0, cell);
    Ok(())
}

/// Remove the leading preamble cell from an executed notebook.
pub fn strip_preamble(notebook: &mut Value) -> Result<(), ExecuteError> {
    let cells = cells_mut(notebook)?;
    if !cells.is_empty() {
        cells.remove(0);
    }
    Ok(())
}
