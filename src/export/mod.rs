//! Notebook to Markdown export.
//!
//! The layout mirrors the classic Markdown notebook template:
//!
//! ```text
//! markdown / raw cell  →  source, verbatim
//! code cell source     →  input cell wrapper around a ```lang fence
//! stream, text/plain   →  indented, then the output cell wrapper
//! error                →  traceback without ANSI codes, same as stream
//! text/html            →  output cell wrapper (dataframes pass through)
//! image/*, pdf         →  extracted resource + link
//! ```
//!
//! Blocks are separated by one blank line.

mod output;

pub use output::{DISPLAY_PRIORITY, OutputSlot, render_output};

use std::collections::BTreeMap;
use thiserror::Error;

use crate::filter::CellFilters;
use crate::notebook::{Cell, Notebook};

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid base64 payload for `{filename}`")]
    Decode {
        filename: String,
        #[source]
        source: base64::DecodeError,
    },
}

/// Binary outputs extracted during export, keyed by resource filename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resources {
    outputs: BTreeMap<String, Vec<u8>>,
}

impl Resources {
    pub fn insert(&mut self, filename: String, content: Vec<u8>) {
        self.outputs.insert(filename, content);
    }

    pub fn get(&self, filename: &str) -> Option<&[u8]> {
        self.outputs.get(filename).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Iterate `(filename, content)` in filename order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.outputs
            .iter()
            .map(|(name, content)| (name.as_str(), content.as_slice()))
    }
}

/// Result of exporting one notebook.
#[derive(Debug, Clone)]
pub struct Exported {
    pub body: String,
    pub resources: Resources,
}

/// Markdown exporter configured with one run's cell filters.
#[derive(Debug, Default)]
pub struct MarkdownExporter {
    filters: CellFilters,
}

impl MarkdownExporter {
    pub fn new(filters: CellFilters) -> Self {
        Self { filters }
    }

    pub fn filters(&self) -> &CellFilters {
        &self.filters
    }

    /// Render `notebook` to Markdown, extracting binary outputs.
    pub fn export(&self, notebook: &Notebook) -> Result<Exported, ExportError> {
        let language = notebook.language().unwrap_or_default();
        let mut resources = Resources::default();
        let mut blocks = Vec::with_capacity(notebook.cells.len());

        for (cell_index, cell) in notebook.cells.iter().enumerate() {
            match cell {
                Cell::Markdown { source } | Cell::Raw { source } => {
                    if !source.is_empty() {
                        blocks.push(source.as_str().to_owned());
                    }
                }
                Cell::Code { source, outputs, .. } => {
                    if !source.is_empty() {
                        let fenced = format!("```{language}\n{}\n```", source.as_str());
                        blocks.push(self.filters.wrap_as_input_cell(&fenced));
                    }
                    for (output_index, output) in outputs.iter().enumerate() {
                        let slot = OutputSlot {
                            cell: cell_index,
                            output: output_index,
                        };
                        if let Some(block) =
                            render_output(output, slot, &self.filters, &mut resources)?
                        {
                            blocks.push(block);
                        }
                    }
                }
            }
        }

        let mut body = blocks.join("\n\n");
        body.push('\n');
        Ok(Exported { body, resources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTEBOOK: &str = r##"{
        "cells": [
            {"cell_type": "markdown", "metadata": {}, "source": "# Demo"},
            {
                "cell_type": "code",
                "execution_count": 1,
                "metadata": {},
                "source": ["x = 40 + 2\n", "print(x)"],
                "outputs": [
                    {"output_type": "stream", "name": "stdout", "text": "42\n"},
                    {
                        "output_type": "display_data",
                        "metadata": {},
                        "data": {"image/png": "UE5HIQ==", "text/plain": "<Figure>"}
                    }
                ]
            },
            {"cell_type": "code", "execution_count": null, "metadata": {}, "source": "", "outputs": []},
            {
                "cell_type": "code",
                "execution_count": 2,
                "metadata": {},
                "source": "display(obj)",
                "outputs": [
                    {"output_type": "display_data", "metadata": {}, "data": {"text/html": "<b>hi</b>"}}
                ]
            }
        ],
        "metadata": {"language_info": {"name": "python"}},
        "nbformat": 4,
        "nbformat_minor": 5
    }"##;

    #[test]
    fn test_export_notebook() {
        let nb = Notebook::from_str(NOTEBOOK).unwrap();
        let exporter = MarkdownExporter::default();
        let exported = exporter.export(&nb).unwrap();

        let expected = "# Demo\n\n\
            <div class='jupyterInputCell'>\n```python\nx = 40 + 2\nprint(x)\n```\n</div>\n\n\
            <div class='jupyterOutputCell'>\n```\n42\n\n```\n</div>\n\n\
            ![png](output_1_1.png)\n\n\
            <div class='jupyterInputCell'>\n```python\ndisplay(obj)\n```\n</div>\n\n\
            <b>hi</b>\n";
        assert_eq!(exported.body, expected);

        assert_eq!(exported.resources.len(), 1);
        assert_eq!(exported.resources.get("output_1_1.png"), Some(&b"PNG!"[..]));
        // `<b>hi</b>` is neither code nor a dataframe
        assert_eq!(exporter.filters().warning_count(), 1);
    }

    #[test]
    fn test_export_without_language() {
        let nb = Notebook::from_str(
            r#"{"cells": [{"cell_type": "code", "metadata": {}, "source": "1", "outputs": []}], "nbformat": 4}"#,
        )
        .unwrap();
        let exported = MarkdownExporter::default().export(&nb).unwrap();
        assert_eq!(
            exported.body,
            "<div class='jupyterInputCell'>\n```\n1\n```\n</div>\n"
        );
    }

    #[test]
    fn test_export_empty_notebook() {
        let nb = Notebook::from_str(r#"{"cells": [], "nbformat": 4}"#).unwrap();
        let exported = MarkdownExporter::default().export(&nb).unwrap();
        assert_eq!(exported.body, "\n");
        assert!(exported.resources.is_empty());
    }

    #[test]
    fn test_resources_iterate_in_name_order() {
        let mut resources = Resources::default();
        resources.insert("output_2_0.png".into(), vec![2]);
        resources.insert("output_1_0.png".into(), vec![1]);
        let names: Vec<_> = resources.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["output_1_0.png", "output_2_0.png"]);
    }
}
