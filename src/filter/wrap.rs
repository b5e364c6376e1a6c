//! Cell wrappers used by the Markdown exporter.
//!
//! [`CellFilters`] is built once per conversion run and handed to the
//! exporter. It owns the container class names and records every output
//! fragment whose shape it could not recognize.

use parking_lot::Mutex;

use super::{dedent, is_indented_code_block, is_structured_table_block};

/// Default container class for code cell sources.
pub const INPUT_CELL_CLASS: &str = "jupyterInputCell";

/// Default container class for code cell outputs.
pub const OUTPUT_CELL_CLASS: &str = "jupyterOutputCell";

/// Longest fragment excerpt kept in a warning.
const PREVIEW_CHARS: usize = 60;

/// Shape of a rendered output fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Indented code block, re-emitted as a fenced block.
    FencedCode,
    /// Pre-rendered dataframe table, passed through.
    StructuredTable,
    /// Anything else, passed through with a warning.
    Unrecognized,
}

impl OutputKind {
    /// Classify a fragment by its shape alone.
    pub fn of(text: &str) -> Self {
        if is_indented_code_block(text) {
            Self::FencedCode
        } else if is_structured_table_block(text) {
            Self::StructuredTable
        } else {
            Self::Unrecognized
        }
    }
}

/// A fragment that was passed through unrecognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterWarning {
    /// First characters of the fragment, on one line.
    pub preview: String,
}

impl FilterWarning {
    fn new(text: &str) -> Self {
        let flat = text.trim().replace('\n', "\\n");
        let preview = match flat.char_indices().nth(PREVIEW_CHARS) {
            Some((at, _)) => format!("{}...", &flat[..at]),
            None => flat,
        };
        Self { preview }
    }
}

/// Input/output cell wrappers for one conversion run.
#[derive(Debug)]
pub struct CellFilters {
    input_class: String,
    output_class: String,
    warnings: Mutex<Vec<FilterWarning>>,
}

impl Default for CellFilters {
    fn default() -> Self {
        Self::new(INPUT_CELL_CLASS, OUTPUT_CELL_CLASS)
    }
}

impl CellFilters {
    pub fn new(input_class: impl Into<String>, output_class: impl Into<String>) -> Self {
        Self {
            input_class: input_class.into(),
            output_class: output_class.into(),
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// Wrap a code cell's source in the input container.
    ///
    /// Wrapping is not deduplicated: wrapping twice nests two containers.
    pub fn wrap_as_input_cell(&self, text: &str) -> String {
        format!("<div class='{}'>\n{text}\n</div>", self.input_class)
    }

    /// Wrap a rendered output fragment according to its [`OutputKind`].
    ///
    /// Unrecognized fragments are returned unchanged so the page still
    /// renders; each one logs a warning and is recorded.
    pub fn wrap_as_output_cell(&self, text: &str) -> String {
        match OutputKind::of(text) {
            OutputKind::FencedCode => format!(
                "<div class='{}'>\n```\n{}\n```\n</div>",
                self.output_class,
                dedent(text)
            ),
            OutputKind::StructuredTable => text.to_owned(),
            OutputKind::Unrecognized => {
                let warning = FilterWarning::new(text);
                crate::log!("warning"; "unrecognized output shape, passing through: {}", warning.preview);
                self.warnings.lock().push(warning);
                text.to_owned()
            }
        }
    }

    /// Number of fragments passed through unrecognized so far.
    pub fn warning_count(&self) -> usize {
        self.warnings.lock().len()
    }

    /// Drain the recorded warnings.
    pub fn take_warnings(&self) -> Vec<FilterWarning> {
        std::mem::take(&mut *self.warnings.lock())
    }
}
