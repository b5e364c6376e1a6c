//! Rendering of code cell outputs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use std::sync::LazyLock;

use super::{ExportError, Resources};
use crate::filter::{CellFilters, indent};
use crate::notebook::{MimeBundle, Output};

/// MIME types rendered for rich outputs, most preferred first.
pub const DISPLAY_PRIORITY: &[&str] = &[
    "text/html",
    "application/pdf",
    "text/latex",
    "image/svg+xml",
    "image/png",
    "image/jpeg",
    "text/markdown",
    "text/plain",
];

/// ANSI escape sequences (colored tracebacks).
static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]").expect("ansi pattern is valid"));

/// A binary output extracted to a resource file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extracted {
    Png,
    Jpeg,
    Svg,
    Pdf,
}

impl Extracted {
    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            "image/svg+xml" => Some(Self::Svg),
            "application/pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }

    /// SVG is stored as text; everything else is base64 in the notebook.
    const fn is_base64(self) -> bool {
        !matches!(self, Self::Svg)
    }

    fn link(self, filename: &str) -> String {
        match self {
            Self::Pdf => format!("[{}]({filename})", self.label()),
            _ => format!("![{}]({filename})", self.label()),
        }
    }
}

/// Position of an output inside the notebook, used to name resources.
#[derive(Debug, Clone, Copy)]
pub struct OutputSlot {
    pub cell: usize,
    pub output: usize,
}

impl OutputSlot {
    fn resource_name(self, ext: &str) -> String {
        format!("output_{}_{}.{ext}", self.cell, self.output)
    }
}

/// Render one output to a Markdown block.
///
/// Returns `None` for rich outputs carrying no renderable MIME type.
pub fn render_output(
    output: &Output,
    slot: OutputSlot,
    filters: &CellFilters,
    resources: &mut Resources,
) -> Result<Option<String>, ExportError> {
    match output {
        Output::Stream { text, .. } => Ok(Some(filters.wrap_as_output_cell(&indent(text.as_str())))),
        Output::Error { traceback, .. } => {
            let joined = traceback.join("\n");
            let plain = ANSI_ESCAPE.replace_all(&joined, "");
            Ok(Some(filters.wrap_as_output_cell(&indent(&plain))))
        }
        Output::DisplayData { data, .. } | Output::ExecuteResult { data, .. } => {
            render_data(data, slot, filters, resources)
        }
    }
}

fn render_data(
    data: &MimeBundle,
    slot: OutputSlot,
    filters: &CellFilters,
    resources: &mut Resources,
) -> Result<Option<String>, ExportError> {
    let Some(mime) = data.pick(DISPLAY_PRIORITY) else {
        return Ok(None);
    };
    let Some(payload) = data.text(mime) else {
        return Ok(None);
    };

    if let Some(kind) = Extracted::from_mime(mime) {
        let filename = slot.resource_name(kind.extension());
        let bytes = if kind.is_base64() {
            decode_base64(&payload).map_err(|source| ExportError::Decode {
                filename: filename.clone(),
                source,
            })?
        } else {
            payload.into_bytes()
        };
        let link = kind.link(&filename);
        resources.insert(filename, bytes);
        return Ok(Some(link));
    }

    let block = match mime {
        "text/html" => filters.wrap_as_output_cell(&payload),
        "text/plain" => filters.wrap_as_output_cell(&indent(&payload)),
        // text/latex, text/markdown
        _ => payload,
    };
    Ok(Some(block))
}

/// Decode a base64 payload, ignoring the line breaks notebooks insert.
fn decode_base64(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(json: &str) -> MimeBundle {
        serde_json::from_str(json).unwrap()
    }

    fn display(json: &str) -> Output {
        Output::DisplayData {
            data: bundle(json),
            metadata: Default::default(),
        }
    }

    const SLOT: OutputSlot = OutputSlot { cell: 3, output: 0 };

    #[test]
    fn test_stream_becomes_fenced_output() {
        let filters = CellFilters::default();
        let mut resources = Resources::default();
        let output = Output::Stream {
            name: "stdout".into(),
            text: "hello\n".into(),
        };
        let block = render_output(&output, SLOT, &filters, &mut resources).unwrap();
        assert_eq!(
            block.as_deref(),
            Some("<div class='jupyterOutputCell'>\n```\nhello\n\n```\n</div>")
        );
        assert!(resources.is_empty());
    }

    #[test]
    fn test_error_traceback_strips_ansi() {
        let filters = CellFilters::default();
        let mut resources = Resources::default();
        let output = Output::Error {
            ename: "ValueError".into(),
            evalue: "bad".into(),
            traceback: vec![
                "\u{1b}[0;31mValueError\u{1b}[0m".into(),
                "bad value".into(),
            ],
        };
        let block = render_output(&output, SLOT, &filters, &mut resources)
            .unwrap()
            .unwrap();
        assert!(block.contains("```\nValueError\nbad value\n```"));
        assert!(!block.contains('\u{1b}'));
    }

    #[test]
    fn test_png_is_extracted() {
        let filters = CellFilters::default();
        let mut resources = Resources::default();
        // "PNG!" in base64, split across lines like notebooks do
        let output = display(r#"{"image/png": "UE5H\nIQ==\n", "text/plain": "<Figure>"}"#);
        let block = render_output(&output, SLOT, &filters, &mut resources).unwrap();
        assert_eq!(block.as_deref(), Some("![png](output_3_0.png)"));
        assert_eq!(resources.get("output_3_0.png"), Some(&b"PNG!"[..]));
    }

    #[test]
    fn test_jpeg_and_svg_names() {
        let filters = CellFilters::default();
        let mut resources = Resources::default();
        let jpeg = display(r#"{"image/jpeg": "UE5HIQ=="}"#);
        let svg = display(r#"{"image/svg+xml": ["<svg>", "</svg>"]}"#);
        let slot = OutputSlot { cell: 1, output: 2 };

        let block = render_output(&jpeg, slot, &filters, &mut resources).unwrap();
        assert_eq!(block.as_deref(), Some("![jpeg](output_1_2.jpg)"));

        let slot = OutputSlot { cell: 1, output: 3 };
        let block = render_output(&svg, slot, &filters, &mut resources).unwrap();
        assert_eq!(block.as_deref(), Some("![svg](output_1_3.svg)"));
        assert_eq!(resources.get("output_1_3.svg"), Some(&b"<svg></svg>"[..]));
    }

    #[test]
    fn test_invalid_base64_fails() {
        let filters = CellFilters::default();
        let mut resources = Resources::default();
        let output = display(r#"{"image/png": "***"}"#);
        let err = render_output(&output, SLOT, &filters, &mut resources).unwrap_err();
        assert!(err.to_string().contains("output_3_0.png"));
    }

    #[test]
    fn test_html_table_passes_through() {
        let filters = CellFilters::default();
        let mut resources = Resources::default();
        let html = "<div>\n<table border=\"1\" class=\"dataframe\">\n</table>\n</div>";
        let output = Output::ExecuteResult {
            data: bundle(&serde_json::json!({ "text/html": html, "text/plain": "df" }).to_string()),
            metadata: Default::default(),
            execution_count: Some(2),
        };
        let block = render_output(&output, SLOT, &filters, &mut resources).unwrap();
        assert_eq!(block.as_deref(), Some(html));
        assert_eq!(filters.warning_count(), 0);
    }

    #[test]
    fn test_plain_text_result() {
        let filters = CellFilters::default();
        let mut resources = Resources::default();
        let block = render_output(&display(r#"{"text/plain": "42"}"#), SLOT, &filters, &mut resources)
            .unwrap();
        assert_eq!(
            block.as_deref(),
            Some("<div class='jupyterOutputCell'>\n```\n42\n```\n</div>")
        );
    }

    #[test]
    fn test_markdown_and_latex_verbatim() {
        let filters = CellFilters::default();
        let mut resources = Resources::default();
        let md = render_output(&display(r#"{"text/markdown": "**bold**"}"#), SLOT, &filters, &mut resources)
            .unwrap();
        assert_eq!(md.as_deref(), Some("**bold**"));
        let tex = render_output(&display(r#"{"text/latex": "$x^2$"}"#), SLOT, &filters, &mut resources)
            .unwrap();
        assert_eq!(tex.as_deref(), Some("$x^2$"));
    }

    #[test]
    fn test_unknown_mime_renders_nothing() {
        let filters = CellFilters::default();
        let mut resources = Resources::default();
        let block = render_output(
            &display(r#"{"application/vnd.widget+json": {}}"#),
            SLOT,
            &filters,
            &mut resources,
        )
        .unwrap();
        assert_eq!(block, None);
    }
}
