//! Indentation analysis for rendered output fragments.
//!
//! A fragment whose non-empty lines all carry at least four leading spaces is
//! an indented Markdown code block. The exporter indents plain-text outputs
//! with [`indent`] before handing them to the output wrapper, which then
//! recognizes them here and re-emits them fenced with [`dedent`].

use super::FilterError;

/// Width of one Markdown code-block indentation level.
pub const CODE_INDENT: usize = 4;

const INDENT_PREFIX: &str = "    ";

/// Count the leading space characters of a single line.
///
/// Only `' '` counts; a tab or any other character ends the run.
///
/// # Examples
/// ```ignore
/// assert_eq!(line_indentation_depth("   abc"), 3);
/// assert_eq!(line_indentation_depth("abc"), 0);
/// assert_eq!(line_indentation_depth("  "), 2);
/// ```
#[inline]
pub fn line_indentation_depth(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

/// Minimum indentation shared by all non-empty lines of `text`.
///
/// Only zero-length lines are skipped. A whitespace-only line is still a
/// line and its spaces count towards the minimum.
///
/// # Errors
///
/// Returns [`FilterError::EmptyInput`] if every line is empty.
pub fn paragraph_indentation_depth(text: &str) -> Result<usize, FilterError> {
    text.split('\n')
        .filter(|line| !line.is_empty())
        .map(line_indentation_depth)
        .min()
        .ok_or(FilterError::EmptyInput)
}

/// Check if `text` is an indented Markdown code block.
///
/// Input without any non-empty line is not a code block.
#[inline]
pub fn is_indented_code_block(text: &str) -> bool {
    paragraph_indentation_depth(text).is_ok_and(|depth| depth >= CODE_INDENT)
}

/// Strip exactly [`CODE_INDENT`] characters from every non-empty line.
///
/// This is a fixed-width cut, not a whitespace trim: a non-empty line shorter
/// than four characters is emptied, and non-space characters inside the
/// first four columns are dropped. Empty lines pass through.
pub fn dedent(text: &str) -> String {
    text.split('\n')
        .map(|line| match line.char_indices().nth(CODE_INDENT) {
            Some((at, _)) => &line[at..],
            None => "",
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent every line of `text` by four spaces.
///
/// A trailing newline does not produce a dangling indented line:
/// `"a\nb\n"` becomes `"    a\n    b\n"`. Blank lines inside the text
/// become whitespace-only lines.
pub fn indent(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + INDENT_PREFIX.len() * 4);
    out.push_str(INDENT_PREFIX);
    out.push_str(&text.replace('\n', "\n    "));
    if out.ends_with("\n    ") {
        out.truncate(out.len() - INDENT_PREFIX.len());
    }
    out
}
