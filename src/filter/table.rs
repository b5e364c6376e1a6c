//! Structured-table detection for rich HTML outputs.
//!
//! Dataframe libraries render their tables as a `<div>` holding a
//! `<table class="dataframe">`. Such fragments already carry their own
//! presentation and are passed through untouched.

use regex::Regex;
use std::sync::LazyLock;

/// Whole-fragment pattern: `<div>` ... `<table ... class="dataframe">` ...
/// `</table>` ... `</div>`, with `.` spanning newlines.
static DATAFRAME_DIV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\A<div>.*<table .*class="dataframe">.*</table>.*</div>\z"#)
        .expect("dataframe pattern is valid")
});

/// Check if `text` is a pre-rendered dataframe table.
///
/// Surrounding whitespace is ignored. The remaining fragment must match the
/// pattern from its first to its last character.
#[inline]
pub fn is_structured_table_block(text: &str) -> bool {
    DATAFRAME_DIV.is_match(text.trim())
}
