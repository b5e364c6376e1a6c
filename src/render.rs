//! Markdown to HTML page rendering using pulldown-cmark.
//!
//! Notebook exports embed raw `<div>` wrappers and dataframe tables, which
//! pulldown-cmark passes through as HTML blocks. An HTML block ends at the
//! first blank line, so fenced code inside a cell wrapper is rendered to a
//! single-line `<pre><code>` before parsing.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use regex::{Captures, Regex};
use std::{borrow::Cow, sync::LazyLock};

use crate::filter::{INPUT_CELL_CLASS, OUTPUT_CELL_CLASS};

/// `<div class='..'>` + fence + `</div>`, as written by the cell filters.
static CELL_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        "(?s)<div class='({}|{})'>\n```([^\n]*)\n(.*?)\n```\n</div>",
        regex::escape(INPUT_CELL_CLASS),
        regex::escape(OUTPUT_CELL_CLASS)
    );
    Regex::new(&pattern).expect("cell wrapper pattern is valid")
});

/// Options for markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable `$..$` and `$$..$$` math
    pub math: bool,
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            math: true,
        }
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.math {
            opts.insert(Options::ENABLE_MATH);
        }
        opts
    }
}

/// A rendered documentation page.
#[derive(Debug, Clone)]
pub struct Page {
    pub title: Option<String>,
    pub content: String,
}

impl Page {
    /// Render Markdown into an HTML fragment, picking the first `h1` as title.
    pub fn from_markdown(markdown: &str, options: &MarkdownOptions) -> Self {
        let mut title = None;
        let mut in_title = false;

        let markdown = render_cell_wrappers(markdown);
        let events: Vec<Event> = Parser::new_ext(&markdown, options.to_pulldown_options())
            .inspect(|event| match event {
                Event::Start(Tag::Heading {
                    level: HeadingLevel::H1,
                    ..
                }) if title.is_none() => in_title = true,
                Event::End(TagEnd::Heading(HeadingLevel::H1)) => in_title = false,
                Event::Text(text) | Event::Code(text) if in_title => {
                    title.get_or_insert_with(String::new).push_str(text);
                }
                _ => {}
            })
            .collect();

        let mut content = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut content, events.into_iter());
        Self { title, content }
    }

    /// Full HTML document, `fallback_title` used when the page has no `h1`.
    pub fn to_html(&self, fallback_title: &str) -> String {
        let title = self.title.as_deref().unwrap_or(fallback_title);
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_text(title),
            self.content
        )
    }
}

/// Replace the fenced body of each cell wrapper with escaped `<pre><code>`.
///
/// Newlines become `&#10;` so the wrapper holds no blank line and stays one
/// HTML block.
fn render_cell_wrappers(markdown: &str) -> Cow<'_, str> {
    CELL_WRAPPER.replace_all(markdown, |caps: &Captures| {
        let lang = caps[2].trim();
        let class = if lang.is_empty() {
            String::new()
        } else {
            format!(" class=\"language-{}\"", escape_attr(lang))
        };
        format!(
            "<div class='{}'>\n<pre><code{class}>{}</code></pre>\n</div>",
            &caps[1],
            escape_attr(&caps[3]).replace('\n', "&#10;")
        )
    })
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
