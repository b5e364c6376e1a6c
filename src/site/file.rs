//! Site source files and their output locations.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::path::{Path, PathBuf};

/// Extensions of Markdown documentation pages.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkdn", "mkd"];

/// Characters left as-is in URL path segments.
const URL_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Check if `path` has one of `extensions` (case-insensitive).
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// A file found in the docs directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    src_path: PathBuf,
    abs_src_path: PathBuf,
    dest_path: PathBuf,
    abs_dest_path: PathBuf,
    url: String,
}

impl File {
    /// `src_path` is relative to `docs_dir`.
    pub fn new(src_path: &Path, docs_dir: &Path, site_dir: &Path, use_directory_urls: bool) -> Self {
        let dest_path = if has_extension(src_path, MARKDOWN_EXTENSIONS) {
            page_dest_path(src_path, use_directory_urls)
        } else {
            src_path.to_path_buf()
        };
        let url = dest_url(&dest_path, use_directory_urls);

        Self {
            src_path: src_path.to_path_buf(),
            abs_src_path: docs_dir.join(src_path),
            abs_dest_path: site_dir.join(&dest_path),
            dest_path,
            url,
        }
    }

    /// Source path relative to the docs directory.
    pub fn src_path(&self) -> &Path {
        &self.src_path
    }

    pub fn abs_src_path(&self) -> &Path {
        &self.abs_src_path
    }

    /// Output path relative to the site directory.
    pub fn dest_path(&self) -> &Path {
        &self.dest_path
    }

    pub fn abs_dest_path(&self) -> &Path {
        &self.abs_dest_path
    }

    /// URL relative to the site root, percent-encoded.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_documentation_page(&self) -> bool {
        has_extension(&self.src_path, MARKDOWN_EXTENSIONS)
    }
}

/// Output path of a page rendered from `src_path`.
///
/// ```text
/// use_directory_urls = true          use_directory_urls = false
/// index.md     → index.html          index.md     → index.html
/// README.md    → index.html          README.md    → index.html
/// guide/setup.md → guide/setup/index.html   guide/setup.md → guide/setup.html
/// ```
pub fn page_dest_path(src_path: &Path, use_directory_urls: bool) -> PathBuf {
    let parent = src_path.parent().unwrap_or(Path::new(""));
    let stem = src_path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let stem = if stem == "README" { "index".into() } else { stem };

    if !use_directory_urls {
        parent.join(format!("{stem}.html"))
    } else if stem == "index" {
        parent.join("index.html")
    } else {
        parent.join(&*stem).join("index.html")
    }
}

/// URL of a file written to `dest_path`.
///
/// With directory URLs, `index.html` collapses to its directory
/// (`.` for the site root).
pub fn dest_url(dest_path: &Path, use_directory_urls: bool) -> String {
    let segments: Vec<String> = dest_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if use_directory_urls
        && let Some((last, dirs)) = segments.split_last()
        && last == "index.html"
    {
        return if dirs.is_empty() {
            ".".to_owned()
        } else {
            format!("{}/", encode_segments(dirs))
        };
    }
    encode_segments(&segments)
}

fn encode_segments(segments: &[String]) -> String {
    segments
        .iter()
        .map(|s| utf8_percent_encode(s, URL_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
