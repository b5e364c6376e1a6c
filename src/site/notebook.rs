//! Notebook files presented as documentation pages.

use std::path::{Path, PathBuf};

use super::file::{File, dest_url, page_dest_path};

/// Notebook source extension.
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// A notebook source file that renders as a documentation page.
///
/// Source locations are read from the wrapped [`File`]; output locations
/// are recomputed with the page rules, so `demo.ipynb` lands at
/// `demo/index.html` instead of being copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookFile {
    file: File,
    dest_path: PathBuf,
    abs_dest_path: PathBuf,
    url: String,
}

impl NotebookFile {
    pub fn new(file: File, site_dir: &Path, use_directory_urls: bool) -> Self {
        let dest_path = page_dest_path(file.src_path(), use_directory_urls);
        let url = dest_url(&dest_path, use_directory_urls);
        Self {
            abs_dest_path: site_dir.join(&dest_path),
            dest_path,
            url,
            file,
        }
    }

    /// The wrapped file, with its static-file output locations.
    pub fn inner(&self) -> &File {
        &self.file
    }

    pub fn src_path(&self) -> &Path {
        self.file.src_path()
    }

    pub fn abs_src_path(&self) -> &Path {
        self.file.abs_src_path()
    }

    pub fn dest_path(&self) -> &Path {
        &self.dest_path
    }

    pub fn abs_dest_path(&self) -> &Path {
        &self.abs_dest_path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_documentation_page(&self) -> bool {
        true
    }
}
