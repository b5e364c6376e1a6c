//! Docs tree model: the files a site build works on.
//!
//! | Type           | Purpose                                          |
//! |----------------|--------------------------------------------------|
//! | `File`         | Any file under the docs dir                      |
//! | `NotebookFile` | Facade making a notebook a documentation page    |
//! | `SiteFile`     | Either of the above                              |
//! | `Files`        | Ordered collection of site files                 |

mod file;
mod notebook;

pub use file::{File, MARKDOWN_EXTENSIONS, dest_url, has_extension, page_dest_path};
pub use notebook::{NOTEBOOK_EXTENSION, NotebookFile};

use jwalk::WalkDir;
use std::path::Path;

const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// A file of the site, either as found or wrapped as a notebook page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteFile {
    Plain(File),
    Notebook(NotebookFile),
}

impl SiteFile {
    pub fn src_path(&self) -> &Path {
        match self {
            Self::Plain(f) => f.src_path(),
            Self::Notebook(nb) => nb.src_path(),
        }
    }

    pub fn abs_src_path(&self) -> &Path {
        match self {
            Self::Plain(f) => f.abs_src_path(),
            Self::Notebook(nb) => nb.abs_src_path(),
        }
    }

    pub fn dest_path(&self) -> &Path {
        match self {
            Self::Plain(f) => f.dest_path(),
            Self::Notebook(nb) => nb.dest_path(),
        }
    }

    pub fn abs_dest_path(&self) -> &Path {
        match self {
            Self::Plain(f) => f.abs_dest_path(),
            Self::Notebook(nb) => nb.abs_dest_path(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Plain(f) => f.url(),
            Self::Notebook(nb) => nb.url(),
        }
    }

    pub fn is_documentation_page(&self) -> bool {
        match self {
            Self::Plain(f) => f.is_documentation_page(),
            Self::Notebook(nb) => nb.is_documentation_page(),
        }
    }

    /// Check if this file's source is a notebook.
    pub fn is_notebook_source(&self) -> bool {
        has_extension(self.src_path(), &[NOTEBOOK_EXTENSION])
    }
}

/// Ordered collection of site files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Files(Vec<SiteFile>);

impl Files {
    pub fn new(files: Vec<SiteFile>) -> Self {
        Self(files)
    }

    /// Collect every file under `docs_dir`, sorted by source path.
    pub fn discover(docs_dir: &Path, site_dir: &Path, use_directory_urls: bool) -> Self {
        let mut files: Vec<_> = WalkDir::new(docs_dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let name = e.file_name().to_str().unwrap_or_default();
                !IGNORED_FILES.contains(&name)
            })
            .filter_map(|e| {
                let path = e.path();
                let rel = path.strip_prefix(docs_dir).ok()?;
                Some(SiteFile::Plain(File::new(
                    rel,
                    docs_dir,
                    site_dir,
                    use_directory_urls,
                )))
            })
            .collect();
        files.sort_by(|a, b| a.src_path().cmp(b.src_path()));
        Self(files)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SiteFile> {
        self.0.iter()
    }

    pub fn documentation_pages(&self) -> impl Iterator<Item = &SiteFile> {
        self.0.iter().filter(|f| f.is_documentation_page())
    }

    pub fn static_files(&self) -> impl Iterator<Item = &SiteFile> {
        self.0.iter().filter(|f| !f.is_documentation_page())
    }
}

impl IntoIterator for Files {
    type Item = SiteFile;
    type IntoIter = std::vec::IntoIter<SiteFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<SiteFile> for Files {
    fn from_iter<I: IntoIterator<Item = SiteFile>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
