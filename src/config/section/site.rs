//! `[site]` section configuration.
//!
//! Locations of the docs tree and the generated site.
//!
//! # Example
//!
//! ```toml
//! [site]
//! docs_dir = "docs"             # Source pages, notebooks and static files
//! site_dir = "site"             # Build output
//! use_directory_urls = true     # guide/setup.md -> guide/setup/index.html
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

/// Docs tree and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Source directory (relative to the config file).
    pub docs_dir: PathBuf,

    /// Output directory (relative to the config file).
    pub site_dir: PathBuf,

    /// Render `page.md` as `page/index.html` and link it as `page/`.
    pub use_directory_urls: bool,
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            docs_dir: "docs".into(),
            site_dir: "site".into(),
            use_directory_urls: true,
        }
    }
}

impl SiteSectionConfig {
    pub const DOCS_DIR: FieldPath = FieldPath::new("site.docs_dir");
    pub const SITE_DIR: FieldPath = FieldPath::new("site.site_dir");

    /// Validate resolved paths.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.docs_dir.is_dir() {
            diag.error_with_hint(
                Self::DOCS_DIR,
                format!("directory `{}` does not exist", self.docs_dir.display()),
                "create it or point `docs_dir` at your documentation sources",
            );
        }
        if self.site_dir == self.docs_dir || self.docs_dir.starts_with(&self.site_dir) {
            diag.error(
                Self::SITE_DIR,
                "`site_dir` must not contain `docs_dir`, it is overwritten on build",
            );
        }
    }
}
