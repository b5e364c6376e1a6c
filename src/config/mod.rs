//! Project configuration management for `tola-nb.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── notebook   # [notebook]
//! │   └── site       # [site]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! ├── util.rs        # Config file lookup, path resolution
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                            |
//! |--------------|----------------------------------------------------|
//! | `[site]`     | Docs dir, site dir, URL style                      |
//! | `[notebook]` | Execution, preamble, timeout, Markdown persistence |

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, resolve_path};

pub use section::{NotebookConfig, SiteSectionConfig};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands, NotebookArgs},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing tola-nb.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file, empty when running without one
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file
    #[serde(skip)]
    pub root: PathBuf,

    /// Docs tree and output locations
    #[serde(default)]
    pub site: SiteSectionConfig,

    /// Notebook conversion settings
    #[serde(default)]
    pub notebook: NotebookConfig,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. `build` requires one;
    /// `convert` falls back to defaults rooted at cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = path;
                config
            }
            None if cli.is_build() => return Err(ConfigError::NotFound(cli.config.clone()).into()),
            None => Self {
                root: cwd,
                ..Self::default()
            },
        };

        config.finalize(cli);
        config.validate(cli)?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Whether settings came from a config file.
    pub fn has_config_file(&self) -> bool {
        !self.config_path.as_os_str().is_empty()
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        self.normalize_paths();
        self.apply_command_options(cli);
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => {
                self.apply_notebook_args(&build_args.notebook);
            }
            Commands::Convert { args } => {
                self.apply_notebook_args(&args.notebook);
            }
        }
    }

    /// Apply notebook arguments shared by every command.
    fn apply_notebook_args(&mut self, args: &NotebookArgs) {
        // Set verbose mode globally
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.notebook.execute, args.execute.as_ref());
        Self::update_option(&mut self.notebook.write_markdown, args.write_markdown.as_ref());
        if args.timeout.is_some() {
            self.notebook.timeout = args.timeout;
        }
        if let Some(preamble) = &args.preamble {
            // CLI paths are relative to cwd, not to the config file
            let cwd = std::env::current_dir().unwrap_or_default();
            self.notebook.preamble = Some(resolve_path(&cwd, preamble));
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve every configured path against the root directory.
    fn normalize_paths(&mut self) {
        let root = self.root.clone();
        self.site.docs_dir = resolve_path(&root, &self.site.docs_dir);
        self.site.site_dir = resolve_path(&root, &self.site.site_dir);
        if let Some(preamble) = self.notebook.preamble.take() {
            self.notebook.preamble = Some(resolve_path(&root, &preamble));
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration for the current command.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self, cli: &Cli) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        if cli.is_build() {
            self.site.validate(&mut diag);
        }
        self.notebook.validate(&mut diag);

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// tests
// ============================================================================
