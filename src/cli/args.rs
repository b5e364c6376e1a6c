//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Render Jupyter notebooks as documentation pages
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: tola-nb.toml)
    #[arg(short = 'C', long, default_value = "tola-nb.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the docs tree into the site directory
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Convert a single notebook to Markdown
    #[command(visible_alias = "c")]
    Convert {
        #[command(flatten)]
        args: ConvertArgs,
    },
}

/// Build command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Clean output directory completely before building
    #[arg(short, long)]
    pub clean: bool,

    #[command(flatten)]
    pub notebook: NotebookArgs,
}

/// Convert command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Notebook to convert
    #[arg(value_name = "NOTEBOOK", value_hint = clap::ValueHint::FilePath)]
    pub path: PathBuf,

    /// Write Markdown to this file instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Directory for extracted outputs (default: next to the Markdown output, or cwd)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub resources: Option<PathBuf>,

    #[command(flatten)]
    pub notebook: NotebookArgs,
}

/// Notebook options shared by every command, overriding `[notebook]`.
#[derive(clap::Args, Debug, Clone)]
pub struct NotebookArgs {
    /// Execute notebooks before converting them
    #[arg(short = 'x', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub execute: Option<bool>,

    /// Script run in the kernel before each notebook (relative to cwd)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub preamble: Option<PathBuf>,

    /// Per-cell execution timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Keep the intermediate Markdown as `<notebook>.md.tmp`
    #[arg(short = 'w', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub write_markdown: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
}
