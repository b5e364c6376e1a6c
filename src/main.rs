//! tola-nb - Render Jupyter notebooks as documentation pages.

#![allow(dead_code)]

mod cli;
mod config;
mod execute;
mod export;
mod filter;
mod logger;
mod notebook;
mod plugin;
mod render;
mod site;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build::build_site, convert::convert_notebook};
use config::SiteConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(&cli)?;
    debug!("config"; "root: {}", config.get_root().display());
    if !config.has_config_file() {
        debug!("config"; "no {} found, using defaults", cli.config.display());
    }

    match &cli.command {
        Commands::Build { build_args } => build_site(&config, build_args.clean).map(|_| ()),
        Commands::Convert { args } => convert_notebook(&config, args),
    }
}
