//! Single-notebook conversion.

use anyhow::{Context, Result};
use std::{
    fs,
    io::{Write, stdout},
    path::{Path, PathBuf},
};

use crate::{
    cli::ConvertArgs,
    config::SiteConfig,
    debug, log,
    plugin::{NotebookPlugin, write_resources},
    utils::plural_count,
};

/// Convert one notebook, printing Markdown to stdout unless `--output` is set.
pub fn convert_notebook(config: &SiteConfig, args: &ConvertArgs) -> Result<()> {
    let plugin = NotebookPlugin::on_config(&config.site, &config.notebook)?;
    let exported = plugin.convert(&args.path)?;

    let resources_dir = resources_dir(args);
    write_resources(&exported.resources, &resources_dir)?;
    if !exported.resources.is_empty() {
        debug!(
            "convert";
            "{} written to {}",
            plural_count(exported.resources.len(), "resource"),
            resources_dir.display()
        );
    }

    match &args.output {
        Some(output) => {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(output, &exported.body)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            log!("convert"; "{} -> {}", args.path.display(), output.display());
        }
        None => {
            let mut stdout = stdout().lock();
            stdout.write_all(exported.body.as_bytes())?;
            stdout.flush()?;
        }
    }

    let warnings = plugin.filters().warning_count();
    if warnings > 0 {
        log!("warning"; "{} passed through unformatted", plural_count(warnings, "output"));
    }
    Ok(())
}

/// `--resources`, else the directory of `--output`, else cwd.
fn resources_dir(args: &ConvertArgs) -> PathBuf {
    if let Some(dir) = &args.resources {
        return dir.clone();
    }
    args.output
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
