//! Site building orchestration.
//!
//! Build pipeline phases:
//! - **Init** - Clean and create the site dir, set up the notebook plugin
//! - **Collect** - Discover docs files, wrap notebooks as pages
//! - **Render** - Parallel page rendering + static file copy
//! - **Finalize** - Filter warnings summary, logging

use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{
    config::SiteConfig,
    debug, log,
    logger::ProgressLine,
    plugin::NotebookPlugin,
    render::{MarkdownOptions, Page},
    site::{Files, SiteFile},
    utils::plural_count,
};

/// Counts reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub notebooks: usize,
    pub markdown: usize,
    pub static_files: usize,
    pub filter_warnings: usize,
}

/// Build the entire site.
///
/// Pipeline: init -> collect -> render -> finalize
pub fn build_site(config: &SiteConfig, clean: bool) -> Result<BuildSummary> {
    init_output(&config.site.site_dir, clean)?;
    let plugin = NotebookPlugin::on_config(&config.site, &config.notebook)?;
    build_with(config, &plugin)
}

/// Build using an already configured plugin.
pub fn build_with(config: &SiteConfig, plugin: &NotebookPlugin) -> Result<BuildSummary> {
    let site = &config.site;
    let files = plugin.on_files(Files::discover(
        &site.docs_dir,
        &site.site_dir,
        site.use_directory_urls,
    ));

    let pages: Vec<&SiteFile> = files.documentation_pages().collect();
    let statics: Vec<&SiteFile> = files.static_files().collect();
    let notebooks = pages.iter().filter(|f| f.is_notebook_source()).count();

    let mut summary = BuildSummary {
        notebooks,
        markdown: pages.len() - notebooks,
        static_files: statics.len(),
        filter_warnings: 0,
    };
    debug!("build"; "{} pages, {} static", pages.len(), statics.len());

    let progress = ProgressLine::new(&[
        ("notebook", summary.notebooks),
        ("markdown", summary.markdown),
        ("static", summary.static_files),
    ]);

    let has_error = AtomicBool::new(false);
    let (pages_result, statics_result) = rayon::join(
        || render_pages(&pages, plugin, &has_error, &progress),
        || copy_static_files(&statics, &has_error, &progress),
    );
    pages_result?;
    statics_result?;
    progress.finish();

    summary.filter_warnings = finalize_build(plugin);
    log!("build"; "done: {}, {}", plural_count(pages.len(), "page"), plural_count(statics.len(), "static file"));
    Ok(summary)
}

/// Remove the site dir on `clean`, then make sure it exists.
fn init_output(site_dir: &Path, clean: bool) -> Result<()> {
    if clean && site_dir.exists() {
        fs::remove_dir_all(site_dir).with_context(|| {
            format!("Failed to clear output directory: {}", site_dir.display())
        })?;
    }
    fs::create_dir_all(site_dir)
        .with_context(|| format!("Failed to create output directory: {}", site_dir.display()))
}

/// Render documentation pages, stopping at the first failure.
///
/// Notebooks whose outputs land in a shared directory are rendered one at a
/// time after the rest, which run in parallel.
fn render_pages(
    pages: &[&SiteFile],
    plugin: &NotebookPlugin,
    has_error: &AtomicBool,
    progress: &ProgressLine,
) -> Result<()> {
    let shared = shared_resource_dirs(pages);
    for (dir, sources) in &shared {
        let names: Vec<String> = sources.iter().map(|p| p.display().to_string()).collect();
        log!(
            "warning";
            "{} write outputs into {}, same-named outputs are overwritten",
            names.join(", "),
            dir.display()
        );
    }
    let (sequential, parallel): (Vec<&SiteFile>, Vec<&SiteFile>) = pages
        .iter()
        .copied()
        .partition(|file| resource_dir(file).is_some_and(|dir| shared.contains_key(dir)));

    let options = MarkdownOptions::all();
    let render = |file: &&SiteFile| {
        if has_error.load(Ordering::Relaxed) {
            return Err(anyhow!("Aborted"));
        }
        if let Err(e) = render_page(file, plugin, &options) {
            if !has_error.swap(true, Ordering::Relaxed) {
                log!("error"; "{}: {:#}", file.src_path().display(), e);
            }
            return Err(anyhow!("Build failed"));
        }
        progress.inc(if file.is_notebook_source() {
            "notebook"
        } else {
            "markdown"
        });
        Ok(())
    };

    parallel.par_iter().try_for_each(&render)?;
    sequential.iter().try_for_each(&render)
}

/// Directory a notebook page writes its extracted outputs into.
fn resource_dir<'a>(file: &'a SiteFile) -> Option<&'a Path> {
    file.is_notebook_source()
        .then(|| file.abs_dest_path().parent())
        .flatten()
}

/// Output directories shared by more than one notebook page, with the
/// notebooks writing into each.
fn shared_resource_dirs(pages: &[&SiteFile]) -> BTreeMap<PathBuf, Vec<PathBuf>> {
    let mut dirs: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for file in pages {
        if let Some(dir) = resource_dir(file) {
            dirs.entry(dir.to_path_buf())
                .or_default()
                .push(file.src_path().to_path_buf());
        }
    }
    dirs.retain(|_, sources| sources.len() > 1);
    dirs
}

/// Read a page's Markdown (through the plugin for notebooks) and write its HTML.
fn render_page(file: &SiteFile, plugin: &NotebookPlugin, options: &MarkdownOptions) -> Result<()> {
    let markdown = match plugin.on_page_read_source(file)? {
        Some(source) => source,
        None => fs::read_to_string(file.abs_src_path())
            .with_context(|| format!("Failed to read {}", file.abs_src_path().display()))?,
    };

    let fallback_title = file
        .src_path()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let html = Page::from_markdown(&markdown, options).to_html(&fallback_title);

    write_output(file.abs_dest_path(), html.as_bytes())
}

/// Copy non-page files verbatim.
fn copy_static_files(
    files: &[&SiteFile],
    has_error: &AtomicBool,
    progress: &ProgressLine,
) -> Result<()> {
    files.par_iter().try_for_each(|file| {
        if has_error.load(Ordering::Relaxed) {
            return Err(anyhow!("Aborted"));
        }
        let dest = file.abs_dest_path();
        let copied = dest
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::copy(file.abs_src_path(), dest));
        if let Err(e) = copied {
            if !has_error.swap(true, Ordering::Relaxed) {
                log!("error"; "failed to copy {}: {}", file.src_path().display(), e);
            }
            return Err(anyhow!("Build failed"));
        }
        progress.inc("static");
        Ok(())
    })
}

fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Summarize unrecognized outputs; returns their count.
fn finalize_build(plugin: &NotebookPlugin) -> usize {
    let warnings = plugin.filters().take_warnings();
    if !warnings.is_empty() {
        log!(
            "warning";
            "{} passed through unformatted",
            plural_count(warnings.len(), "notebook output")
        );
    }
    warnings.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NotebookConfig, SiteSectionConfig};

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(root: &Path) -> SiteConfig {
        SiteConfig {
            root: root.to_path_buf(),
            site: SiteSectionConfig {
                docs_dir: root.join("docs"),
                site_dir: root.join("site"),
                use_directory_urls: true,
            },
            ..SiteConfig::default()
        }
    }

    const NOTEBOOK: &str = r##"{
        "nbformat": 4,
        "nbformat_minor": 4,
        "metadata": {"language_info": {"name": "python"}},
        "cells": [
            {"cell_type": "markdown", "metadata": {}, "source": ["# Analysis\n", "Intro"]},
            {
                "cell_type": "code",
                "metadata": {},
                "execution_count": 1,
                "source": "print('hi')",
                "outputs": [
                    {"output_type": "stream", "name": "stdout", "text": "hi\n"},
                    {
                        "output_type": "execute_result",
                        "execution_count": 1,
                        "metadata": {},
                        "data": {"text/html": "<p>not a table</p>"}
                    }
                ]
            }
        ]
    }"##;

    #[test]
    fn test_build_site() {
        let root = tempfile::tempdir().unwrap();
        let docs = root.path().join("docs");
        write(&docs.join("index.md"), "# Home\n\nWelcome.");
        write(&docs.join("guide/analysis.ipynb"), NOTEBOOK);
        write(&docs.join("img/logo.svg"), "<svg/>");

        let config = config(root.path());
        let summary = build_site(&config, false).unwrap();
        assert_eq!(
            summary,
            BuildSummary {
                notebooks: 1,
                markdown: 1,
                static_files: 1,
                filter_warnings: 1,
            }
        );

        let site = root.path().join("site");
        let index = fs::read_to_string(site.join("index.html")).unwrap();
        assert!(index.contains("<title>Home</title>"));

        let page = fs::read_to_string(site.join("guide/analysis/index.html")).unwrap();
        assert!(page.contains("<title>Analysis</title>"));
        assert!(page.contains("<div class='jupyterInputCell'>"));
        assert!(page.contains("<div class='jupyterOutputCell'>"));
        assert!(page.contains("<p>not a table</p>"));

        assert_eq!(fs::read_to_string(site.join("img/logo.svg")).unwrap(), "<svg/>");
        // Notebook sources are rendered, not copied
        assert!(!site.join("guide/analysis.ipynb").exists());
    }

    #[test]
    fn test_clean_removes_stale_output() {
        let root = tempfile::tempdir().unwrap();
        write(&root.path().join("docs/index.md"), "# Home");
        write(&root.path().join("site/stale.html"), "old");

        let config = config(root.path());
        build_site(&config, false).unwrap();
        assert!(root.path().join("site/stale.html").exists());

        build_site(&config, true).unwrap();
        assert!(!root.path().join("site/stale.html").exists());
        assert!(root.path().join("site/index.html").exists());
    }

    const SVG_NOTEBOOK: &str = r#"{
        "nbformat": 4,
        "nbformat_minor": 4,
        "metadata": {},
        "cells": [
            {
                "cell_type": "code",
                "metadata": {},
                "execution_count": 1,
                "source": "svg()",
                "outputs": [
                    {
                        "output_type": "display_data",
                        "metadata": {},
                        "data": {"image/svg+xml": "<svg/>"}
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_notebooks_sharing_output_dir() {
        let root = tempfile::tempdir().unwrap();
        let docs = root.path().join("docs");
        write(&docs.join("guide/a.ipynb"), SVG_NOTEBOOK);
        write(&docs.join("guide/b.ipynb"), SVG_NOTEBOOK);
        write(&docs.join("c.ipynb"), SVG_NOTEBOOK);
        write(&docs.join("guide/notes.md"), "# Notes");

        let mut config = config(root.path());
        config.site.use_directory_urls = false;
        let plugin = NotebookPlugin::on_config(&config.site, &NotebookConfig::default()).unwrap();

        let files = plugin.on_files(Files::discover(&docs, &config.site.site_dir, false));
        let pages: Vec<&SiteFile> = files.documentation_pages().collect();
        let shared = shared_resource_dirs(&pages);
        assert_eq!(shared.len(), 1);
        let mut sources = shared[&root.path().join("site/guide")].clone();
        sources.sort();
        assert_eq!(
            sources,
            vec![PathBuf::from("guide/a.ipynb"), PathBuf::from("guide/b.ipynb")]
        );

        let summary = build_with(&config, &plugin).unwrap();
        assert_eq!(summary.notebooks, 3);
        let site = root.path().join("site");
        assert!(site.join("guide/a.html").exists());
        assert!(site.join("guide/b.html").exists());
        assert!(site.join("guide/notes.html").exists());
        assert_eq!(fs::read_to_string(site.join("guide/output_0_0.svg")).unwrap(), "<svg/>");
        assert_eq!(fs::read_to_string(site.join("output_0_0.svg")).unwrap(), "<svg/>");
    }

    #[test]
    fn test_directory_urls_keep_outputs_apart() {
        let root = tempfile::tempdir().unwrap();
        let docs = root.path().join("docs");
        write(&docs.join("guide/a.ipynb"), SVG_NOTEBOOK);
        write(&docs.join("guide/b.ipynb"), SVG_NOTEBOOK);

        let config = config(root.path());
        let plugin = NotebookPlugin::on_config(&config.site, &NotebookConfig::default()).unwrap();
        let files = plugin.on_files(Files::discover(&docs, &config.site.site_dir, true));
        let pages: Vec<&SiteFile> = files.documentation_pages().collect();
        assert!(shared_resource_dirs(&pages).is_empty());
    }

    #[test]
    fn test_broken_notebook_fails_build() {
        let root = tempfile::tempdir().unwrap();
        write(&root.path().join("docs/broken.ipynb"), "{ not json");

        let config = config(root.path());
        let plugin = NotebookPlugin::on_config(&config.site, &NotebookConfig::default()).unwrap();
        assert!(build_with(&config, &plugin).is_err());
    }
}
