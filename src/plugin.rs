//! Site-build hooks that turn notebooks into documentation pages.
//!
//! The build calls the hooks in order:
//!
//! ```text
//! on_config            → filters, exporter, executor pipeline
//! on_files             → every .ipynb wrapped as a NotebookFile
//! on_page_read_source  → per page: read, execute, export, write assets
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{NotebookConfig, SiteSectionConfig};
use crate::execute::{self, Execute};
use crate::export::{Exported, MarkdownExporter, Resources};
use crate::filter::CellFilters;
use crate::notebook::{self, Notebook};
use crate::site::{Files, NOTEBOOK_EXTENSION, NotebookFile, SiteFile, has_extension};
use crate::{debug, log};

/// Suffix of the persisted intermediate Markdown.
pub const MARKDOWN_SUFFIX: &str = "md.tmp";

/// Notebook conversion state for one build.
pub struct NotebookPlugin {
    site_dir: PathBuf,
    use_directory_urls: bool,
    write_markdown: bool,
    exporter: MarkdownExporter,
    executor: Option<Box<dyn Execute>>,
}

impl NotebookPlugin {
    /// Build filters, exporter and executor from the loaded configuration.
    pub fn on_config(site: &SiteSectionConfig, config: &NotebookConfig) -> Result<Self> {
        let executor = execute::from_config(config)?;
        if executor.is_some() {
            debug!("execute"; "notebooks run before export (timeout: {:?})", config.timeout);
        }

        Ok(Self {
            site_dir: site.site_dir.clone(),
            use_directory_urls: site.use_directory_urls,
            write_markdown: config.write_markdown,
            exporter: MarkdownExporter::new(CellFilters::default()),
            executor,
        })
    }

    /// Replace the executor pipeline.
    pub fn with_executor(mut self, executor: Option<Box<dyn Execute>>) -> Self {
        self.executor = executor;
        self
    }

    /// Filters shared by every page of this build.
    pub fn filters(&self) -> &CellFilters {
        self.exporter.filters()
    }

    /// Present every notebook source as a documentation page.
    pub fn on_files(&self, files: Files) -> Files {
        files
            .into_iter()
            .map(|file| match file {
                SiteFile::Plain(f) if has_extension(f.src_path(), &[NOTEBOOK_EXTENSION]) => {
                    let nb = NotebookFile::new(f, &self.site_dir, self.use_directory_urls);
                    SiteFile::Notebook(nb)
                }
                other => other,
            })
            .collect()
    }

    /// Markdown source of `file`, or `None` when it is not a notebook.
    ///
    /// Extracted outputs are written next to the page's HTML output.
    pub fn on_page_read_source(&self, file: &SiteFile) -> Result<Option<String>> {
        if !file.is_notebook_source() {
            return Ok(None);
        }

        let exported = self.convert(file.abs_src_path())?;

        if self.write_markdown {
            let path = markdown_path(file.abs_src_path());
            fs::write(&path, &exported.body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            debug!("convert"; "wrote {}", path.display());
        }

        if let Some(dir) = file.abs_dest_path().parent() {
            write_resources(&exported.resources, dir)?;
        }

        Ok(Some(exported.body))
    }

    /// Read, optionally execute, and export the notebook at `path`.
    pub fn convert(&self, path: &Path) -> Result<Exported> {
        let notebook = match &self.executor {
            Some(executor) => {
                let raw = notebook::read_raw(path)?;
                let cwd = path.parent().unwrap_or(Path::new("."));
                log!("execute"; "{}", path.display());
                let executed = executor
                    .execute(raw, cwd)
                    .with_context(|| format!("Failed to execute {}", path.display()))?;
                Notebook::from_value(executed)
                    .with_context(|| format!("Invalid executed notebook {}", path.display()))?
            }
            None => Notebook::from_path(path)?,
        };

        let exported = self
            .exporter
            .export(&notebook)
            .with_context(|| format!("Failed to export {}", path.display()))?;
        Ok(exported)
    }
}

/// `analysis.ipynb` → `analysis.md.tmp`.
pub fn markdown_path(abs_src_path: &Path) -> PathBuf {
    abs_src_path.with_extension(MARKDOWN_SUFFIX)
}

/// Write every resource into `dir`, creating it first.
pub fn write_resources(resources: &Resources, dir: &Path) -> Result<()> {
    if resources.is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    for (filename, content) in resources.iter() {
        let path = dir.join(filename);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    const PNG_PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    fn notebook_json() -> Value {
        json!({
            "nbformat": 4,
            "nbformat_minor": 5,
            "metadata": {"language_info": {"name": "python"}},
            "cells": [
                {"cell_type": "markdown", "metadata": {}, "source": "# Demo"},
                {
                    "cell_type": "code",
                    "metadata": {},
                    "execution_count": 1,
                    "source": "plot()",
                    "outputs": [
                        {
                            "output_type": "display_data",
                            "metadata": {},
                            "data": {"image/png": PNG_PIXEL, "text/plain": "<Figure>"}
                        }
                    ]
                }
            ]
        })
    }

    struct Project {
        _root: tempfile::TempDir,
        docs: PathBuf,
        site: SiteSectionConfig,
    }

    fn project() -> Project {
        let root = tempfile::tempdir().unwrap();
        let docs = root.path().join("docs");
        fs::create_dir_all(docs.join("guide")).unwrap();
        fs::write(
            docs.join("guide/demo.ipynb"),
            serde_json::to_string(&notebook_json()).unwrap(),
        )
        .unwrap();
        fs::write(docs.join("index.md"), "# Home").unwrap();

        let site = SiteSectionConfig {
            docs_dir: docs.clone(),
            site_dir: root.path().join("site"),
            use_directory_urls: true,
        };
        Project {
            _root: root,
            docs,
            site,
        }
    }

    fn files(project: &Project, plugin: &NotebookPlugin) -> Files {
        plugin.on_files(Files::discover(
            &project.docs,
            &project.site.site_dir,
            project.site.use_directory_urls,
        ))
    }

    fn notebook_page(files: &Files) -> &SiteFile {
        files.iter().find(|f| f.is_notebook_source()).unwrap()
    }

    #[test]
    fn test_on_files_wraps_notebooks() {
        let project = project();
        let plugin = NotebookPlugin::on_config(&project.site, &NotebookConfig::default()).unwrap();
        let files = files(&project, &plugin);

        let nb = notebook_page(&files);
        assert!(matches!(nb, SiteFile::Notebook(_)));
        assert!(nb.is_documentation_page());
        assert_eq!(nb.url(), "guide/demo/");
        assert_eq!(files.documentation_pages().count(), 2);
        assert_eq!(files.static_files().count(), 0);
    }

    #[test]
    fn test_page_source_and_assets() {
        let project = project();
        let plugin = NotebookPlugin::on_config(&project.site, &NotebookConfig::default()).unwrap();
        let files = files(&project, &plugin);

        let body = plugin
            .on_page_read_source(notebook_page(&files))
            .unwrap()
            .unwrap();
        assert!(body.starts_with("# Demo\n\n"));
        assert!(body.contains("![png](output_1_0.png)"));

        let asset = project.site.site_dir.join("guide/demo/output_1_0.png");
        assert!(asset.is_file());
        assert_eq!(&fs::read(asset).unwrap()[1..4], b"PNG");

        // write_markdown is off
        assert!(!project.docs.join("guide/demo.md.tmp").exists());
    }

    #[test]
    fn test_non_notebook_pages_are_left_alone() {
        let project = project();
        let plugin = NotebookPlugin::on_config(&project.site, &NotebookConfig::default()).unwrap();
        let files = files(&project, &plugin);

        let index = files.iter().find(|f| !f.is_notebook_source()).unwrap();
        assert_eq!(plugin.on_page_read_source(index).unwrap(), None);
    }

    #[test]
    fn test_write_markdown() {
        let project = project();
        let config = NotebookConfig {
            write_markdown: true,
            ..NotebookConfig::default()
        };
        let plugin = NotebookPlugin::on_config(&project.site, &config).unwrap();
        let files = files(&project, &plugin);

        let body = plugin
            .on_page_read_source(notebook_page(&files))
            .unwrap()
            .unwrap();
        let written = fs::read_to_string(project.docs.join("guide/demo.md.tmp")).unwrap();
        assert_eq!(written, body);
    }

    #[test]
    fn test_executor_runs_in_notebook_dir() {
        let project = project();
        let expected_cwd = project.docs.join("guide");
        let executor = move |mut nb: Value, cwd: &Path| -> Result<Value> {
            assert_eq!(cwd, expected_cwd);
            nb["cells"][1]["outputs"] = json!([
                {"output_type": "stream", "name": "stdout", "text": "executed\n"}
            ]);
            Ok(nb)
        };
        let plugin = NotebookPlugin::on_config(&project.site, &NotebookConfig::default())
            .unwrap()
            .with_executor(Some(Box::new(executor)));
        let files = files(&project, &plugin);

        let body = plugin
            .on_page_read_source(notebook_page(&files))
            .unwrap()
            .unwrap();
        assert!(body.contains("```\nexecuted\n\n```"));
        assert!(!body.contains("output_1_0.png"));
    }

    #[test]
    fn test_executor_failure_names_the_notebook() {
        let project = project();
        let executor = |_: Value, _: &Path| -> Result<Value> { anyhow::bail!("kernel died") };
        let plugin = NotebookPlugin::on_config(&project.site, &NotebookConfig::default())
            .unwrap()
            .with_executor(Some(Box::new(executor)));
        let files = files(&project, &plugin);

        let err = plugin
            .on_page_read_source(notebook_page(&files))
            .unwrap_err();
        assert!(format!("{err:#}").contains("demo.ipynb"));
        assert!(format!("{err:#}").contains("kernel died"));
    }

    #[test]
    fn test_markdown_path() {
        assert_eq!(
            markdown_path(Path::new("/docs/guide/demo.ipynb")),
            Path::new("/docs/guide/demo.md.tmp")
        );
    }
}
