//! Binding every page of a site directory.

use crate::page::HtmlPage;
use crate::sections::{BindReport, Binder};
use anyhow::{Context, Result};
use diagnostics::*;
use std::path::{Component, Path, PathBuf};
use wax::Glob;

pub const PAGE_PATTERN: &str = "**/*.html";

/// HTML pages under `root` as (site-relative path, file path), sorted by
/// relative path. Anything under `exclude` is left out.
pub fn html_pages(root: &Path, exclude: Option<&Path>) -> Result<Vec<(String, PathBuf)>> {
    let glob = Glob::new(PAGE_PATTERN).context("invalid page pattern")?;
    let exclude = exclude.and_then(|p| std::fs::canonicalize(p).ok());

    let mut pages = Vec::new();
    for entry in glob.walk(root) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        let fullpath = entry.path();
        if !std::fs::metadata(fullpath)?.is_file() {
            continue;
        }
        if let Some(exclude) = &exclude {
            if std::fs::canonicalize(fullpath)?.starts_with(exclude) {
                continue;
            }
        }
        let relpath = fullpath.strip_prefix(root).unwrap_or(fullpath);
        pages.push((site_path(relpath), fullpath.to_path_buf()));
    }
    pages.sort();
    Ok(pages)
}

/// `/`-separated form of a relative path.
fn site_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Binds pages read from a site root.
pub struct SiteBuilder {
    binder: Binder,
    root: PathBuf,
}

impl SiteBuilder {
    pub fn new<P: Into<PathBuf>>(binder: Binder, root: P) -> Self {
        Self {
            binder,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read and bind one page given by its site-relative path.
    pub async fn bind_page(&self, page_path: &str) -> Result<(HtmlPage, BindReport)> {
        let file = self.root.join(page_path);
        let source = tokio::fs::read_to_string(&file)
            .await
            .with_context(|| format!("Failed to read page: {}", file.display()))?;
        let mut page = HtmlPage::parse(source).with_context(|| format!("Failed to parse page: {}", file.display()))?;
        let report = self
            .binder
            .bind(page_path, &mut page)
            .await
            .with_context(|| format!("Failed to bind page: {}", page_path))?;
        Ok((page, report))
    }

    /// Bind every page and write it under `output` at the same relative
    /// path. Pages are bound one at a time.
    pub async fn build(&self, output: &Path) -> Result<Vec<BindReport>> {
        tokio::fs::create_dir_all(output)
            .await
            .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

        let (root, exclude) = (self.root.clone(), output.to_path_buf());
        let pages = tokio::task::spawn_blocking(move || html_pages(&root, Some(&exclude)))
            .await
            .context("Page walk did not complete")??;
        let count = pages.len();
        let root = self.root.display().to_string();
        info!("Building {count} pages from {root}", count, root);

        let mut reports = Vec::with_capacity(pages.len());
        for (page_path, _) in pages {
            let (page, report) = self.bind_page(&page_path).await?;
            let dest = output.join(&page_path);
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            tokio::fs::write(&dest, page.as_str())
                .await
                .with_context(|| format!("Failed to write page: {}", dest.display()))?;
            reports.push(report);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::DirSource;
    use std::sync::Arc;

    #[test]
    fn test_html_pages_sorted_and_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("people")).unwrap();
        std::fs::create_dir_all(root.join("dist")).unwrap();
        std::fs::write(root.join("index.html"), "<p></p>").unwrap();
        std::fs::write(root.join("people/members.html"), "<p></p>").unwrap();
        std::fs::write(root.join("style.css"), "body{}").unwrap();
        std::fs::write(root.join("dist/index.html"), "<p></p>").unwrap();

        let pages = html_pages(root, Some(&root.join("dist"))).unwrap();
        let names: Vec<_> = pages.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(names, vec!["index.html", "people/members.html"]);
    }

    #[tokio::test]
    async fn test_build_writes_pages_outside_output() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("people")).unwrap();
        std::fs::create_dir_all(root.join("dist")).unwrap();
        std::fs::write(root.join("index.html"), "<p>home</p>").unwrap();
        std::fs::write(root.join("people/members.html"), "<p>people</p>").unwrap();
        std::fs::write(root.join("dist/index.html"), "<p>stale</p>").unwrap();

        let builder = SiteBuilder::new(Binder::new(Arc::new(DirSource::new(root))), root);
        let reports = builder.build(&root.join("dist")).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(
            std::fs::read_to_string(root.join("dist/people/members.html")).unwrap(),
            "<p>people</p>"
        );
        assert_eq!(std::fs::read_to_string(root.join("dist/index.html")).unwrap(), "<p>home</p>");
    }

    #[tokio::test]
    async fn test_bind_page_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let builder = SiteBuilder::new(Binder::new(Arc::new(DirSource::new(dir.path()))), dir.path());
        assert!(builder.bind_page("nope.html").await.is_err());
    }
}
