//! Locating the `data/` directory from a page.

use crate::error::{Error, Result};

/// Directory holding the JSON data files, relative to the data prefix.
pub const DATA_DIR: &str = "data/";

/// Works out the prefix in front of `data/` for a page.
///
/// An explicit prefix applies to every page. Without one, each directory
/// level between the site root and the page adds a `../`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResolver {
    explicit: Option<String>,
}

impl PathResolver {
    pub fn new(explicit: Option<String>) -> Self {
        Self { explicit }
    }

    pub fn explicit<S: Into<String>>(prefix: S) -> Self {
        Self {
            explicit: Some(prefix.into()),
        }
    }

    /// Prefix for a page given by its site-root-relative path.
    pub fn prefix_for(&self, page_path: &str) -> String {
        if let Some(prefix) = &self.explicit {
            return prefix.clone();
        }
        let depth = page_dir(page_path)
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .count();
        "../".repeat(depth)
    }

    /// Page-relative URL of a data file: `prefix + "data/" + file`.
    pub fn data_url(&self, page_path: &str, file: &str) -> String {
        format!("{}{}{}", self.prefix_for(page_path), DATA_DIR, file)
    }

    /// Site-root-relative path of a data file, as fetched by a `DataSource`.
    pub fn resolve(&self, page_path: &str, file: &str) -> Result<String> {
        join_relative(page_dir(page_path), &self.data_url(page_path, file))
    }
}

/// Check a configured prefix: empty, or ending in `/`.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() || prefix.ends_with('/') {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "data prefix '{}' must be empty or end with '/'",
            prefix
        )))
    }
}

/// Directory part of a site-relative page path ("" for root pages).
fn page_dir(page_path: &str) -> &str {
    let trimmed = page_path.trim_start_matches('/');
    match trimmed.rfind('/') {
        Some(i) => &trimmed[..i],
        None => "",
    }
}

/// Resolve `rel` against `dir`, folding `.` and `..`. Climbing above the
/// site root is an error.
pub fn join_relative(dir: &str, rel: &str) -> Result<String> {
    let mut stack: Vec<&str> = Vec::new();
    let rel_is_absolute = rel.starts_with('/');
    let base = if rel_is_absolute { "" } else { dir };

    for segment in base.split('/').chain(rel.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                if stack.pop().is_none() {
                    return Err(Error::Config(format!(
                        "'{}' from '{}' escapes the site root",
                        rel, dir
                    )));
                }
            }
            s => stack.push(s),
        }
    }
    Ok(stack.join("/"))
}
