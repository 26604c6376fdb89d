//! `binder.yaml` configuration.

use crate::paths::{PathResolver, validate_prefix};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "binder.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BinderConfig {
    pub site: SiteConfig,
    pub data: DataConfig,
    /// Display-mode preference applied to every page.
    pub theme: Option<String>,
    pub news: NewsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding the HTML pages and, by default, `data/`.
    pub root: PathBuf,
    pub output: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: PathBuf::from("dist"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Fetch data over HTTP from here instead of reading the site root.
    pub base_url: Option<String>,
    /// Prefix in front of `data/` for every page. Without one, the prefix
    /// follows the page's directory depth.
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewsConfig {
    /// Year tab to activate when building.
    pub active_year: Option<String>,
}

impl BinderConfig {
    pub fn path_resolver(&self) -> PathResolver {
        PathResolver::new(self.data.prefix.clone())
    }
}

/// Load configuration from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BinderConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

    let config: BinderConfig = serde_yaml_ng::from_str(&content)
        .with_context(|| format!("Failed to parse YAML configuration: {}", path.as_ref().display()))?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &BinderConfig) -> Result<()> {
    if let Some(base) = &config.data.base_url {
        let url = Url::parse(base).with_context(|| format!("data.base_url '{}' is not an absolute URL", base))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("data.base_url '{}' cannot be used as a base URL", base);
        }
    }

    if let Some(prefix) = &config.data.prefix {
        validate_prefix(prefix)?;
    }

    if config.news.active_year.as_deref().is_some_and(|y| y.trim().is_empty()) {
        anyhow::bail!("news.active_year cannot be empty");
    }

    Ok(())
}
