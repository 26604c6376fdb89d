//! Stored light/dark preference, applied to `<body>` once per page.

use crate::error::Result;
use crate::page::{Page, Selector};
use diagnostics::*;
use serde_json::Value;
use std::path::PathBuf;

/// Key the preference is stored under.
pub const THEME_KEY: &str = "theme";
pub const LAYOUT_MODE: &str = "data-layout-mode";

/// Read-only view of the stored preference.
pub trait ThemeStore: Send + Sync {
    /// The raw stored value, or `None` when unset or unreadable.
    fn preference(&self) -> Option<String>;
}

/// A fixed preference, from configuration or the command line.
#[derive(Debug, Clone, Default)]
pub struct StaticThemeStore(Option<String>);

impl StaticThemeStore {
    pub fn new(preference: Option<String>) -> Self {
        Self(preference)
    }
}

impl ThemeStore for StaticThemeStore {
    fn preference(&self) -> Option<String> {
        self.0.clone()
    }
}

/// A JSON object of string keys to string values, such as a dump of a
/// browser's local storage.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> std::result::Result<Option<String>, String> {
        let body = std::fs::read_to_string(&self.path).map_err(|e| e.to_string())?;
        let value: Value = serde_json::from_str(&body).map_err(|e| e.to_string())?;
        Ok(value
            .get(THEME_KEY)
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

impl ThemeStore for FileThemeStore {
    fn preference(&self) -> Option<String> {
        match self.read() {
            Ok(pref) => pref,
            Err(err) => {
                let path = self.path.display().to_string();
                debug!("Theme store {path} unreadable: {err}", path, err: err.as_str());
                None
            }
        }
    }
}

/// `"dark"` sets the layout mode on `<body>`, `"light"` clears it, and
/// anything else leaves the page alone. Returns whether the page changed.
pub fn apply_preference<P: Page + ?Sized>(page: &mut P, preference: Option<&str>) -> Result<bool> {
    let body = Selector::parse("body")?;
    let touched = match preference {
        Some("dark") => page.set_attribute(&body, LAYOUT_MODE, "dark")?,
        Some("light") => page.remove_attribute(&body, LAYOUT_MODE)?,
        _ => 0,
    };
    Ok(touched > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::HtmlPage;

    #[test]
    fn test_dark_and_light() {
        let mut page = HtmlPage::parse(r#"<html><body class="x"><p>hi</p></body></html>"#).unwrap();
        assert!(apply_preference(&mut page, Some("dark")).unwrap());
        assert!(page.as_str().contains(r#"<body class="x" data-layout-mode="dark">"#));

        assert!(apply_preference(&mut page, Some("light")).unwrap());
        assert!(page.as_str().contains(r#"<body class="x">"#));
        assert!(!page.as_str().contains(LAYOUT_MODE));
    }

    #[test]
    fn test_other_values_do_nothing() {
        let src = r#"<body data-layout-mode="dark"></body>"#;
        let mut page = HtmlPage::parse(src).unwrap();
        assert!(!apply_preference(&mut page, Some("sepia")).unwrap());
        assert!(!apply_preference(&mut page, Some("Dark")).unwrap());
        assert!(!apply_preference(&mut page, None).unwrap());
        assert_eq!(page.as_str(), src);
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"theme": "dark", "lang": "en"}"#).unwrap();
        assert_eq!(FileThemeStore::new(&path).preference().as_deref(), Some("dark"));

        std::fs::write(&path, r#"{"theme": 1}"#).unwrap();
        assert_eq!(FileThemeStore::new(&path).preference(), None);

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(FileThemeStore::new(&path).preference(), None);

        assert_eq!(FileThemeStore::new(dir.path().join("missing.json")).preference(), None);
        assert_eq!(
            StaticThemeStore::new(Some("light".to_string())).preference().as_deref(),
            Some("light")
        );
    }
}
