//! # Binder: build-time content binding for a static site
//!
//! Pages are searched for known containers (a tools bar, news lists, open
//! positions, research accordions, member views, teaching grids). Each
//! section present on a page has its JSON data file fetched from a
//! [`DataSource`], rendered to markup, and spliced into the page.
//!
//! ```bash
//! binder build --root site --out dist
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod page;
pub mod paths;
pub mod render;
pub mod sections;
pub mod site;
pub mod tabs;
pub mod theme;

pub use config::{BinderConfig, load_config, validate_config};
pub use error::{Error, Result};
pub use fetch::{DataSource, DirSource, HttpSource};
pub use page::{HtmlPage, Page, Selector};
pub use paths::PathResolver;
pub use sections::{BindReport, Binder, SECTIONS, Section, SectionOutcome, SectionReport};
pub use site::SiteBuilder;
pub use tabs::TabController;
pub use theme::{FileThemeStore, StaticThemeStore, ThemeStore};
