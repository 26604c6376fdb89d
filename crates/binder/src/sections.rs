//! Binding a page: which sections it supports, fetching their data, and
//! rendering the results into it.

use crate::error::{Error, Result};
use crate::fetch::DataSource;
use crate::model::{self, MemberGroups, NewsItem, Position, ResearchCollection, TeachingCourse, Tool, YearMap};
use crate::page::{Page, Selector};
use crate::paths::PathResolver;
use crate::render::{members, news, positions, research, teaching, tools};
use crate::tabs::TabController;
use crate::theme::{StaticThemeStore, ThemeStore, apply_preference};
use diagnostics::*;
use futures::future::join_all;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A content section: one data file, one renderer, and the containers
/// whose presence means the page wants it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Tools,
    News,
    Positions,
    Research,
    Members,
    Teaching,
}

/// Every section, in the order results are applied.
pub const SECTIONS: [Section; 6] = [
    Section::Tools,
    Section::News,
    Section::Positions,
    Section::Research,
    Section::Members,
    Section::Teaching,
];

impl Section {
    pub fn name(&self) -> &'static str {
        match self {
            Section::Tools => "tools",
            Section::News => "news",
            Section::Positions => "positions",
            Section::Research => "research",
            Section::Members => "members",
            Section::Teaching => "teaching",
        }
    }

    pub fn data_file(&self) -> &'static str {
        match self {
            Section::Tools => "tools.json",
            Section::News => "news.json",
            Section::Positions => "positions.json",
            Section::Research => "research.json",
            Section::Members => "members.json",
            Section::Teaching => "teaching.json",
        }
    }

    /// The section runs when any of these match.
    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            Section::Tools => &[tools::CONTAINER],
            Section::News => &[news::TABS, news::FALLBACK_LIST],
            Section::Positions => &[positions::SECTION],
            Section::Research => &[
                research::THEMES.container,
                research::PROJECTS.container,
                research::TOPICS.container,
            ],
            Section::Members => &[members::SECTION],
            Section::Teaching => &[teaching::SECTION],
        }
    }

    pub fn is_supported<P: Page + ?Sized>(&self, page: &P) -> Result<bool> {
        for marker in self.markers() {
            if page.exists(&Selector::parse(marker)?) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn decode(&self, path: &str, value: Value) -> Result<SectionData> {
        Ok(match self {
            Section::Tools => SectionData::Tools(model::decode_tools(path, value)?),
            Section::News => SectionData::News(model::decode_news(path, value)?),
            Section::Positions => SectionData::Positions(model::decode_positions(path, value)?),
            Section::Research => SectionData::Research(model::decode_research(path, value)?),
            Section::Members => SectionData::Members(model::decode_members(path, value)?),
            Section::Teaching => SectionData::Teaching(model::decode_teaching(path, value)?),
        })
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sections a page supports, in application order.
pub fn supported_sections<P: Page + ?Sized>(page: &P) -> Result<Vec<Section>> {
    let mut found = Vec::new();
    for section in SECTIONS {
        if section.is_supported(page)? {
            found.push(section);
        }
    }
    Ok(found)
}

/// Decoded data for one section.
#[derive(Debug, Clone)]
pub enum SectionData {
    Tools(Vec<Tool>),
    News(YearMap<NewsItem>),
    Positions(Vec<Position>),
    Research(ResearchCollection),
    Members(MemberGroups),
    Teaching(YearMap<TeachingCourse>),
}

impl SectionData {
    /// Render into the page; returns the number of containers filled.
    ///
    /// All or nothing: when any container fails, the ones already rendered
    /// are put back as they were.
    pub fn apply<P: Page + ?Sized>(&self, page: &mut P) -> Result<usize> {
        let checkpoint = page.checkpoint();
        let applied = match self {
            SectionData::Tools(data) => tools::apply(page, data),
            SectionData::News(data) => news::apply(page, data),
            SectionData::Positions(data) => positions::apply(page, data),
            SectionData::Research(data) => research::apply(page, data),
            SectionData::Members(data) => members::apply(page, data),
            SectionData::Teaching(data) => teaching::apply(page, data),
        };
        if applied.is_err() {
            page.rollback(checkpoint);
        }
        applied
    }
}

#[derive(Debug)]
pub enum SectionOutcome {
    /// Data applied; the count of containers filled.
    Rendered(usize),
    /// The page has no container for this section.
    Skipped,
    /// The section was left as authored.
    Failed(Error),
}

#[derive(Debug)]
pub struct SectionReport {
    pub section: Section,
    /// Site-root-relative data path, when one could be resolved.
    pub path: Option<String>,
    pub outcome: SectionOutcome,
}

/// What binding did to one page.
#[derive(Debug)]
pub struct BindReport {
    pub page: String,
    pub sections: Vec<SectionReport>,
    pub theme_applied: bool,
    /// Whether the configured news year had a list to render into.
    pub activated_year: Option<bool>,
}

impl BindReport {
    pub fn outcome(&self, section: Section) -> Option<&SectionOutcome> {
        self.sections
            .iter()
            .find(|r| r.section == section)
            .map(|r| &r.outcome)
    }

    pub fn rendered(&self) -> usize {
        self.sections
            .iter()
            .filter(|r| matches!(r.outcome, SectionOutcome::Rendered(_)))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SectionReport> {
        self.sections
            .iter()
            .filter(|r| matches!(r.outcome, SectionOutcome::Failed(_)))
    }
}

impl fmt::Display for BindReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.page)?;
        let mut any = false;
        for report in &self.sections {
            match &report.outcome {
                SectionOutcome::Rendered(n) => write!(f, " {}({})", report.section, n)?,
                SectionOutcome::Failed(_) => write!(f, " {}(failed)", report.section)?,
                SectionOutcome::Skipped => continue,
            }
            any = true;
        }
        if !any {
            write!(f, " no sections")?;
        }
        if self.theme_applied {
            write!(f, " +theme")?;
        }
        Ok(())
    }
}

/// Binds pages to data from one source.
pub struct Binder {
    source: Arc<dyn DataSource>,
    resolver: PathResolver,
    theme: Arc<dyn ThemeStore>,
    active_year: Option<String>,
}

impl Binder {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            resolver: PathResolver::default(),
            theme: Arc::new(StaticThemeStore::default()),
            active_year: None,
        }
    }

    pub fn with_resolver(mut self, resolver: PathResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_theme(mut self, theme: Arc<dyn ThemeStore>) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_active_year(mut self, year: Option<String>) -> Self {
        self.active_year = year;
        self
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }

    /// Bind one page, given by its site-root-relative path.
    ///
    /// Fetches for every supported section run concurrently. Results are
    /// applied one at a time in table order. A section that fails to fetch,
    /// decode or render is reported and the rest carry on. Only a page that
    /// cannot be searched at all is an error.
    pub async fn bind<P: Page + ?Sized>(&self, page_path: &str, page: &mut P) -> Result<BindReport> {
        let supported = supported_sections(page)?;

        let theme_applied = apply_preference(page, self.theme.preference().as_deref())?;

        let fetches = SECTIONS.iter().map(|&section| {
            let wanted = supported.contains(&section);
            let path = wanted.then(|| self.resolver.resolve(page_path, section.data_file()));
            async move {
                let fetched = match &path {
                    None => None,
                    Some(Err(_)) => None,
                    Some(Ok(path)) => Some(self.source.fetch(path).await),
                };
                (section, path, fetched)
            }
        });
        let results = join_all(fetches).await;

        let mut sections = Vec::with_capacity(results.len());
        let mut news_data = None;
        for (section, path, fetched) in results {
            let (path, outcome) = match (path, fetched) {
                (None, _) => (None, SectionOutcome::Skipped),
                (Some(Err(e)), _) => (None, SectionOutcome::Failed(e)),
                (Some(Ok(path)), Some(Ok(value))) => {
                    let outcome = match section.decode(&path, value) {
                        Ok(data) => {
                            let applied = data.apply(page);
                            if let SectionData::News(news) = data {
                                news_data = Some(news);
                            }
                            match applied {
                                Ok(n) => SectionOutcome::Rendered(n),
                                Err(e) => SectionOutcome::Failed(e),
                            }
                        }
                        Err(e) => SectionOutcome::Failed(e),
                    };
                    (Some(path), outcome)
                }
                (Some(Ok(path)), Some(Err(e))) => (Some(path), SectionOutcome::Failed(e)),
                (Some(Ok(path)), None) => (Some(path), SectionOutcome::Skipped),
            };

            if let SectionOutcome::Failed(e) = &outcome {
                let name = section.name();
                let err = e.to_string();
                let location = path
                    .as_deref()
                    .map(|p| self.source.describe(p))
                    .unwrap_or_default();
                if e.is_fetch_error() {
                    info!(
                        "Skipping section {name} on {page_path} ({location}): {err}",
                        name,
                        page_path,
                        location,
                        err: err.as_str()
                    );
                } else {
                    warn!(
                        "Section {name} failed on {page_path} ({location}): {err}",
                        name,
                        page_path,
                        location,
                        err: err.as_str()
                    );
                }
            }
            sections.push(SectionReport {
                section,
                path,
                outcome,
            });
        }

        let tabbed = page.exists(&Selector::parse(news::TABS)?);
        let activated_year = match (&self.active_year, &news_data) {
            (Some(year), Some(data)) if tabbed => Some(TabController::new(data).activate(page, year)?),
            _ => None,
        };

        let report = BindReport {
            page: page_path.to_string(),
            sections,
            theme_applied,
            activated_year,
        };
        let rendered = report.rendered();
        debug!("Bound {page_path}: {rendered} sections rendered", page_path, rendered);
        Ok(report)
    }
}
