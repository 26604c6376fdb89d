//! Year tabs for the news section.

use crate::error::Result;
use crate::model::{NewsItem, YearMap};
use crate::page::{Page, Selector};
use crate::render::news::{self, TABS};
use diagnostics::*;

/// Switches the visible news year and re-renders that year's list.
pub struct TabController<'a> {
    news: &'a YearMap<NewsItem>,
}

impl<'a> TabController<'a> {
    pub fn new(news: &'a YearMap<NewsItem>) -> Self {
        Self { news }
    }

    /// `data-year` of every tab button, in document order.
    pub fn years<P: Page + ?Sized>(page: &P) -> Result<Vec<String>> {
        let buttons = page.select_all(&Selector::parse(&format!("{} button", TABS))?)?;
        Ok(buttons
            .iter()
            .filter_map(|b| b.attr("data-year").map(str::to_string))
            .collect())
    }

    /// Activate the tab for `year`.
    ///
    /// The previous tab and every pane are deactivated before the target tab
    /// and pane are activated, then the year's list is rendered. Activating
    /// the same year twice leaves the page unchanged the second time.
    /// Returns whether the year's list container exists.
    pub fn activate<P: Page + ?Sized>(&self, page: &mut P, year: &str) -> Result<bool> {
        page.remove_class(&Selector::parse(&format!("{} .active", TABS))?, &["active"])?;
        let button = Selector::parse(&format!(r#"{} button[data-year="{}"]"#, TABS, year))?;
        page.add_class(&button, &["active"])?;

        page.remove_class(&Selector::parse(".tab-pane")?, &["show", "active"])?;
        page.add_class(&news::year_pane(year), &["show", "active"])?;

        let rendered = news::render_year(page, year, self.news)?;
        debug!("Activated news tab {year}, list rendered: {rendered}", year, rendered);
        Ok(rendered)
    }
}
