//! News lists, either one per year tab or a single merged list.

use super::{BLANK, NOOPENER, href, raw, render_into};
use crate::error::Result;
use crate::model::{NewsItem, YearMap};
use crate::page::{Page, Selector};
use maud::{Markup, html};
use std::cmp::Ordering;

/// Presence of this container selects the tabbed layout.
pub const TABS: &str = "#newsTab";
pub const FALLBACK_LIST: &str = ".news-list";

pub fn year_list(year: &str) -> Selector {
    Selector::id(&format!("news-list-{}", year))
}

pub fn year_pane(year: &str) -> Selector {
    Selector::id(&format!("news{}", year))
}

fn news_item(item: &NewsItem) -> Markup {
    let external = item.url.is_some();
    html! {
        li {
            a href=(href(&item.url)) class="news-item" target=[external.then_some(BLANK)] rel=[external.then_some(NOOPENER)] {
                p class="news-item-date text-muted fs-12 m-0" { (raw(&item.date)) }
                h5 class="news-item-title" { (raw(&item.title)) }
                p class="news-item-description" { (raw(&item.desc)) }
            }
        }
    }
}

pub fn render_news_items<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a NewsItem>,
{
    html! {
        @for item in items {
            (news_item(item))
        }
    }
    .into_string()
}

/// Leading integer of a key, read the way `parseInt` reads it.
fn leading_int(key: &str) -> Option<i64> {
    let s = key.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    digits[..len].parse::<i64>().ok().map(|n| sign * n)
}

/// Newest first. Numeric keys come before the rest and compare by value,
/// ties by text; other keys are reverse lexicographic.
pub fn compare_years_desc(a: &str, b: &str) -> Ordering {
    match (leading_int(a), leading_int(b)) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.cmp(a)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.cmp(a),
    }
}

/// Every year's items in one sequence, newest year first, item order kept.
pub fn flatten_by_year_desc(news: &YearMap<NewsItem>) -> Vec<&NewsItem> {
    let mut years: Vec<&String> = news.keys().collect();
    years.sort_by(|a, b| compare_years_desc(a, b));
    years.into_iter().flat_map(|y| news[y].iter()).collect()
}

/// Render one year into `#news-list-{year}`. A year missing from the data
/// renders an empty list.
pub fn render_year<P: Page + ?Sized>(page: &mut P, year: &str, news: &YearMap<NewsItem>) -> Result<bool> {
    let items = news.get(year).map(Vec::as_slice).unwrap_or(&[]);
    render_into(page, &year_list(year), &render_news_items(items))
}

/// Tabbed layout: every year is rendered once, not only the active one.
pub fn apply_tabbed<P: Page + ?Sized>(page: &mut P, news: &YearMap<NewsItem>) -> Result<usize> {
    let mut rendered = 0;
    for year in news.keys() {
        if render_year(page, year, news)? {
            rendered += 1;
        }
    }
    Ok(rendered)
}

/// Fallback layout: one merged list. No years leaves the list untouched.
pub fn apply_fallback<P: Page + ?Sized>(page: &mut P, news: &YearMap<NewsItem>) -> Result<usize> {
    if news.is_empty() {
        return Ok(0);
    }
    let list = Selector::parse(FALLBACK_LIST)?;
    let html = render_news_items(flatten_by_year_desc(news));
    Ok(usize::from(render_into(page, &list, &html)?))
}

/// Pick the layout from the page, then render.
pub fn apply<P: Page + ?Sized>(page: &mut P, news: &YearMap<NewsItem>) -> Result<usize> {
    if page.exists(&Selector::parse(TABS)?) {
        apply_tabbed(page, news)
    } else {
        apply_fallback(page, news)
    }
}
