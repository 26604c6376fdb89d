//! Teaching course cards, one grid per year pane.

use super::{BLANK, NOOPENER, attr, href, raw, render_into};
use crate::error::Result;
use crate::model::{TeachingCourse, YearMap};
use crate::page::{Page, Selector};
use diagnostics::*;
use maud::{Markup, html};

pub const SECTION: &str = "#teachingTab";

const DEFAULT_ICON: &str = "mdi mdi-book";
const DEFAULT_ICON_COLOR: &str = "text-primary";

pub fn year_grid(year: &str) -> Result<Selector> {
    Selector::parse(&format!("#teaching{} .row", year))
}

fn icon_class(course: &TeachingCourse) -> String {
    format!(
        "{} fs-24 {}",
        course.icon.as_deref().unwrap_or(DEFAULT_ICON),
        course.icon_color.as_deref().unwrap_or(DEFAULT_ICON_COLOR)
    )
}

fn course_card(course: &TeachingCourse) -> Markup {
    html! {
        div class="col-lg-6" {
            a href=(href(&course.url)) class="info-item d-block text-body mt-4 pt-2" target=(BLANK) rel=(NOOPENER) {
                div class="p-4" {
                    div class="research avatar-sm bg-soft-purple text-center" {
                        i class=(attr(&icon_class(course))) {}
                    }
                    h6 class="mt-4" { (raw(&course.title)) }
                    p class="text-muted fs-15" { (raw(&course.desc)) }
                }
            }
        }
    }
}

pub fn render_courses(courses: &[TeachingCourse]) -> String {
    html! {
        @for course in courses {
            (course_card(course))
        }
    }
    .into_string()
}

/// Render each year that has data into its pane's grid. Years without a
/// grid on the page are skipped, as are years that cannot form a selector.
pub fn apply<P: Page + ?Sized>(page: &mut P, teaching: &YearMap<TeachingCourse>) -> Result<usize> {
    let mut rendered = 0;
    for (year, courses) in teaching {
        let grid = match year_grid(year) {
            Ok(grid) => grid,
            Err(e) => {
                let err = e.to_string();
                debug!("Skipping teaching year {year}: {err}", year: year.as_str(), err: err.as_str());
                continue;
            }
        };
        if render_into(page, &grid, &render_courses(courses))? {
            rendered += 1;
        }
    }
    Ok(rendered)
}
