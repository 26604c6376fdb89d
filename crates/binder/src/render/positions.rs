//! Open positions list.

use super::{BLANK, NOOPENER, href, raw, render_into};
use crate::error::Result;
use crate::model::Position;
use crate::page::{Page, Selector};
use maud::{Markup, html};

/// Presence of the section gates the fetch.
pub const SECTION: &str = ".open-positions";
pub const CONTAINER: &str = ".open-positions ul.list-unstyled";

fn position(pos: &Position) -> Markup {
    let target = if pos.url.is_some() { BLANK } else { "_self" };
    html! {
        li class="mb-3" {
            a href=(href(&pos.url)) class="open-position d-flex p-4" target=(target) rel=(NOOPENER) {
                div class="open-position-icon" { i class="mdi mdi-briefcase fs-20" {} }
                div class="open-position-content ps-3" {
                    h5 class="open-position-title mb-2" { (raw(&pos.title)) }
                    p class="open-position-description m-0" { (raw(&pos.desc)) }
                }
            }
        }
    }
}

pub fn render_positions(positions: &[Position]) -> String {
    html! {
        @for pos in positions {
            (position(pos))
        }
    }
    .into_string()
}

pub fn apply<P: Page + ?Sized>(page: &mut P, positions: &[Position]) -> Result<usize> {
    let list = Selector::parse(CONTAINER)?;
    Ok(usize::from(render_into(page, &list, &render_positions(positions))?))
}
