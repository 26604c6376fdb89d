//! Research accordions: themes, projects and thesis topics.
//!
//! Panel ids come from the item's index, so they are stable for a given
//! array order and say nothing about the item's content.

use super::{attr, raw, render_into, text};
use crate::error::Result;
use crate::model::{ResearchCollection, ResearchItem};
use crate::page::{Page, Selector};
use maud::{Markup, PreEscaped, html};

/// One accordion: its container and the id prefix of its panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accordion {
    pub container: &'static str,
    pub id_prefix: &'static str,
}

pub const THEMES: Accordion = Accordion {
    container: "#themesAccordion",
    id_prefix: "theme",
};
pub const PROJECTS: Accordion = Accordion {
    container: "#projectsAccordion",
    id_prefix: "project",
};
pub const TOPICS: Accordion = Accordion {
    container: "#topicsAccordion",
    id_prefix: "topic",
};

impl Accordion {
    pub fn heading_id(&self, index: usize) -> String {
        format!("{}Heading{}", self.id_prefix, index)
    }

    pub fn body_id(&self, index: usize) -> String {
        format!("{}{}", self.id_prefix, index)
    }
}

fn panel(acc: &Accordion, index: usize, item: &ResearchItem) -> Markup {
    let hid = acc.heading_id(index);
    let cid = acc.body_id(index);
    let title = text(&item.title);
    html! {
        div class="accordion-item" {
            h2 class="accordion-header" id=(hid) {
                button class="accordion-button collapsed" type="button" data-bs-toggle="collapse"
                    data-bs-target=(format!("#{}", cid)) aria-expanded="false" aria-controls=(cid) {
                    @if let Some(img) = &item.img {
                        img src=(attr(img)) alt=(attr(title)) class="accordion-thumb me-2";
                    }
                    span { (PreEscaped(title)) }
                }
            }
            div id=(cid) class="accordion-collapse collapse" aria-labelledby=(hid) data-bs-parent=(acc.container) {
                div class="accordion-body" { (raw(&item.desc)) }
            }
        }
    }
}

pub fn render_accordion(acc: &Accordion, items: &[ResearchItem]) -> String {
    html! {
        @for (index, item) in items.iter().enumerate() {
            (panel(acc, index, item))
        }
    }
    .into_string()
}

/// Render the three accordions independently. A collection that is not an
/// array leaves its accordion alone.
pub fn apply<P: Page + ?Sized>(page: &mut P, research: &ResearchCollection) -> Result<usize> {
    let mut rendered = 0;
    for (acc, items) in [
        (THEMES, &research.themes),
        (PROJECTS, &research.projects),
        (TOPICS, &research.thesis_topics),
    ] {
        let Some(items) = items else {
            continue;
        };
        let container = Selector::parse(acc.container)?;
        if render_into(page, &container, &render_accordion(&acc, items))? {
            rendered += 1;
        }
    }
    Ok(rendered)
}
