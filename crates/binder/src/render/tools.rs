//! The tools link bar.

use super::{BLANK, NOOPENER, attr, href, render_into, text};
use crate::error::Result;
use crate::model::Tool;
use crate::page::{Page, Selector};
use maud::{Markup, PreEscaped, html};

pub const CONTAINER: &str = ".link-bar";

enum Icon<'a> {
    Svg(&'a str),
    Image(&'a str),
    None,
}

/// Inline SVG wins over an image URL.
fn icon(tool: &Tool) -> Icon<'_> {
    match (tool.icon_type.as_deref(), &tool.icon_svg, &tool.icon_url) {
        (Some("svg"), Some(svg), _) => Icon::Svg(svg),
        (_, _, Some(url)) => Icon::Image(url),
        _ => Icon::None,
    }
}

fn tool_link(tool: &Tool) -> Markup {
    let label = text(&tool.label);
    html! {
        a class="tool-link" href=(href(&tool.url)) target=(BLANK) rel=(NOOPENER) {
            @match icon(tool) {
                Icon::Svg(svg) => { (PreEscaped(svg)) },
                Icon::Image(src) => { img src=(attr(src)) alt=(attr(&format!("{} Logo", label))); },
                Icon::None => {},
            }
            (PreEscaped(label))
        }
    }
}

/// One link per tool, in input order.
pub fn render_tools(tools: &[Tool]) -> String {
    html! {
        @for tool in tools {
            (tool_link(tool))
        }
    }
    .into_string()
}

pub fn apply<P: Page + ?Sized>(page: &mut P, tools: &[Tool]) -> Result<usize> {
    let bar = Selector::parse(CONTAINER)?;
    Ok(usize::from(render_into(page, &bar, &render_tools(tools))?))
}
