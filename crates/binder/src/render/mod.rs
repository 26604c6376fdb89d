//! Renderers: data records in, HTML fragments out.
//!
//! Each module has pure `render_*` functions that build markup with maud,
//! and an `apply` function that puts the markup into the containers the
//! section owns. Data is authored for the site, so text fields and inline
//! SVG icons go into the markup as written. Attribute values only have `"`
//! replaced, which would otherwise end the attribute.

pub mod members;
pub mod news;
pub mod positions;
pub mod research;
pub mod teaching;
pub mod tools;

use crate::error::Result;
use crate::page::{Page, Selector};
use maud::PreEscaped;

pub(crate) const BLANK: &str = "_blank";
pub(crate) const NOOPENER: &str = "noopener noreferrer";

/// Absent text renders as empty text.
pub(crate) fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Text as authored markup.
pub(crate) fn raw(value: &Option<String>) -> PreEscaped<&str> {
    PreEscaped(text(value))
}

/// An attribute value as written, with `"` as `&quot;`.
pub(crate) fn attr(value: &str) -> PreEscaped<String> {
    PreEscaped(value.replace('"', "&quot;"))
}

/// Absent links point at `#`.
pub(crate) fn href(value: &Option<String>) -> PreEscaped<String> {
    attr(value.as_deref().unwrap_or("#"))
}

/// Render into a container if the page has it. An absent container is a
/// no-op and returns `false`.
pub(crate) fn render_into<P: Page + ?Sized>(
    page: &mut P,
    selector: &Selector,
    html: &str,
) -> Result<bool> {
    if !page.exists(selector) {
        return Ok(false);
    }
    page.render(selector, html)?;
    Ok(true)
}
