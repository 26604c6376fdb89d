//! The page seam: everything the renderers are allowed to do to a document.
//!
//! Renderers never touch markup directly. They look up containers, replace a
//! container's inner HTML, and flip attributes or classes through [`Page`].
//! [`HtmlPage`] implements it over an HTML string. `tl` parses the document,
//! resolves each compound selector and supplies attributes; mutations splice
//! the source text at the offsets `tl` reports.

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tl::queryselector::Selector as Query;

/// Elements whose content is text, even when it looks like markup.
const RAW_TEXT: &[&str] = &["script", "style", "textarea"];

/// Elements whose content is parsed but never part of the document.
const INERT: &str = "template";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    /// A compound selector in `tl` syntax, e.g. `ul.list-unstyled`.
    Query(String),
    /// An id taken verbatim, whatever characters it holds.
    Id(String),
}

/// A descendant chain of compound selectors, outermost first.
///
/// Each whitespace-separated word is handed to `tl` and must be a single
/// compound (`tag`, `#id`, `.class`, `[attr]`, `[attr=value]`,
/// `[attr^=prefix]` and combinations of those).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    parts: Vec<Part>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let mut parts = Vec::new();
        for word in source.split_whitespace() {
            match tl::parse_query_selector(word) {
                Some(query) if is_compound(&query) => parts.push(Part::Query(word.to_string())),
                _ => {
                    return Err(Error::Selector(format!(
                        "unsupported selector '{}' in '{}'",
                        word, source
                    )));
                }
            }
        }
        if parts.is_empty() {
            return Err(Error::Selector(format!("empty selector '{}'", source)));
        }
        Ok(Self {
            source: source.split_whitespace().collect::<Vec<_>>().join(" "),
            parts,
        })
    }

    /// Shorthand for `#id`. Never fails, so data-derived ids need no escaping.
    pub fn id(id: &str) -> Self {
        Self {
            source: format!("#{}", id),
            parts: vec![Part::Id(id.to_string())],
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}

/// Combinators have no meaning inside one word; whitespace is the only one.
fn is_compound(query: &Query<'_>) -> bool {
    match query {
        Query::And(a, b) => is_compound(a) && is_compound(b),
        Query::Or(..) | Query::Descendant(..) | Query::Parent(..) => false,
        Query::Tag(name) | Query::Id(name) | Query::Class(name) | Query::Attribute(name) => {
            !name.is_empty()
        }
        Query::AttributeValue(name, _)
        | Query::AttributeValueWhitespacedContains(name, _)
        | Query::AttributeValueStartsWith(name, _)
        | Query::AttributeValueEndsWith(name, _)
        | Query::AttributeValueSubstring(name, _) => !name.is_empty(),
        Query::All => true,
    }
}

/// Owned snapshot of one element, taken from a single parse of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    node: usize,
    tag: String,
    attrs: Vec<(String, Option<String>)>,
    start: usize,
    open_end: usize,
    close_start: Option<usize>,
    self_closing: bool,
}

impl Element {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// True when the element has its own end tag and can hold rendered content.
    pub fn is_container(&self) -> bool {
        self.close_start.is_some()
    }

    fn contains(&self, other: &Element) -> bool {
        self.close_start
            .is_some_and(|close| self.start < other.start && other.start < close)
    }

    fn is_void(&self) -> bool {
        self.self_closing || VOID_ELEMENTS.contains(&self.tag.as_str())
    }
}

/// Operations renderers may perform on a page.
///
/// Selectors always match in document order. `render` targets the first
/// match; attribute and class edits apply to every match and return how
/// many elements were touched.
pub trait Page {
    fn select_all(&self, selector: &Selector) -> Result<Vec<Element>>;

    fn select(&self, selector: &Selector) -> Result<Option<Element>> {
        Ok(self.select_all(selector)?.into_iter().next())
    }

    /// Whether the page has a container. Unparseable pages have no containers.
    fn exists(&self, selector: &Selector) -> bool {
        matches!(self.select(selector), Ok(Some(_)))
    }

    /// Current inner markup of the first match, if any.
    fn inner_html(&self, selector: &Selector) -> Result<Option<String>>;

    /// Replace the inner markup of the first match.
    fn render(&mut self, selector: &Selector, html: &str) -> Result<()>;

    fn set_attribute(&mut self, selector: &Selector, name: &str, value: &str) -> Result<usize>;

    fn remove_attribute(&mut self, selector: &Selector, name: &str) -> Result<usize>;

    fn add_class(&mut self, selector: &Selector, classes: &[&str]) -> Result<usize>;

    fn remove_class(&mut self, selector: &Selector, classes: &[&str]) -> Result<usize>;

    /// The document as it stands, for undoing a multi-step edit.
    fn checkpoint(&self) -> String;

    /// Go back to a state returned by [`Page::checkpoint`].
    fn rollback(&mut self, checkpoint: String);
}

/// An HTML document held as text.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    source: String,
}

/// One parse of the page: the `tl` DOM plus the elements that are really
/// part of the document, in document order.
struct Scan<'a> {
    dom: tl::VDom<'a>,
    elements: Vec<Element>,
}

impl HtmlPage {
    pub fn parse<S: Into<String>>(source: S) -> Result<Self> {
        let page = Self {
            source: source.into(),
        };
        page.scan()?;
        Ok(page)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn into_string(self) -> String {
        self.source
    }

    fn scan(&self) -> Result<Scan<'_>> {
        let source = self.source.as_str();
        let dom = tl::parse(source, tl::ParserOptions::default())
            .map_err(|e| Error::Html(format!("{:?}", e)))?;
        let parser = dom.parser();

        let comments: Vec<(usize, usize)> = dom
            .nodes()
            .iter()
            .filter_map(|node| node.as_comment())
            .filter_map(|c| offset_in(source, c.as_bytes()).map(|at| (at, at + c.as_bytes().len())))
            .collect();

        let mut elements = Vec::new();
        // Content ranges of raw text elements; nothing inside them is markup
        let mut raw: Vec<(usize, usize)> = Vec::new();
        for (node, tag) in dom
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_tag().map(|t| (i, t)))
        {
            let (start, _) = tag.boundaries(parser);
            if raw.iter().any(|&(from, to)| start >= from && start < to) {
                continue;
            }
            // tl reads `<br/>` as a tag named `br/`
            let name = tag.name().as_utf8_str().trim_end_matches('/').to_ascii_lowercase();
            let attrs = source_ordered_attributes(source, tag);
            let open_end = open_tag_end(source, start, &name, tag);
            let self_closing = source[start..open_end].ends_with("/>");

            let close_start = if RAW_TEXT.contains(&name.as_str()) {
                let close = find_end_tag(source, open_end, &name).unwrap_or(source.len());
                raw.push((open_end, close));
                Some(close)
            } else {
                None
            };
            elements.push(Element {
                node,
                tag: name,
                attrs,
                start,
                open_end,
                close_start,
                self_closing,
            });
        }

        let ends = end_tags(source, &raw, &comments);
        close_elements(&mut elements, &ends, source.len());

        // Elements inside a template are not part of the document
        let inert: Vec<(usize, usize)> = elements
            .iter()
            .filter(|e| e.tag == INERT)
            .filter_map(|e| e.close_start.map(|close| (e.open_end, close)))
            .collect();
        elements.retain(|e| !inert.iter().any(|&(from, to)| e.start >= from && e.start < to));

        Ok(Scan { dom, elements })
    }

    /// Rewrite the opening tag of every match. `edit` returns whether it
    /// changed the attribute list.
    fn rewrite_open_tags<F>(&mut self, selector: &Selector, mut edit: F) -> Result<usize>
    where
        F: FnMut(&mut Vec<(String, Option<String>)>) -> bool,
    {
        let mut matches = self.select_all(selector)?;
        // Back to front so earlier offsets stay valid
        matches.sort_by_key(|e| std::cmp::Reverse(e.start));

        let mut touched = 0;
        for el in matches {
            let mut attrs = el.attrs.clone();
            if !edit(&mut attrs) {
                continue;
            }
            let open = build_open_tag(&el.tag, &attrs, el.self_closing);
            self.source.replace_range(el.start..el.open_end, &open);
            touched += 1;
        }
        Ok(touched)
    }
}

impl Scan<'_> {
    /// Nodes `tl` matches for one part of a selector.
    fn matching(&self, part: &Part) -> Result<HashSet<usize>> {
        Ok(match part {
            Part::Query(query) => self
                .dom
                .query_selector(query)
                .ok_or_else(|| Error::Selector(query.clone()))?
                .map(|handle| handle.get_inner() as usize)
                .collect(),
            Part::Id(id) => self
                .elements
                .iter()
                .filter(|e| e.attr("id") == Some(id.as_str()))
                .map(|e| e.node)
                .collect(),
        })
    }

    fn select(&self, selector: &Selector) -> Result<Vec<Element>> {
        let hits = selector
            .parts
            .iter()
            .map(|part| self.matching(part))
            .collect::<Result<Vec<_>>>()?;
        let Some((target, ancestors)) = hits.split_last() else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        for el in self.elements.iter().filter(|e| target.contains(&e.node)) {
            // Nearest ancestor first
            let mut chain: Vec<&Element> = self.elements.iter().filter(|a| a.contains(el)).collect();
            chain.sort_by_key(|a| std::cmp::Reverse(a.start));

            let mut pending = ancestors.iter().rev().peekable();
            for anc in chain {
                if pending.peek().is_some_and(|hits| hits.contains(&anc.node)) {
                    pending.next();
                }
            }
            if pending.peek().is_none() {
                found.push(el.clone());
            }
        }
        Ok(found)
    }
}

impl Page for HtmlPage {
    fn select_all(&self, selector: &Selector) -> Result<Vec<Element>> {
        self.scan()?.select(selector)
    }

    fn inner_html(&self, selector: &Selector) -> Result<Option<String>> {
        Ok(self.select(selector)?.and_then(|el| {
            el.close_start
                .map(|close| self.source[el.open_end..close].to_string())
        }))
    }

    fn render(&mut self, selector: &Selector, html: &str) -> Result<()> {
        let el = self
            .select(selector)?
            .ok_or_else(|| Error::MissingContainer(selector.to_string()))?;
        let close = el
            .close_start
            .ok_or_else(|| Error::NotAContainer(selector.to_string()))?;
        self.source.replace_range(el.open_end..close, html);
        Ok(())
    }

    fn set_attribute(&mut self, selector: &Selector, name: &str, value: &str) -> Result<usize> {
        let name = name.to_ascii_lowercase();
        let value = escape_attr(value);
        self.rewrite_open_tags(selector, |attrs| {
            match attrs.iter_mut().find(|(n, _)| *n == name) {
                Some((_, v)) if v.as_deref() == Some(value.as_str()) => false,
                Some((_, v)) => {
                    *v = Some(value.clone());
                    true
                }
                None => {
                    attrs.push((name.clone(), Some(value.clone())));
                    true
                }
            }
        })
    }

    fn remove_attribute(&mut self, selector: &Selector, name: &str) -> Result<usize> {
        let name = name.to_ascii_lowercase();
        self.rewrite_open_tags(selector, |attrs| {
            let before = attrs.len();
            attrs.retain(|(n, _)| *n != name);
            attrs.len() != before
        })
    }

    fn add_class(&mut self, selector: &Selector, classes: &[&str]) -> Result<usize> {
        self.rewrite_open_tags(selector, |attrs| {
            edit_class_list(attrs, |list| {
                let mut changed = false;
                for class in classes {
                    if !list.iter().any(|c| c == class) {
                        list.push((*class).to_string());
                        changed = true;
                    }
                }
                changed
            })
        })
    }

    fn remove_class(&mut self, selector: &Selector, classes: &[&str]) -> Result<usize> {
        self.rewrite_open_tags(selector, |attrs| {
            edit_class_list(attrs, |list| {
                let before = list.len();
                list.retain(|c| !classes.contains(&c.as_str()));
                list.len() != before
            })
        })
    }

    fn checkpoint(&self) -> String {
        self.source.clone()
    }

    fn rollback(&mut self, checkpoint: String) {
        self.source = checkpoint;
    }
}

/// Byte offset of a slice borrowed from `source`.
fn offset_in(source: &str, slice: &[u8]) -> Option<usize> {
    let base = source.as_ptr() as usize;
    let at = slice.as_ptr() as usize;
    (at >= base && at + slice.len() <= base + source.len()).then(|| at - base)
}

/// Attributes as `tl` read them, put back in source order.
fn source_ordered_attributes(source: &str, tag: &tl::HTMLTag<'_>) -> Vec<(String, Option<String>)> {
    let mut attrs: Vec<(usize, String, Option<String>)> = tag
        .attributes()
        .iter()
        .map(|(name, value)| {
            let at = offset_in(source, name.as_bytes())
                .or_else(|| value.as_ref().and_then(|v| offset_in(source, v.as_bytes())))
                .unwrap_or(usize::MAX);
            (at, name.to_ascii_lowercase(), value.map(|v| v.into_owned()))
        })
        .collect();
    attrs.sort_by_key(|(at, _, _)| *at);
    attrs.into_iter().map(|(_, name, value)| (name, value)).collect()
}

/// Offset just past the `>` of the opening tag. The search starts after the
/// last attribute `tl` read, so a `>` inside a quoted value is skipped.
fn open_tag_end(source: &str, start: usize, name: &str, tag: &tl::HTMLTag<'_>) -> usize {
    let floor = tag
        .attributes()
        .iter()
        .flat_map(|(key, value)| {
            let name_end = offset_in(source, key.as_bytes()).map(|at| at + key.len());
            let value_end = value
                .as_ref()
                .and_then(|v| offset_in(source, v.as_bytes()).map(|at| at + v.len()));
            [name_end, value_end]
        })
        .flatten()
        .max()
        .unwrap_or(start + 1 + name.len());
    source[floor..]
        .find('>')
        .map_or(source.len(), |gt| floor + gt + 1)
}

/// Where `</name` first appears at or after `from`, ignoring case.
fn find_end_tag(source: &str, from: usize, name: &str) -> Option<usize> {
    let bytes = source.as_bytes();
    let needle = name.as_bytes();
    (from..bytes.len().saturating_sub(1 + needle.len())).find(|&at| {
        bytes[at] == b'<'
            && bytes[at + 1] == b'/'
            && bytes[at + 2..at + 2 + needle.len()].eq_ignore_ascii_case(needle)
            && bytes
                .get(at + 2 + needle.len())
                .is_none_or(|b| !b.is_ascii_alphanumeric() && *b != b'-')
    })
}

/// Positions of every end tag outside raw text and comments, by tag name.
fn end_tags(source: &str, raw: &[(usize, usize)], comments: &[(usize, usize)]) -> HashMap<String, Vec<usize>> {
    let bytes = source.as_bytes();
    let mut ends: HashMap<String, Vec<usize>> = HashMap::new();
    for (at, _) in source.match_indices("</") {
        let hidden = raw.iter().any(|&(from, to)| at >= from && at <= to)
            || comments.iter().any(|&(from, to)| at >= from && at < to);
        if hidden {
            continue;
        }
        let len = bytes[at + 2..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-')
            .count();
        if len > 0 {
            let name = source[at + 2..at + 2 + len].to_ascii_lowercase();
            ends.entry(name).or_default().push(at);
        }
    }
    ends
}

/// Pair every element with its own end tag.
///
/// Elements are visited in document order with the stack of open ancestors,
/// so an end tag is only looked for inside the nearest ancestor. Nested
/// elements of the same name consume end tags first. An element whose end
/// tag is implied (`<li>a<li>b</ul>`) gets none and cannot hold content.
fn close_elements(elements: &mut [Element], ends: &HashMap<String, Vec<usize>>, len: usize) {
    let mut opens: HashMap<String, Vec<usize>> = HashMap::new();
    for el in elements.iter().filter(|e| !e.is_void()) {
        opens.entry(el.tag.clone()).or_default().push(el.start);
    }

    let mut stack: Vec<usize> = Vec::new();
    for el in elements.iter_mut() {
        while stack.last().is_some_and(|&close| close <= el.start) {
            stack.pop();
        }
        if el.close_start.is_none() && !el.is_void() {
            let limit = stack.last().copied().unwrap_or(len);
            el.close_start = matching_end(el, limit, &opens, ends);
        }
        if let Some(close) = el.close_start {
            stack.push(close);
        }
    }
}

fn matching_end(
    el: &Element,
    limit: usize,
    opens: &HashMap<String, Vec<usize>>,
    ends: &HashMap<String, Vec<usize>>,
) -> Option<usize> {
    let no_opens = Vec::new();
    let opens = opens.get(&el.tag).unwrap_or(&no_opens);
    let ends = ends.get(&el.tag)?;

    let mut nested = opens[opens.partition_point(|&at| at <= el.start)..]
        .iter()
        .peekable();
    let mut depth = 0usize;
    for &end in &ends[ends.partition_point(|&at| at < el.open_end)..] {
        if end >= limit {
            break;
        }
        while nested.next_if(|&&at| at < end).is_some() {
            depth += 1;
        }
        if depth == 0 {
            return Some(end);
        }
        depth -= 1;
    }
    None
}

fn edit_class_list<F>(attrs: &mut Vec<(String, Option<String>)>, edit: F) -> bool
where
    F: FnOnce(&mut Vec<String>) -> bool,
{
    let pos = attrs.iter().position(|(n, _)| n == "class");
    let mut list: Vec<String> = pos
        .and_then(|i| attrs[i].1.as_deref())
        .unwrap_or("")
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if !edit(&mut list) {
        return false;
    }
    let joined = Some(list.join(" "));
    match pos {
        Some(i) => attrs[i].1 = joined,
        None => attrs.push(("class".to_string(), joined)),
    }
    true
}

fn build_open_tag(tag: &str, attrs: &[(String, Option<String>)], self_closing: bool) -> String {
    let mut out = format!("<{}", tag);
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        if let Some(value) = value {
            out.push_str("=\"");
            out.push_str(&value.replace('"', "&quot;"));
            out.push('"');
        }
    }
    out.push_str(if self_closing { " />" } else { ">" });
    out
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
