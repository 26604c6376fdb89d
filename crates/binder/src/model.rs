//! Records decoded from the data files.
//!
//! Decoding is lenient the way the pages have always been: text fields
//! accept strings, numbers or booleans, empty values count as absent, and a
//! record that is not an object decodes with every field absent. Only a
//! top-level document of the wrong shape is rejected.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Records grouped by year key, e.g. news and teaching.
pub type YearMap<T> = BTreeMap<String, Vec<T>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tool {
    #[serde(deserialize_with = "text")]
    pub label: Option<String>,
    #[serde(deserialize_with = "text")]
    pub url: Option<String>,
    #[serde(deserialize_with = "text")]
    pub icon_type: Option<String>,
    #[serde(deserialize_with = "text")]
    pub icon_svg: Option<String>,
    #[serde(deserialize_with = "text")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewsItem {
    #[serde(deserialize_with = "text")]
    pub date: Option<String>,
    #[serde(deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "text")]
    pub desc: Option<String>,
    #[serde(deserialize_with = "text")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Position {
    #[serde(deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "text")]
    pub desc: Option<String>,
    #[serde(deserialize_with = "text")]
    pub url: Option<String>,
}

/// One accordion entry: a theme, project or thesis topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResearchItem {
    #[serde(deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "text")]
    pub desc: Option<String>,
    #[serde(deserialize_with = "text")]
    pub img: Option<String>,
}

/// `None` means the collection was present but not an array, which leaves
/// its accordion untouched. A missing collection renders empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchCollection {
    #[serde(default = "empty_records", deserialize_with = "records_or_empty")]
    pub themes: Option<Vec<ResearchItem>>,
    #[serde(default = "empty_records", deserialize_with = "records_or_empty")]
    pub projects: Option<Vec<ResearchItem>>,
    #[serde(default = "empty_records", deserialize_with = "records_or_empty")]
    pub thesis_topics: Option<Vec<ResearchItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Member {
    #[serde(deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub image: Option<String>,
    #[serde(deserialize_with = "text_list")]
    pub interests: Vec<String>,
    #[serde(deserialize_with = "text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "text")]
    pub building: Option<String>,
    #[serde(deserialize_with = "text")]
    pub room: Option<String>,
    #[serde(deserialize_with = "text")]
    pub profile_url: Option<String>,
}

/// `None` for a group that is missing or not an array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemberGroups {
    #[serde(deserialize_with = "records")]
    pub faculty: Option<Vec<Member>>,
    #[serde(deserialize_with = "records")]
    pub phd: Option<Vec<Member>>,
}

impl MemberGroups {
    /// Faculty first, then PhD students, each in source order.
    pub fn combined(&self) -> Vec<&Member> {
        self.faculty
            .iter()
            .flatten()
            .chain(self.phd.iter().flatten())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeachingCourse {
    #[serde(deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "text")]
    pub desc: Option<String>,
    #[serde(deserialize_with = "text")]
    pub url: Option<String>,
    #[serde(deserialize_with = "text")]
    pub icon: Option<String>,
    #[serde(deserialize_with = "text")]
    pub icon_color: Option<String>,
}

pub fn decode_tools(path: &str, value: Value) -> Result<Vec<Tool>> {
    decode_array(path, value)
}

pub fn decode_positions(path: &str, value: Value) -> Result<Vec<Position>> {
    decode_array(path, value)
}

pub fn decode_news(path: &str, value: Value) -> Result<YearMap<NewsItem>> {
    decode_year_map(path, value)
}

pub fn decode_teaching(path: &str, value: Value) -> Result<YearMap<TeachingCourse>> {
    decode_year_map(path, value)
}

pub fn decode_research(path: &str, value: Value) -> Result<ResearchCollection> {
    decode_object(path, value)
}

pub fn decode_members(path: &str, value: Value) -> Result<MemberGroups> {
    decode_object(path, value)
}

fn decode_array<T: DeserializeOwned + Default>(path: &str, value: Value) -> Result<Vec<T>> {
    match value {
        Value::Array(items) => Ok(items.into_iter().map(record).collect()),
        other => Err(Error::malformed(
            path,
            format!("expected an array, found {}", kind(&other)),
        )),
    }
}

fn decode_object<T: DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    if !value.is_object() {
        return Err(Error::malformed(
            path,
            format!("expected an object, found {}", kind(&value)),
        ));
    }
    serde_json::from_value(value).map_err(|e| Error::malformed(path, e))
}

/// Year keys map to record arrays; a non-array year is an empty list.
fn decode_year_map<T: DeserializeOwned + Default>(path: &str, value: Value) -> Result<YearMap<T>> {
    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(year, items)| {
                let items = match items {
                    Value::Array(items) => items.into_iter().map(record).collect(),
                    _ => Vec::new(),
                };
                (year, items)
            })
            .collect()),
        other => Err(Error::malformed(
            path,
            format!("expected an object keyed by year, found {}", kind(&other)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn record<T: DeserializeOwned + Default>(value: Value) -> T {
    if value.is_object() {
        serde_json::from_value(value).unwrap_or_default()
    } else {
        T::default()
    }
}

/// Text as the pages print it: falsy values are absent.
fn text_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(text_value(Value::deserialize(d)?))
}

fn text_list<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .map(|v| text_value(v).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

fn records<'de, D, T>(d: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => Some(items.into_iter().map(record).collect()),
        _ => None,
    })
}

/// Like `records`, but falsy values (null, `false`, `0`, `""`) count as an
/// empty collection.
fn records_or_empty<'de, D, T>(d: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => Some(items.into_iter().map(record).collect()),
        Value::Null | Value::Bool(false) => Some(Vec::new()),
        Value::Number(n) if n.as_f64() == Some(0.0) => Some(Vec::new()),
        Value::String(s) if s.is_empty() => Some(Vec::new()),
        _ => None,
    })
}

fn empty_records<T>() -> Option<Vec<T>> {
    Some(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_text_fields() {
        let tools = decode_tools(
            "data/tools.json",
            json!([
                {"label": "Git", "url": "https://git", "iconType": "svg", "iconSvg": "<svg/>"},
                {"label": "", "url": null},
                {"label": 42, "extra": {"ignored": true}},
                "not an object"
            ]),
        )
        .unwrap();
        assert_eq!(tools.len(), 4);
        assert_eq!(tools[0].icon_type.as_deref(), Some("svg"));
        assert_eq!(tools[0].icon_svg.as_deref(), Some("<svg/>"));
        assert_eq!(tools[1], Tool::default());
        assert_eq!(tools[2].label.as_deref(), Some("42"));
        assert_eq!(tools[3], Tool::default());
    }

    #[test]
    fn test_top_level_shape_is_checked() {
        let err = decode_tools("data/tools.json", json!({"a": 1})).unwrap_err();
        assert!(matches!(err, Error::MalformedData { .. }));
        assert!(err.to_string().contains("expected an array, found an object"));
        assert!(decode_news("data/news.json", json!([])).is_err());
        assert!(decode_members("data/members.json", json!(null)).is_err());
    }

    #[test]
    fn test_year_map_tolerates_non_arrays() {
        let news = decode_news(
            "data/news.json",
            json!({"2023": [{"title": "a"}, {"title": "b"}], "2022": "oops"}),
        )
        .unwrap();
        assert_eq!(news["2023"].len(), 2);
        assert_eq!(news["2023"][1].title.as_deref(), Some("b"));
        assert!(news["2022"].is_empty());
    }

    #[test]
    fn test_research_collections() {
        let research = decode_research(
            "data/research.json",
            json!({"themes": [{"title": "T"}], "projects": "bad", "thesisTopics": null}),
        )
        .unwrap();
        assert_eq!(research.themes.as_ref().map(Vec::len), Some(1));
        assert_eq!(research.projects, None);
        assert_eq!(research.thesis_topics, Some(Vec::new()));

        for falsy in [json!(""), json!(0), json!(false)] {
            let research = decode_research(
                "data/research.json",
                json!({"themes": falsy.clone(), "projects": falsy, "thesisTopics": 1}),
            )
            .unwrap();
            assert_eq!(research.themes, Some(Vec::new()));
            assert_eq!(research.projects, Some(Vec::new()));
            assert_eq!(research.thesis_topics, None);
        }
    }

    #[test]
    fn test_member_groups_combined_order() {
        let members = decode_members(
            "data/members.json",
            json!({
                "faculty": [{"name": "F1"}, {"name": "F2"}],
                "phd": [{"name": "P1", "interests": ["a", 3, null], "room": 101}]
            }),
        )
        .unwrap();
        let names: Vec<_> = members
            .combined()
            .iter()
            .map(|m| m.name.clone().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["F1", "F2", "P1"]);
        let p1 = &members.phd.as_ref().unwrap()[0];
        assert_eq!(p1.interests, vec!["a", "3", ""]);
        assert_eq!(p1.room.as_deref(), Some("101"));

        let only_phd = decode_members("data/members.json", json!({"phd": []})).unwrap();
        assert_eq!(only_phd.faculty, None);
        assert!(only_phd.combined().is_empty());
    }
}
