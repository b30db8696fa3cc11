//! Metadata extraction from article sources.
//!
//! Two authoring conventions exist:
//!
//! ```text
//! ---                                  <meta title="诗" date="2025-12-05" tags="随笔，古诗" />
//! title: 开篇                           body...
//! date: 2025-11-25
//! tags: [随笔]
//! ---
//! body...
//! ```
//!
//! [`detect`] looks at the start of the text and picks exactly one
//! [`Strategy`]; only that strategy's parser ever runs.

use chrono::{FixedOffset, TimeZone};
use regex::Regex;
use serde_yaml::Value;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("front matter block is not terminated by a `---` line")]
    Unterminated,

    #[error("invalid front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front matter is not a key/value block")]
    NotAMapping,
}

/// Metadata as written by the author, before any derivation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub cover: String,
    pub date: String,
    pub tags: Vec<String>,
    /// Author-supplied preview, only available from inline tags.
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Leading `---` delimited `key: value` block.
    FrontMatter,
    /// Leading self-closing tag with `key="value"` attributes.
    InlineTag,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();
static INLINE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
static DATE_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?ms)\A---[ \t]*\r?\n(.*?)^---[ \t]*\r?$\n?(.*)\z").unwrap()
    })
}

fn inline_tag_regex() -> &'static Regex {
    INLINE_TAG_REGEX
        .get_or_init(|| Regex::new(r#"\A\s*<[A-Za-z][\w:-]*((?:"[^"]*"|[^">])*)/>"#).unwrap())
}

fn attribute_regex() -> &'static Regex {
    ATTRIBUTE_REGEX.get_or_init(|| Regex::new(r#"([A-Za-z_][\w-]*)\s*=\s*"([^"]*)""#).unwrap())
}

fn date_regex() -> &'static Regex {
    DATE_REGEX.get_or_init(|| {
        Regex::new(
            r"\A(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[T ](\d{1,2}):(\d{2})(?::(\d{2}))?(?:\.\d+)?\s*(Z|[+-]\d{2}:?\d{2})?)?\z",
        )
        .unwrap()
    })
}

fn strip_bom(raw: &str) -> &str {
    raw.strip_prefix('\u{feff}').unwrap_or(raw)
}

/// `raw` from its first non-blank line on.
fn leading_content(raw: &str) -> &str {
    let mut rest = strip_bom(raw);
    while let Some(end) = rest.find('\n') {
        if !rest[..end].trim().is_empty() {
            break;
        }
        rest = &rest[end + 1..];
    }
    rest
}

/// Decide which convention `raw` is written in, if any.
pub fn detect(raw: &str) -> Option<Strategy> {
    let raw = leading_content(raw);
    let first_line = raw.lines().next().unwrap_or_default();
    if first_line.trim_end() == "---" {
        Some(Strategy::FrontMatter)
    } else if inline_tag_regex().is_match(raw) {
        Some(Strategy::InlineTag)
    } else {
        None
    }
}

impl Strategy {
    /// Split `raw` into its metadata and the remaining body.
    pub fn extract(self, raw: &str) -> Result<(Metadata, String), ExtractError> {
        let raw = leading_content(raw);
        match self {
            Strategy::FrontMatter => parse_front_matter(raw),
            Strategy::InlineTag => Ok(parse_inline_tag(raw)),
        }
    }
}

/// Extract with whichever strategy matches; with no match the whole text
/// is body and every field keeps its default.
pub fn extract(raw: &str) -> Result<(Option<Strategy>, Metadata, String), ExtractError> {
    match detect(raw) {
        Some(strategy) => {
            let (metadata, body) = strategy.extract(raw)?;
            Ok((Some(strategy), metadata, body))
        }
        None => Ok((None, Metadata::default(), strip_bom(raw).to_string())),
    }
}

fn parse_front_matter(raw: &str) -> Result<(Metadata, String), ExtractError> {
    let caps = frontmatter_regex()
        .captures(raw)
        .ok_or(ExtractError::Unterminated)?;
    let block = caps.get(1).map_or("", |m| m.as_str());
    let body = caps.get(2).map_or("", |m| m.as_str());

    let value: Value = if block.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(block)?
    };
    if !matches!(value, Value::Mapping(_) | Value::Null) {
        return Err(ExtractError::NotAMapping);
    }

    let field = |key: &str| {
        value
            .get(key)
            .and_then(scalar_string)
            .filter(|s| !s.is_empty())
    };

    let metadata = Metadata {
        title: field("title").unwrap_or_default(),
        cover: field("cover").or_else(|| field("image")).unwrap_or_default(),
        date: field("date").unwrap_or_default(),
        tags: value.get("tags").map(tag_list).unwrap_or_default(),
        desc: None,
    };

    Ok((metadata, body.to_string()))
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        _ => None,
    }
}

fn tag_list(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .filter_map(scalar_string)
            .filter(|t| !t.is_empty())
            .collect(),
        other => scalar_string(other)
            .map(|s| split_tags(&s, &[',', '，']))
            .unwrap_or_default(),
    }
}

fn split_tags(s: &str, separators: &[char]) -> Vec<String> {
    s.split(separators)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_inline_tag(raw: &str) -> (Metadata, String) {
    let Some(caps) = inline_tag_regex().captures(raw) else {
        return (Metadata::default(), raw.to_string());
    };
    let attributes = caps.get(1).map_or("", |m| m.as_str());
    let body = &raw[caps.get(0).map_or(0, |m| m.end())..];

    let mut metadata = Metadata::default();
    for (key, value) in attributes_of(attributes) {
        match key {
            "title" => metadata.title = value.trim().to_string(),
            "cover" => metadata.cover = value.trim().to_string(),
            "date" => metadata.date = value.trim().to_string(),
            "tags" => metadata.tags = split_tags(value, &['，']),
            "desc" if !value.trim().is_empty() => metadata.desc = Some(value.to_string()),
            _ => {}
        }
    }

    (metadata, body.to_string())
}

fn attributes_of(tag: &str) -> impl Iterator<Item = (&str, &str)> {
    attribute_regex().captures_iter(tag).filter_map(|caps| {
        let key = caps.get(1)?.as_str();
        let value = caps.get(2)?.as_str();
        Some((key, value))
    })
}

/// Bring recognised calendar dates into `YYYY-MM-DD` (plus `THH:MM:SS`
/// when a time was given) so that string order matches calendar order.
/// Times carrying a `Z` or `±HH:MM` offset are converted to UTC; times
/// without one are taken as UTC already.
pub fn normalize_date(raw: &str) -> Option<String> {
    let caps = date_regex().captures(raw.trim())?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let date = chrono::NaiveDate::from_ymd_opt(year, num(2)?, num(3)?)?;

    match num(4) {
        None => Some(date.format("%Y-%m-%d").to_string()),
        Some(hour) => {
            let time = chrono::NaiveTime::from_hms_opt(hour, num(5)?, num(6).unwrap_or(0))?;
            let mut at = date.and_time(time);
            if let Some(offset) = caps.get(7) {
                at = parse_offset(offset.as_str())?
                    .from_local_datetime(&at)
                    .single()?
                    .naive_utc();
            }
            Some(at.format("%Y-%m-%dT%H:%M:%S").to_string())
        }
    }
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    if raw == "Z" {
        return FixedOffset::east_opt(0);
    }
    let sign = if raw.starts_with('-') { -1 } else { 1 };
    let digits: String = raw[1..].chars().filter(|c| *c != ':').collect();
    let hours: i32 = digits.get(..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..)?.parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
