//! Extraction of the fields the engine needs from an article's HTML.
//!
//! Input documents follow the Telegram instant-view export layout: metadata
//! in `<meta property=...>` tags, the headline in the first `<h1>`, and the
//! body spread over `<p>` elements.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use url::Url;

use crate::text::tokenize;

static META_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<meta\s([^>]*?)/?>").unwrap());
static ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)([a-z_:\-]+)\s*=\s*"([^"]*)""#).unwrap());
static H1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap());
static P_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p>").unwrap());
static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());

/// The structured view of one article document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    /// Epoch seconds, 0 if absent or unparseable.
    pub published_time: i64,
    pub short_url: String,
    pub title: String,
    pub title_tokens: Vec<String>,
    pub body_tokens: Vec<String>,
}

/// Parses raw HTML. Returns `None` when neither a headline nor any body
/// text can be found.
pub fn parse_html(raw: &str) -> Option<ParsedDocument> {
    let html = BR_RE.replace_all(raw, "\n");
    let metas = collect_meta_properties(&html);

    let published_time = metas
        .get("article:published_time")
        .map(|value| parse_published_time(value))
        .unwrap_or(0);
    let short_url = metas
        .get("og:url")
        .and_then(|value| short_url(value))
        .unwrap_or_default();

    let title = H1_RE
        .captures(&html)
        .map(|caps| clean_text(&caps[1]))
        .unwrap_or_default();

    let body = P_RE
        .captures_iter(&html)
        .map(|caps| clean_text(&caps[1]))
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if title.is_empty() && body.is_empty() {
        return None;
    }

    Some(ParsedDocument {
        published_time,
        short_url,
        title_tokens: tokenize(&title),
        title,
        body_tokens: tokenize(&body),
    })
}

fn collect_meta_properties(html: &str) -> HashMap<String, String> {
    let mut properties = HashMap::new();

    for meta in META_RE.captures_iter(html) {
        let attrs: HashMap<String, String> = ATTR_RE
            .captures_iter(&meta[1])
            .map(|caps| (caps[1].to_lowercase(), caps[2].to_string()))
            .collect();

        if let (Some(property), Some(content)) = (attrs.get("property"), attrs.get("content")) {
            properties
                .entry(property.clone())
                .or_insert_with(|| decode_entities(content));
        }
    }

    properties
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DDTHH:MM:SS`, which is read as UTC.
pub fn parse_published_time(value: &str) -> i64 {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.timestamp();
    }
    value
        .get(..19)
        .and_then(|prefix| NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M:%S").ok())
        .map(|naive| Utc.from_utc_datetime(&naive).timestamp())
        .unwrap_or(0)
}

fn short_url(value: &str) -> Option<String> {
    Url::parse(value.trim())
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

fn clean_text(fragment: &str) -> String {
    let stripped = TAG_RE.replace_all(fragment, "");
    decode_entities(stripped.trim())
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&laquo;", "«")
        .replace("&raquo;", "»")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
