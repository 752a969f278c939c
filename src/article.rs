use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clustering::ThreadId;
use crate::document::ParsedDocument;

/// Article keys are the file name part of the source path (e.g. `1234.html`).
pub type ArticleKey = String;

/// Language of an article. Only `En` and `Ru` articles are ever clustered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ru,
    Other,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
            Language::Other => "other",
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Language::En | Language::Ru)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "en" => Language::En,
            "ru" => Language::Ru,
            _ => Language::Other,
        }
    }
}

/// Topical category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Society,
    Economy,
    Technology,
    Sports,
    Entertainment,
    Science,
    Other,
}

impl Category {
    /// Fixed output order used by the batch category partition.
    pub const ALL: [Category; 7] = [
        Category::Society,
        Category::Economy,
        Category::Technology,
        Category::Sports,
        Category::Entertainment,
        Category::Science,
        Category::Other,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Category::Society => "society",
            Category::Economy => "economy",
            Category::Technology => "technology",
            Category::Sports => "sports",
            Category::Entertainment => "entertainment",
            Category::Science => "science",
            Category::Other => "other",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "society" => Category::Society,
            "economy" => Category::Economy,
            "technology" => Category::Technology,
            "sports" => Category::Sports,
            "entertainment" => Category::Entertainment,
            "science" => Category::Science,
            _ => Category::Other,
        }
    }
}

/// A classified news article as held by the lifecycle store.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub key: ArticleKey,
    /// Epoch seconds, 0 when the document carried no publication time.
    pub published_time: i64,
    pub short_url: String,
    pub title: String,
    pub title_tokens: Vec<String>,
    pub body_tokens: Vec<String>,
    pub language: Language,
    pub category: Category,
    /// Set by the store when the article is registered.
    pub thread_id: Option<ThreadId>,
}

impl Article {
    /// Builds an unclassified article from a parsed document.
    pub fn from_document(key: impl Into<ArticleKey>, document: ParsedDocument) -> Self {
        Self {
            key: key.into(),
            published_time: document.published_time,
            short_url: document.short_url,
            title: document.title,
            title_tokens: document.title_tokens,
            body_tokens: document.body_tokens,
            language: Language::Other,
            category: Category::Other,
            thread_id: None,
        }
    }
}
