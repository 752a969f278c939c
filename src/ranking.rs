use serde::{Deserialize, Serialize};

use crate::article::{ArticleKey, Category, Language};
use crate::store::{ArticleStore, ThreadSummary};

/// Category selector of a ranking query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    Any,
    Only(Category),
    /// An unrecognised category name. Matches nothing.
    Unknown,
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::Any => true,
            CategoryFilter::Only(wanted) => *wanted == category,
            CategoryFilter::Unknown => false,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(s: &str) -> Self {
        let s = s.trim().to_lowercase();
        if s == "any" {
            return CategoryFilter::Any;
        }
        match Category::ALL.iter().find(|category| category.code() == s) {
            Some(category) => CategoryFilter::Only(*category),
            None => CategoryFilter::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankQuery {
    /// Window in seconds, measured back from `now`
    pub period: i64,
    pub language: Language,
    pub category: CategoryFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedThread {
    pub title: String,
    pub category: Category,
    pub articles: Vec<ArticleKey>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankResponse {
    pub threads: Vec<RankedThread>,
}

fn is_selected(summary: &ThreadSummary, query: &RankQuery, now: i64) -> bool {
    now - summary.last_published <= query.period
        && summary.language == query.language
        && query.category.matches(summary.category)
}

/// Live threads matching the query, largest first.
///
/// # Arguments
/// - `now`: reference time, normally the store's newest publication time.
pub fn rank_threads(store: &ArticleStore, query: &RankQuery, now: i64) -> RankResponse {
    let mut selected: Vec<ThreadSummary> = store
        .summaries()
        .filter(|summary| is_selected(summary, query, now))
        .collect();

    selected.sort_by(|a, b| {
        b.articles
            .len()
            .cmp(&a.articles.len())
            .then_with(|| a.id.cmp(&b.id))
    });

    RankResponse {
        threads: selected
            .into_iter()
            .map(|summary| RankedThread {
                title: summary.title,
                category: summary.category,
                articles: summary.articles,
            })
            .collect(),
    }
}
