use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::article::{ArticleKey, Language};

/// Thread ids increase monotonically and are never reused.
pub type ThreadId = u64;

/// Set of proper-noun-like tokens used as the similarity signal.
pub type Fingerprint = BTreeSet<String>;

/// Matching thresholds for one language
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterThresholds {
    /// Minimum number of fingerprint tokens two articles must share
    #[serde(alias = "min_similar_token_count")]
    pub min_shared_tokens: usize,
    /// Jaccard similarity must be strictly greater than this
    pub min_similarity: f64,
}

impl Default for ClusterThresholds {
    fn default() -> Self {
        Self {
            min_shared_tokens: 2,
            min_similarity: 0.2,
        }
    }
}

/// Per-language thresholds. Articles in `Language::Other` never match.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageThresholds {
    pub en: ClusterThresholds,
    pub ru: ClusterThresholds,
}

impl LanguageThresholds {
    pub fn uniform(thresholds: ClusterThresholds) -> Self {
        Self {
            en: thresholds,
            ru: thresholds,
        }
    }

    pub fn for_language(&self, language: Language) -> Option<&ClusterThresholds> {
        match language {
            Language::En => Some(&self.en),
            Language::Ru => Some(&self.ru),
            Language::Other => None,
        }
    }
}

/// Members of one story thread. Aggregates like title and category are
/// derived from the member articles by the lifecycle store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryThread {
    pub id: ThreadId,
    pub language: Language,
    pub members: BTreeSet<ArticleKey>,
}

/// Outcome of placing an article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub thread_id: ThreadId,
    pub created: bool,
}
