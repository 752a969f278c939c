use std::collections::HashMap;
use tracing::{debug, info};

use crate::article::{Article, ArticleKey, Category, Language};
use crate::clustering::{extract_fingerprint, LanguageThresholds, StoryClusterer, ThreadId};
use crate::TARGET_ENGINE;

/// Aggregated view of one live thread
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSummary {
    pub id: ThreadId,
    pub title: String,
    pub category: Category,
    pub language: Language,
    pub last_published: i64,
    pub articles: Vec<ArticleKey>,
}

/// Holds every live article and keeps the story clusterer in step with it.
#[derive(Debug, Default)]
pub struct ArticleStore {
    articles: HashMap<ArticleKey, Article>,
    clusterer: StoryClusterer,
    last_published_overall: i64,
}

impl ArticleStore {
    pub fn new(thresholds: LanguageThresholds) -> Self {
        Self {
            articles: HashMap::new(),
            clusterer: StoryClusterer::new(thresholds),
            last_published_overall: 0,
        }
    }

    /// Registers a new article and places it into a thread.
    ///
    /// # Returns
    /// - `false` if an article with the same key is already stored.
    pub fn add(&mut self, mut article: Article) -> bool {
        if self.articles.contains_key(&article.key) {
            return false;
        }

        let fingerprint = extract_fingerprint(&article.body_tokens);
        let assignment = self
            .clusterer
            .assign(&article.key, article.language, fingerprint);
        article.thread_id = Some(assignment.thread_id);

        if article.published_time > self.last_published_overall {
            self.last_published_overall = article.published_time;
        }

        debug!(
            target: TARGET_ENGINE,
            "Stored {} ({}, {}) in thread {}",
            article.key,
            article.language,
            article.category,
            assignment.thread_id
        );
        self.articles.insert(article.key.clone(), article);
        true
    }

    /// Removes an article and its thread membership. Returns `false` for an
    /// unknown key.
    pub fn remove(&mut self, key: &str) -> bool {
        if self.articles.remove(key).is_none() {
            return false;
        }
        self.clusterer.remove(key);
        debug!(target: TARGET_ENGINE, "Removed {}", key);
        true
    }

    /// Replaces a known article. The article may land in a different thread.
    pub fn update(&mut self, article: Article) -> bool {
        if !self.remove(&article.key) {
            return false;
        }
        self.add(article)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.articles.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Article> {
        self.articles.get(key)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn thread_count(&self) -> usize {
        self.clusterer.thread_count()
    }

    /// Highest publication time ever accepted. Removals never lower it.
    pub fn last_published_overall(&self) -> i64 {
        self.last_published_overall
    }

    /// An article is stale once it lags the newest accepted one by more
    /// than `ttl` seconds.
    pub fn is_stale(&self, published_time: i64, ttl: i64) -> bool {
        self.last_published_overall > 0 && self.last_published_overall - published_time > ttl
    }

    pub fn clusterer(&self) -> &StoryClusterer {
        &self.clusterer
    }

    fn members(&self, thread_id: ThreadId) -> impl Iterator<Item = &Article> {
        self.clusterer
            .thread(thread_id)
            .into_iter()
            .flat_map(|thread| thread.members.iter())
            .filter_map(move |key| self.articles.get(key))
    }

    /// Title of the most recently published member; the smallest key wins
    /// ties.
    pub fn thread_title(&self, thread_id: ThreadId) -> Option<String> {
        let mut best: Option<&Article> = None;
        for article in self.members(thread_id) {
            // Members come in key order, so only a strictly newer one replaces
            if best.map_or(true, |b| article.published_time > b.published_time) {
                best = Some(article);
            }
        }
        best.map(|article| article.title.clone())
    }

    /// Majority category of the members. Ties follow `Category::ALL` order.
    pub fn thread_category(&self, thread_id: ThreadId) -> Option<Category> {
        let mut votes: HashMap<Category, usize> = HashMap::new();
        for article in self.members(thread_id) {
            *votes.entry(article.category).or_insert(0) += 1;
        }
        if votes.is_empty() {
            return None;
        }

        let mut winner = Category::Other;
        let mut top = 0;
        for category in Category::ALL {
            let count = votes.get(&category).copied().unwrap_or(0);
            if count > top {
                top = count;
                winner = category;
            }
        }
        Some(winner)
    }

    pub fn thread_language(&self, thread_id: ThreadId) -> Option<Language> {
        self.clusterer.thread(thread_id).map(|thread| thread.language)
    }

    pub fn thread_last_published(&self, thread_id: ThreadId) -> Option<i64> {
        self.members(thread_id)
            .map(|article| article.published_time)
            .max()
    }

    pub fn thread_articles(&self, thread_id: ThreadId) -> Vec<ArticleKey> {
        self.clusterer
            .thread(thread_id)
            .map(|thread| thread.members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn thread_summary(&self, thread_id: ThreadId) -> Option<ThreadSummary> {
        let thread = self.clusterer.thread(thread_id)?;
        Some(ThreadSummary {
            id: thread_id,
            title: self.thread_title(thread_id).unwrap_or_default(),
            category: self.thread_category(thread_id).unwrap_or_default(),
            language: thread.language,
            last_published: self.thread_last_published(thread_id).unwrap_or(0),
            articles: thread.members.iter().cloned().collect(),
        })
    }

    /// Summaries of every live thread in ascending id order.
    pub fn summaries(&self) -> impl Iterator<Item = ThreadSummary> + '_ {
        self.clusterer
            .threads()
            .filter_map(move |thread| self.thread_summary(thread.id))
    }

    pub fn log_stats(&self) {
        info!(
            target: TARGET_ENGINE,
            "Store holds {} articles in {} threads (newest publication {})",
            self.len(),
            self.thread_count(),
            self.last_published_overall
        );
    }
}
