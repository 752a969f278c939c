//! The shared engine: classifier, article store and document repository.
//!
//! Parsing and classification run on the blocking pool, outside the lock.
//! Mutations (including the file writes that go with them) hold the write lock
//! for their whole duration; ranking holds the read lock.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::article::{Article, ArticleKey, Language};
use crate::batch::parse_directory;
use crate::classify::Classifier;
use crate::config::Config;
use crate::document::parse_html;
use crate::ranking::{rank_threads, CategoryFilter, RankQuery};
use crate::storage::DocumentRepository;
use crate::store::ArticleStore;
use crate::util::{filename_only, now_epoch, to_json_pretty};
use crate::TARGET_ENGINE;

/// Outcome of an engine command, mapped one to one onto HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Created,
    NoContent,
    NotFound,
    InternalError,
    Unavailable,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::NoContent => 204,
            Status::NotFound => 404,
            Status::InternalError => 500,
            Status::Unavailable => 503,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Reference time used to decide whether a thread is inside the ranking
/// period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankClock {
    /// Wall-clock time of the request
    #[default]
    Wall,
    /// Newest publication time the store has accepted
    Newest,
}

/// Everything guarded by the engine lock.
#[derive(Debug)]
pub struct EngineState {
    pub store: ArticleStore,
    pub repository: DocumentRepository,
}

pub struct Engine {
    classifier: Classifier,
    state: RwLock<EngineState>,
    json_indent: usize,
    rank_clock: RankClock,
}

impl Engine {
    pub fn new(classifier: Classifier, store: ArticleStore, repository: DocumentRepository) -> Self {
        Self {
            classifier,
            state: RwLock::new(EngineState { store, repository }),
            json_indent: 2,
            rank_clock: RankClock::Wall,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let classifier = Classifier::from_config(config)?;
        let store = ArticleStore::new(config.clustering);
        let repository = DocumentRepository::new(&config.server.index_dir);
        Ok(Self::new(classifier, store, repository)
            .with_json_indent(config.json_indent)
            .with_rank_clock(config.server.rank_clock))
    }

    pub fn with_json_indent(mut self, indent: usize) -> Self {
        self.json_indent = indent;
        self
    }

    pub fn with_rank_clock(mut self, clock: RankClock) -> Self {
        self.rank_clock = clock;
        self
    }

    pub fn state(&self) -> &RwLock<EngineState> {
        &self.state
    }

    /// Parses and classifies raw content once. Returns the publication time
    /// (0 when there is none) and the article, `None` when the document is
    /// excluded from the store.
    fn prepare(&self, key: &str, content: &[u8]) -> (i64, Option<Article>) {
        let raw = String::from_utf8_lossy(content);
        let Some(document) = parse_html(&raw) else {
            debug!(target: TARGET_ENGINE, "Could not extract any text from {}", key);
            return (0, None);
        };
        let published_time = document.published_time;
        (published_time, self.classifier.classify(key, document))
    }

    /// Loads every file of the index directory.
    ///
    /// Files are parsed and classified in parallel; registration happens in
    /// one critical section in key order so the resulting threads do not
    /// depend on scheduling.
    pub async fn load_index(self: &Arc<Self>) -> Result<usize> {
        let engine = Arc::clone(self);
        tokio::task::spawn_blocking(move || -> Result<usize> {
            let root = engine.state.blocking_read().repository.root().to_path_buf();
            let articles = engine.classify_directory(&root)?;

            let mut state = engine.state.blocking_write();
            let mut loaded = 0;
            for article in articles {
                let key = article.key.clone();
                if state.store.add(article) {
                    loaded += 1;
                } else {
                    warn!(target: TARGET_ENGINE, "Skipping duplicate key {}", key);
                }
            }
            info!(
                target: TARGET_ENGINE,
                "Loaded {} articles from {}",
                loaded,
                root.display()
            );
            state.store.log_stats();
            Ok(loaded)
        })
        .await
        .context("Index loading task failed")?
    }

    /// Classifies every parsed file of `dir` in parallel, keeping key order.
    fn classify_directory(&self, dir: &Path) -> Result<Vec<Article>> {
        if !dir.exists() {
            warn!(target: TARGET_ENGINE, "{} does not exist, nothing to load", dir.display());
            return Ok(Vec::new());
        }
        Ok(parse_directory(dir)?
            .into_par_iter()
            .filter_map(|(key, document)| self.classifier.classify(key, document))
            .collect())
    }

    /// Indexes or re-indexes one document.
    ///
    /// # Arguments
    /// * `key` - Article key; any directory part is dropped.
    /// * `ttl` - Seconds an article may lag behind the newest one before it is
    ///   considered stale.
    /// * `content` - Raw HTML.
    ///
    /// # Returns
    /// `Created` for a newly stored article, `NoContent` for updates, stale
    /// or rejected content, `InternalError` when the content file could not
    /// be written or deleted.
    pub async fn index(self: &Arc<Self>, key: &str, ttl: i64, content: Vec<u8>) -> Status {
        let key = filename_only(key);
        let engine = Arc::clone(self);
        let task_key = key.clone();
        let prepared = tokio::task::spawn_blocking(move || {
            let (published_time, article) = engine.prepare(&task_key, &content);
            (published_time, article, content)
        })
        .await;
        let (published_time, article, content) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                error!(target: TARGET_ENGINE, "Preparing {} failed: {:?}", key, e);
                return Status::InternalError;
            }
        };

        let mut state = self.state.write().await;
        let known = state.store.exists(&key);
        let stale = state.store.is_stale(published_time, ttl);

        if known && (stale || article.is_none()) {
            state.store.remove(&key);
            info!(
                target: TARGET_ENGINE,
                "Dropped {} on re-index ({})",
                key,
                if stale { "stale" } else { "rejected" }
            );
            return match state.repository.remove(&key).await {
                Ok(()) => Status::NoContent,
                Err(e) => {
                    error!(target: TARGET_ENGINE, "{:?}", e);
                    Status::InternalError
                }
            };
        }

        if stale {
            debug!(target: TARGET_ENGINE, "Ignoring stale {}", key);
            return Status::NoContent;
        }

        let Some(article) = article else {
            return Status::NoContent;
        };

        let status = if known {
            state.store.update(article);
            Status::NoContent
        } else {
            state.store.add(article);
            Status::Created
        };

        match state.repository.save(&key, &content).await {
            Ok(()) => {
                debug!(target: TARGET_ENGINE, "Indexed {} -> {}", key, status);
                status
            }
            Err(e) => {
                error!(target: TARGET_ENGINE, "{:?}", e);
                Status::InternalError
            }
        }
    }

    /// Removes a stored article and its content file.
    pub async fn remove(&self, key: &str) -> Status {
        let key = filename_only(key);
        let mut state = self.state.write().await;
        if !state.store.remove(&key) {
            return Status::NotFound;
        }
        match state.repository.remove(&key).await {
            Ok(()) => {
                info!(target: TARGET_ENGINE, "Removed {}", key);
                Status::NoContent
            }
            Err(e) => {
                error!(target: TARGET_ENGINE, "{:?}", e);
                Status::InternalError
            }
        }
    }

    /// Ranks the live threads and renders them as JSON.
    pub async fn rank(&self, period: i64, language: &str, category: &str) -> (Status, String) {
        let query = RankQuery {
            period,
            language: Language::from(language),
            category: CategoryFilter::from(category),
        };

        let state = self.state.read().await;
        let now = match self.rank_clock {
            RankClock::Wall => now_epoch(),
            RankClock::Newest => state.store.last_published_overall(),
        };
        let response = rank_threads(&state.store, &query, now);
        drop(state);

        match to_json_pretty(&response, self.json_indent) {
            Ok(body) => (Status::Ok, body),
            Err(e) => {
                error!(target: TARGET_ENGINE, "{:?}", e);
                (Status::InternalError, String::new())
            }
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.state.read().await.store.exists(&filename_only(key))
    }

    pub async fn article_count(&self) -> usize {
        self.state.read().await.store.len()
    }

    pub async fn keys(&self) -> Vec<ArticleKey> {
        let state = self.state.read().await;
        let mut keys: Vec<ArticleKey> = state
            .store
            .summaries()
            .flat_map(|summary| summary.articles)
            .collect();
        keys.sort();
        keys
    }
}
