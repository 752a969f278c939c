//! One-shot classification of a whole directory, as used by the CLI.

use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::article::{ArticleKey, Category, Language};
use crate::classify::Classifier;
use crate::clustering::LanguageThresholds;
use crate::document::{parse_html, ParsedDocument};
use crate::store::ArticleStore;
use crate::util::{filename_only, list_files};
use crate::TARGET_ENGINE;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageArticles {
    pub lang_code: String,
    pub articles: Vec<ArticleKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsArticles {
    pub articles: Vec<ArticleKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryArticles {
    pub category: Category,
    pub articles: Vec<ArticleKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadArticles {
    pub title: String,
    pub articles: Vec<ArticleKey>,
}

/// Reads and parses every file below `dir` in parallel, sorted by key.
/// Unreadable or empty documents are skipped. When two files share a name
/// only the one with the smaller path is kept.
pub fn parse_directory(dir: &Path) -> Result<Vec<(ArticleKey, ParsedDocument)>> {
    let paths = list_files(dir)?;
    let mut documents: Vec<(ArticleKey, ParsedDocument)> = paths
        .par_iter()
        .filter_map(|path| {
            let key = filename_only(&path.to_string_lossy());
            match std::fs::read(path) {
                Ok(content) => parse_html(&String::from_utf8_lossy(&content)).map(|doc| (key, doc)),
                Err(e) => {
                    warn!(target: TARGET_ENGINE, "Skipping {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect();
    documents.sort_by(|a, b| a.0.cmp(&b.0));
    // Keys are file names, so the same name in two subdirectories collides
    documents.dedup_by(|later, kept| {
        let duplicate = later.0 == kept.0;
        if duplicate {
            warn!(target: TARGET_ENGINE, "Ignoring second file named {} in {}", later.0, dir.display());
        }
        duplicate
    });
    info!(
        target: TARGET_ENGINE,
        "Parsed {} of {} files in {}",
        documents.len(),
        paths.len(),
        dir.display()
    );
    Ok(documents)
}

/// English and Russian articles, in that order.
pub fn languages(classifier: &Classifier, dir: &Path) -> Result<Vec<LanguageArticles>> {
    let documents = parse_directory(dir)?;
    let detected: Vec<(ArticleKey, Language)> = documents
        .into_par_iter()
        .map(|(key, document)| {
            let language = classifier.detect_language(&document);
            (key, language)
        })
        .collect();

    Ok([Language::En, Language::Ru]
        .into_iter()
        .map(|language| LanguageArticles {
            lang_code: language.code().to_string(),
            articles: detected
                .iter()
                .filter(|(_, detected)| *detected == language)
                .map(|(key, _)| key.clone())
                .collect(),
        })
        .collect())
}

/// Articles in a supported language whose title reads like news.
pub fn news(classifier: &Classifier, dir: &Path) -> Result<NewsArticles> {
    let documents = parse_directory(dir)?;
    let articles = documents
        .into_par_iter()
        .filter(|(_, document)| classifier.news_language(document).is_some())
        .map(|(key, _)| key)
        .collect();
    Ok(NewsArticles { articles })
}

/// News articles grouped by category, every category present.
pub fn categories(classifier: &Classifier, dir: &Path) -> Result<Vec<CategoryArticles>> {
    let documents = parse_directory(dir)?;
    let classified: Vec<(ArticleKey, Category)> = documents
        .into_par_iter()
        .filter_map(|(key, document)| {
            classifier
                .classify(key, document)
                .map(|article| (article.key, article.category))
        })
        .collect();

    Ok(Category::ALL
        .into_iter()
        .map(|category| CategoryArticles {
            category,
            articles: classified
                .iter()
                .filter(|(_, c)| *c == category)
                .map(|(key, _)| key.clone())
                .collect(),
        })
        .collect())
}

/// News articles grouped into story threads, largest first.
pub fn threads(
    classifier: &Classifier,
    thresholds: LanguageThresholds,
    dir: &Path,
) -> Result<Vec<ThreadArticles>> {
    let documents = parse_directory(dir)?;
    let mut articles: Vec<_> = documents
        .into_par_iter()
        .filter_map(|(key, document)| classifier.classify(key, document))
        .collect();
    articles.sort_by(|a, b| a.key.cmp(&b.key));

    let mut store = ArticleStore::new(thresholds);
    for article in articles {
        store.add(article);
    }
    store.log_stats();

    let mut summaries: Vec<_> = store.summaries().collect();
    summaries.sort_by(|a, b| {
        b.articles
            .len()
            .cmp(&a.articles.len())
            .then_with(|| a.id.cmp(&b.id))
    });

    Ok(summaries
        .into_iter()
        .map(|summary| ThreadArticles {
            title: summary.title,
            articles: summary.articles,
        })
        .collect())
}
