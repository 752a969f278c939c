//! Language, news-worthiness and category classification of parsed documents.

pub mod category;
pub mod language;
pub mod news;

use anyhow::Result;
use tracing::debug;

pub use category::CategoryClassifier;
pub use language::LanguageDetector;
pub use news::NewsDetector;

use crate::article::{Article, ArticleKey, Language};
use crate::config::Config;
use crate::document::ParsedDocument;

pub const TARGET_CLASSIFY: &str = "classify";

/// Runs the three classifiers in order. Any rejection excludes the
/// document; nothing here is an error.
pub struct Classifier {
    pub language: LanguageDetector,
    pub news: NewsDetector,
    pub category: CategoryClassifier,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            language: LanguageDetector::default(),
            news: NewsDetector::new(),
            category: CategoryClassifier::default(),
        }
    }
}

impl Classifier {
    pub fn from_config(config: &Config) -> Result<Self> {
        let languages = &config.languages;
        let categories = &config.categories;

        let mut category = CategoryClassifier::new(categories.min_char_share)
            .with_min_token_count(Language::En, categories.min_token_count.en)
            .with_min_token_count(Language::Ru, categories.min_token_count.ru);
        category.load_keywords_file(Language::En, &categories.filename.en)?;
        category.load_keywords_file(Language::Ru, &categories.filename.ru)?;

        Ok(Self {
            language: LanguageDetector::new(languages.token_share, languages.en_common_share),
            news: NewsDetector::new(),
            category,
        })
    }

    pub fn detect_language(&self, document: &ParsedDocument) -> Language {
        self.language.detect(&document.body_tokens)
    }

    /// Language detection plus the news filter, as used by the news listing.
    pub fn news_language(&self, document: &ParsedDocument) -> Option<Language> {
        let language = self.detect_language(document);
        if language.is_supported() && self.news.is_news(&document.title_tokens, language) {
            Some(language)
        } else {
            None
        }
    }

    /// Full classification. Returns `None` for unsupported languages and
    /// non-news titles.
    pub fn classify(&self, key: impl Into<ArticleKey>, document: ParsedDocument) -> Option<Article> {
        let key = key.into();
        let Some(language) = self.news_language(&document) else {
            debug!(target: TARGET_CLASSIFY, "Rejected {}: not news or unsupported language", key);
            return None;
        };

        let mut article = Article::from_document(key, document);
        article.language = language;
        article.category = self.category.classify(&article.body_tokens, language);
        Some(article)
    }
}
