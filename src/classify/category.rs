use anyhow::{Context, Result};
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use super::TARGET_CLASSIFY;
use crate::article::{Category, Language};
use crate::text::{token_type, TokenType};

/// Keyword-vote category classifier.
///
/// Keyword files are plain text: a line holding a single word names the
/// category for the lines that follow, every other line lists keywords.
/// Keywords are stemmed on load and matched as prefixes of body tokens.
pub struct CategoryClassifier {
    // Stemmed keyword -> category, kept sorted so prefix matching is deterministic
    keywords: HashMap<Language, Vec<(String, Category)>>,
    min_char_share: f64,
    min_token_count: HashMap<Language, usize>,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self {
            keywords: HashMap::new(),
            min_char_share: 0.6,
            min_token_count: HashMap::new(),
        }
    }
}

impl CategoryClassifier {
    pub fn new(min_char_share: f64) -> Self {
        Self {
            min_char_share,
            ..Self::default()
        }
    }

    pub fn with_min_token_count(mut self, language: Language, count: usize) -> Self {
        self.min_token_count.insert(language, count);
        self
    }

    /// Loads the keyword list for `language` from a file. A missing file is
    /// logged and leaves the language without keywords (everything `other`).
    pub fn load_keywords_file(&mut self, language: Language, path: &Path) -> Result<()> {
        if !path.exists() {
            warn!(
                target: TARGET_CLASSIFY,
                "Category keyword file {} not found, {} articles will be classified as other",
                path.display(),
                language
            );
            return Ok(());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword file {}", path.display()))?;
        let count = self.load_keywords(language, &text);
        info!(
            target: TARGET_CLASSIFY,
            "Loaded {} {} category keywords from {}", count, language, path.display()
        );
        Ok(())
    }

    /// Parses keyword text for `language`, returning the number of keywords added.
    pub fn load_keywords(&mut self, language: Language, text: &str) -> usize {
        let stemmer = match language {
            Language::En => Stemmer::create(Algorithm::English),
            Language::Ru => Stemmer::create(Algorithm::Russian),
            Language::Other => return 0,
        };

        let entries = self.keywords.entry(language).or_default();
        let mut current: Option<Category> = None;
        let mut added = 0;

        for line in text.lines() {
            let words: Vec<&str> = line.split_whitespace().collect();
            match words.as_slice() {
                [] => {}
                [name] => current = Some(Category::from(*name)),
                keywords => {
                    let Some(category) = current else { continue };
                    for keyword in keywords {
                        let stem = stemmer.stem(&keyword.to_lowercase()).to_string();
                        entries.push((stem, category));
                        added += 1;
                    }
                }
            }
        }

        entries.sort();
        entries.dedup_by(|a, b| a.0 == b.0);
        added
    }

    pub fn classify(&self, tokens: &[String], language: Language) -> Category {
        let Some(keywords) = self.keywords.get(&language) else {
            return Category::Other;
        };
        let script = match language {
            Language::En => TokenType::Latin,
            Language::Ru => TokenType::Cyrillic,
            Language::Other => return Category::Other,
        };

        let mut votes: HashMap<Category, usize> = HashMap::new();

        for token in tokens {
            if token_type(token) != script {
                continue;
            }
            let token = token.to_lowercase();
            let min_keyword_len = token.chars().count() as f64 * self.min_char_share;

            let found = keywords.iter().find(|(keyword, _)| {
                keyword.chars().count() as f64 >= min_keyword_len && token.starts_with(keyword)
            });

            if let Some((_, category)) = found {
                *votes.entry(*category).or_insert(0) += 1;
            }
        }

        // Ties go to the category listed first in the fixed enumeration.
        let best = Category::ALL
            .iter()
            .filter_map(|category| votes.get(category).map(|count| (*category, *count)))
            .fold(None, |best: Option<(Category, usize)>, (category, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((category, count)),
            });

        let threshold = self.min_token_count.get(&language).copied().unwrap_or(0);
        match best {
            Some((category, count)) if count > threshold => category,
            _ => Category::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokenize;

    const EN_KEYWORDS: &str = "sports\n\
        football match championship team\n\
        economy\n\
        market inflation bank\n";

    fn classifier() -> CategoryClassifier {
        let mut classifier = CategoryClassifier::new(0.6).with_min_token_count(Language::En, 1);
        classifier.load_keywords(Language::En, EN_KEYWORDS);
        classifier
    }

    #[test]
    fn test_keyword_votes_pick_category() {
        let tokens = tokenize("The team won the championship after a tense football match.");
        assert_eq!(classifier().classify(&tokens, Language::En), Category::Sports);
    }

    #[test]
    fn test_stemmed_prefix_matches_inflections() {
        let tokens = tokenize("Markets fell as inflation worries hit banks.");
        assert_eq!(classifier().classify(&tokens, Language::En), Category::Economy);
    }

    #[test]
    fn test_below_threshold_is_other() {
        let tokens = tokenize("A football fan waved from the stands.");
        assert_eq!(classifier().classify(&tokens, Language::En), Category::Other);
    }

    #[test]
    fn test_short_keyword_does_not_match_long_token() {
        let mut classifier = CategoryClassifier::new(0.6);
        classifier.load_keywords(Language::En, "science\nlab laboratory\n");
        // "lab" covers less than 60% of the 9-char "labyrinth"
        let tokens = tokenize("labyrinth labyrinth labyrinth");
        assert_eq!(classifier.classify(&tokens, Language::En), Category::Other);
    }

    #[test]
    fn test_unknown_language_is_other() {
        let tokens = tokenize("football match championship");
        assert_eq!(classifier().classify(&tokens, Language::Ru), Category::Other);
    }
}
