use tracing::trace;
use whatlang::Lang;

use super::TARGET_CLASSIFY;
use crate::article::Language;
use crate::text::{token_type, TokenType};

/// English function words whose share separates English prose from other
/// Latin-script languages.
const EN_COMMON_WORDS: &[&str] = &["an", "and", "in", "of", "on", "the", "that", "to", "is"];

pub struct LanguageDetector {
    // Share of word tokens that must be in the language's script
    token_share: f64,
    // Share of English function words among all word tokens
    en_common_share: f64,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new(0.6, 0.05)
    }
}

impl LanguageDetector {
    pub fn new(token_share: f64, en_common_share: f64) -> Self {
        Self {
            token_share,
            en_common_share,
        }
    }

    pub fn detect(&self, tokens: &[String]) -> Language {
        let mut latin = 0usize;
        let mut cyrillic = 0usize;
        let mut words = 0usize;

        for token in tokens {
            match token_type(token) {
                TokenType::Latin => latin += 1,
                TokenType::Cyrillic => cyrillic += 1,
                _ => {}
            }
            if !matches!(token_type(token), TokenType::Number | TokenType::Punctuation) {
                words += 1;
            }
        }

        if words == 0 {
            return Language::Other;
        }

        let min_share = words as f64 * self.token_share;

        let language = if latin as f64 > min_share {
            if self.is_english(tokens, words) {
                Language::En
            } else {
                Language::Other
            }
        } else if (latin + cyrillic) as f64 > min_share && cyrillic > 0 {
            if self.is_russian(tokens) {
                Language::Ru
            } else {
                Language::Other
            }
        } else {
            Language::Other
        };

        trace!(
            target: TARGET_CLASSIFY,
            "Detected {} (latin={}, cyrillic={}, words={})", language, latin, cyrillic, words
        );
        language
    }

    fn is_english(&self, tokens: &[String], words: usize) -> bool {
        let common = tokens
            .iter()
            .filter(|token| EN_COMMON_WORDS.contains(&token.to_lowercase().as_str()))
            .count();
        common as f64 / words as f64 > self.en_common_share
    }

    // Cyrillic script alone does not mean Russian, so the trigram model
    // separates it from Ukrainian, Bulgarian and the rest.
    fn is_russian(&self, tokens: &[String]) -> bool {
        let text = tokens
            .iter()
            .filter(|token| token_type(token) == TokenType::Cyrillic)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        whatlang::detect(&text).map_or(false, |info| info.lang() == Lang::Rus)
    }
}
