//! Tokenization of raw article text into word and punctuation units.

use unicode_segmentation::UnicodeSegmentation;

/// Coarse classification of a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Latin,
    Cyrillic,
    Number,
    Punctuation,
    Other,
}

/// Splits text into words and punctuation marks. Whitespace is dropped and
/// every punctuation character becomes its own token.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for segment in text.split_word_bounds() {
        if segment.chars().all(char::is_whitespace) {
            continue;
        }

        if segment.chars().any(is_punctuation_char) {
            // Flush word runs around any punctuation the segmenter kept inside a segment.
            let mut word = String::new();
            for c in segment.chars() {
                if is_punctuation_char(c) {
                    if !word.is_empty() {
                        tokens.push(std::mem::take(&mut word));
                    }
                    tokens.push(c.to_string());
                } else if !c.is_whitespace() {
                    word.push(c);
                }
            }
            if !word.is_empty() {
                tokens.push(word);
            }
        } else {
            tokens.push(segment.to_string());
        }
    }

    tokens
}

fn is_punctuation_char(c: char) -> bool {
    // Apostrophes inside words ("don't") are left to the segmenter.
    !c.is_alphanumeric() && !c.is_whitespace() && c != '\'' && c != '’'
}

pub fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_cyrillic_letter(c: char) -> bool {
    matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

/// True when the first character is an uppercase Latin or Cyrillic letter.
pub fn starts_uppercase(token: &str) -> bool {
    matches!(token.chars().next(), Some('A'..='Z' | 'А'..='Я' | 'Ё'))
}

pub fn token_type(token: &str) -> TokenType {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (None, _) => return TokenType::Other,
        (Some(c), None) if !c.is_alphanumeric() => return TokenType::Punctuation,
        _ => {}
    }

    if token.chars().all(is_latin_letter) {
        TokenType::Latin
    } else if token.chars().all(is_cyrillic_letter) {
        TokenType::Cyrillic
    } else if token.chars().all(|c| c.is_ascii_digit()) {
        TokenType::Number
    } else {
        TokenType::Other
    }
}

/// Lowercases only the first character, which is how title words are
/// compared against stopword lists.
pub fn lowercase_first(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_punctuation() {
        assert_eq!(
            tokenize("Senate passes bill, again. \"Finally!\""),
            vec!["Senate", "passes", "bill", ",", "again", ".", "\"", "Finally", "!", "\""]
        );
    }

    #[test]
    fn test_tokenize_cyrillic_and_guillemets() {
        assert_eq!(
            tokenize("Путин заявил: «Москва готова»."),
            vec!["Путин", "заявил", ":", "«", "Москва", "готова", "»", "."]
        );
    }

    #[test]
    fn test_tokenize_drops_newlines() {
        assert_eq!(tokenize("one\ntwo  three"), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_token_types() {
        assert_eq!(token_type("Senate"), TokenType::Latin);
        assert_eq!(token_type("Москва"), TokenType::Cyrillic);
        assert_eq!(token_type("2020"), TokenType::Number);
        assert_eq!(token_type("?"), TokenType::Punctuation);
        assert_eq!(token_type("«"), TokenType::Punctuation);
        assert_eq!(token_type("COVID19"), TokenType::Other);
        assert_eq!(token_type("Mосква"), TokenType::Other); // mixed scripts
    }

    #[test]
    fn test_starts_uppercase() {
        assert!(starts_uppercase("Senate"));
        assert!(starts_uppercase("Ёлка"));
        assert!(!starts_uppercase("senate"));
        assert!(!starts_uppercase("élan"));
    }

    #[test]
    fn test_lowercase_first() {
        assert_eq!(lowercase_first("How"), "how");
        assert_eq!(lowercase_first("Топ"), "топ");
        assert_eq!(lowercase_first("NASA"), "nASA");
    }
}
