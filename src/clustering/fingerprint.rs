use super::types::Fingerprint;
use crate::text::{starts_uppercase, token_type, TokenType};

/// Extracts the capitalized-token fingerprint of a body token sequence.
///
/// Tokens are grouped into sentences. Within a sentence, alphabetic tokens
/// starting with an uppercase letter (other than the pronoun "I") are
/// candidates. A sentence contributes its candidates only when they are
/// fewer than its tokens, which drops headline-style Title Case lines. The
/// sentence-start word counts toward that test but is never added.
pub fn extract_fingerprint(tokens: &[String]) -> Fingerprint {
    let mut fingerprint = Fingerprint::new();
    let mut sentence: Vec<&str> = Vec::new();
    let mut in_quote = false;

    for token in tokens {
        match token.as_str() {
            "\"" => {
                flush_sentence(&mut sentence, &mut fingerprint);
                in_quote = !in_quote;
            }
            "“" | "«" => {
                flush_sentence(&mut sentence, &mut fingerprint);
                in_quote = true;
            }
            "”" | "»" => {
                flush_sentence(&mut sentence, &mut fingerprint);
                in_quote = false;
            }
            "." | "!" | "?" if !in_quote => flush_sentence(&mut sentence, &mut fingerprint),
            other => sentence.push(other),
        }
    }
    flush_sentence(&mut sentence, &mut fingerprint);

    fingerprint
}

fn is_candidate(token: &str) -> bool {
    matches!(token_type(token), TokenType::Latin | TokenType::Cyrillic)
        && starts_uppercase(token)
        && token != "I"
}

fn flush_sentence(sentence: &mut Vec<&str>, fingerprint: &mut Fingerprint) {
    if sentence.is_empty() {
        return;
    }

    let start = sentence
        .iter()
        .position(|token| token_type(token) != TokenType::Punctuation);

    let candidates: Vec<(usize, &str)> = sentence
        .iter()
        .enumerate()
        .filter(|(_, token)| is_candidate(token))
        .map(|(i, token)| (i, *token))
        .collect();

    if candidates.len() < sentence.len() {
        for (i, token) in candidates {
            if Some(i) != start {
                fingerprint.insert(token.to_string());
            }
        }
    }

    sentence.clear();
}
