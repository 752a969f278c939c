use crate::article::Language;
use crate::text::{lowercase_first, token_type, TokenType};

const QUOTE_MARKS: &[&str] = &["\"", "“", "”", "«", "»"];

// Direct appeals to the reader mark an opinion piece rather than news.
const EN_STOPWORDS: &[&str] = &["you", "your", "yours"];
const RU_STOPWORDS: &[&str] = &[
    "вы", "вас", "вам", "вами", "ваш", "вашего", "вашему", "вашим", "вашем",
];

// Question and listicle openers.
const EN_FIRST_STOPWORDS: &[&str] = &["top", "best", "how", "who", "when", "where", "why"];
const RU_FIRST_STOPWORDS: &[&str] = &[
    "топ", "самый", "самая", "самые", "лучший", "лучшая", "лучшие", "как", "кто", "когда",
    "где", "зачем", "почему",
];

/// Title heuristics that tell objective news from opinion, listicles and
/// clickbait.
#[derive(Debug, Default, Clone, Copy)]
pub struct NewsDetector;

impl NewsDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn is_news(&self, title_tokens: &[String], language: Language) -> bool {
        let (stopwords, first_stopwords, script) = match language {
            Language::En => (EN_STOPWORDS, EN_FIRST_STOPWORDS, TokenType::Latin),
            Language::Ru => (RU_STOPWORDS, RU_FIRST_STOPWORDS, TokenType::Cyrillic),
            Language::Other => return false,
        };

        let mut in_quote = false;
        let mut first_word_seen = false;

        for token in title_tokens {
            let kind = token_type(token);

            if kind == TokenType::Punctuation {
                if QUOTE_MARKS.contains(&token.as_str()) {
                    in_quote = !in_quote;
                } else if !in_quote && (token == "!" || token == "?") {
                    return false;
                }
                continue;
            }

            // Words inside someone's quote are not the headline's own voice.
            if in_quote {
                continue;
            }

            let lowered = lowercase_first(token);
            if stopwords.contains(&lowered.as_str()) {
                return false;
            }

            if !first_word_seen && kind == script {
                first_word_seen = true;
                if first_stopwords.contains(&lowered.as_str()) {
                    return false;
                }
            }
        }

        true
    }
}
