use std::collections::{BTreeSet, HashMap};

use super::types::Fingerprint;
use crate::article::ArticleKey;

/// Inverted index from fingerprint token to the live articles containing it.
///
/// Postings are pruned as articles leave, so a token with no live article
/// has no entry.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, BTreeSet<ArticleKey>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, fingerprint: &Fingerprint) {
        for token in fingerprint {
            self.postings
                .entry(token.clone())
                .or_default()
                .insert(key.to_string());
        }
    }

    pub fn remove(&mut self, key: &str, fingerprint: &Fingerprint) {
        for token in fingerprint {
            if let Some(keys) = self.postings.get_mut(token) {
                keys.remove(key);
                if keys.is_empty() {
                    self.postings.remove(token);
                }
            }
        }
    }

    /// Articles whose fingerprint contains `token`, in key order.
    pub fn articles_with<'a>(&'a self, token: &str) -> impl Iterator<Item = &'a ArticleKey> + 'a {
        self.postings.get(token).into_iter().flatten()
    }

    pub fn contains_token(&self, token: &str) -> bool {
        self.postings.contains_key(token)
    }

    /// Number of distinct tokens indexed
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(tokens: &[&str]) -> Fingerprint {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut index = InvertedIndex::new();
        index.insert("b.html", &fp(&["Senate", "Warren"]));
        index.insert("a.html", &fp(&["Senate"]));

        let keys: Vec<_> = index.articles_with("Senate").cloned().collect();
        assert_eq!(keys, vec!["a.html", "b.html"]);
        assert_eq!(index.articles_with("Ohio").count(), 0);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_remove_prunes_empty_postings() {
        let mut index = InvertedIndex::new();
        index.insert("a.html", &fp(&["Senate", "Warren"]));
        index.insert("b.html", &fp(&["Senate"]));

        index.remove("a.html", &fp(&["Senate", "Warren"]));
        assert!(!index.contains_token("Warren"));
        assert!(index.contains_token("Senate"));

        index.remove("b.html", &fp(&["Senate"]));
        assert!(index.is_empty());
    }
}
