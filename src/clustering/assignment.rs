use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

use super::index::InvertedIndex;
use super::types::{Assignment, Fingerprint, LanguageThresholds, StoryThread, ThreadId};
use crate::article::{ArticleKey, Language};
use crate::TARGET_ENGINE;

/// Jaccard similarity of two fingerprints given their sizes and overlap.
pub fn similarity(shared: usize, left: usize, right: usize) -> f64 {
    let union = left + right - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

/// Online story clustering over fingerprint sets.
///
/// Threads and articles live in flat maps keyed by id and refer to each
/// other only by id.
#[derive(Debug, Default)]
pub struct StoryClusterer {
    thresholds: LanguageThresholds,
    index: InvertedIndex,
    fingerprints: HashMap<ArticleKey, Fingerprint>,
    membership: HashMap<ArticleKey, ThreadId>,
    threads: BTreeMap<ThreadId, StoryThread>,
    next_thread_id: ThreadId,
}

impl StoryClusterer {
    pub fn new(thresholds: LanguageThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    /// Places an article into the first eligible thread or a new one, then
    /// indexes its fingerprint. A key that is already placed is re-placed.
    pub fn assign(
        &mut self,
        key: &str,
        language: Language,
        fingerprint: Fingerprint,
    ) -> Assignment {
        if self.membership.contains_key(key) {
            self.remove(key);
        }

        let assignment = match self.find_thread(language, &fingerprint) {
            Some(thread_id) => {
                if let Some(thread) = self.threads.get_mut(&thread_id) {
                    thread.members.insert(key.to_string());
                }
                debug!(
                    target: TARGET_ENGINE,
                    "Assigned {} to existing thread {}", key, thread_id
                );
                Assignment {
                    thread_id,
                    created: false,
                }
            }
            None => {
                let thread_id = self.next_thread_id;
                self.next_thread_id += 1;
                self.threads.insert(
                    thread_id,
                    StoryThread {
                        id: thread_id,
                        language,
                        members: BTreeSet::from([key.to_string()]),
                    },
                );
                debug!(
                    target: TARGET_ENGINE,
                    "Created thread {} for {} ({} fingerprint tokens)",
                    thread_id,
                    key,
                    fingerprint.len()
                );
                Assignment {
                    thread_id,
                    created: true,
                }
            }
        };

        self.membership.insert(key.to_string(), assignment.thread_id);
        self.index.insert(key, &fingerprint);
        self.fingerprints.insert(key.to_string(), fingerprint);

        assignment
    }

    /// Finds the thread a new article would join without changing anything.
    ///
    /// A candidate article passes when it shares at least the language's
    /// minimum token count and its similarity exceeds the language's
    /// minimum. A thread is eligible only when every one of its members
    /// passed; the lowest eligible thread id wins.
    pub fn find_thread(&self, language: Language, fingerprint: &Fingerprint) -> Option<ThreadId> {
        let thresholds = self.thresholds.for_language(language)?;

        let mut shared: BTreeMap<&str, usize> = BTreeMap::new();
        for token in fingerprint {
            for key in self.index.articles_with(token) {
                let Some(thread_id) = self.membership.get(key) else {
                    continue;
                };
                let same_language = self
                    .threads
                    .get(thread_id)
                    .map_or(false, |thread| thread.language == language);
                if same_language {
                    *shared.entry(key.as_str()).or_insert(0) += 1;
                }
            }
        }

        let passing: HashSet<&str> = shared
            .into_iter()
            .filter(|(key, count)| {
                let other = self.fingerprints.get(*key).map_or(0, |fp| fp.len());
                *count >= thresholds.min_shared_tokens
                    && similarity(*count, fingerprint.len(), other) > thresholds.min_similarity
            })
            .map(|(key, _)| key)
            .collect();

        let candidate_threads: BTreeSet<ThreadId> = passing
            .iter()
            .filter_map(|key| self.membership.get(*key).copied())
            .collect();

        candidate_threads.into_iter().find(|thread_id| {
            self.threads.get(thread_id).map_or(false, |thread| {
                thread
                    .members
                    .iter()
                    .all(|member| passing.contains(member.as_str()))
            })
        })
    }

    /// Removes an article, dropping its thread when it was the last member.
    /// Returns the thread it belonged to.
    pub fn remove(&mut self, key: &str) -> Option<ThreadId> {
        let thread_id = self.membership.remove(key)?;

        if let Some(fingerprint) = self.fingerprints.remove(key) {
            self.index.remove(key, &fingerprint);
        }

        let now_empty = match self.threads.get_mut(&thread_id) {
            Some(thread) => {
                thread.members.remove(key);
                thread.members.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.threads.remove(&thread_id);
            debug!(target: TARGET_ENGINE, "Dropped empty thread {}", thread_id);
        }

        Some(thread_id)
    }

    pub fn thread_of(&self, key: &str) -> Option<ThreadId> {
        self.membership.get(key).copied()
    }

    pub fn thread(&self, thread_id: ThreadId) -> Option<&StoryThread> {
        self.threads.get(&thread_id)
    }

    /// Live threads in ascending id order.
    pub fn threads(&self) -> impl Iterator<Item = &StoryThread> {
        self.threads.values()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    pub fn fingerprint(&self, key: &str) -> Option<&Fingerprint> {
        self.fingerprints.get(key)
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }
}
