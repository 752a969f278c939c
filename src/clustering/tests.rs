#[cfg(test)]
mod tests {
    use crate::article::Language;
    use crate::clustering::{
        extract_fingerprint, similarity, ClusterThresholds, Fingerprint, LanguageThresholds,
        StoryClusterer, ThreadId,
    };
    use crate::text::tokenize;
    use std::collections::BTreeSet;

    fn loose() -> LanguageThresholds {
        LanguageThresholds::uniform(ClusterThresholds {
            min_shared_tokens: 1,
            min_similarity: 0.2,
        })
    }

    fn fp(tokens: &[&str]) -> Fingerprint {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn partition(clusterer: &StoryClusterer) -> Vec<Vec<String>> {
        clusterer
            .threads()
            .map(|thread| thread.members.iter().cloned().collect())
            .collect()
    }

    #[test]
    fn test_similarity_is_jaccard() {
        assert_eq!(similarity(1, 2, 2), 1.0 / 3.0);
        assert_eq!(similarity(2, 2, 2), 1.0);
        assert_eq!(similarity(0, 0, 0), 0.0);
    }

    #[test]
    fn test_senate_articles_share_a_thread() {
        let mut clusterer = StoryClusterer::new(loose());

        let first = extract_fingerprint(&tokenize(
            "The Senate passed the new bill on Tuesday. Lawmakers in Washington cheered.",
        ));
        let second = extract_fingerprint(&tokenize(
            "On Tuesday the Senate passed the new bill. Critics outside Washington objected.",
        ));
        let unrelated = extract_fingerprint(&tokenize(
            "The local team won the championship in Denver. Fans of the Broncos celebrated.",
        ));

        let a = clusterer.assign("senate-1.html", Language::En, first);
        let b = clusterer.assign("senate-2.html", Language::En, second);
        let c = clusterer.assign("team.html", Language::En, unrelated);

        assert!(a.created);
        assert!(!b.created);
        assert_eq!(a.thread_id, b.thread_id);
        assert!(c.created);
        assert_ne!(c.thread_id, a.thread_id);
        assert_eq!(clusterer.thread_count(), 2);
    }

    #[test]
    fn test_merge_requires_every_member_to_pass() {
        let mut clusterer = StoryClusterer::new(loose());

        let a = clusterer.assign("a", Language::En, fp(&["Alpha", "Beta"]));
        let b = clusterer.assign("b", Language::En, fp(&["Beta", "Gamma"]));
        assert_eq!(a.thread_id, b.thread_id);

        // Similar to "b" but shares nothing with "a"
        let c = clusterer.assign("c", Language::En, fp(&["Gamma", "Delta"]));
        assert!(c.created);
        assert_ne!(c.thread_id, a.thread_id);
    }

    #[test]
    fn test_lowest_eligible_thread_wins() {
        let mut clusterer = StoryClusterer::new(loose());

        let a = clusterer.assign("a", Language::En, fp(&["Xavier", "Yukon"]));
        let b = clusterer.assign("b", Language::En, fp(&["Zurich", "Warsaw"]));
        assert_ne!(a.thread_id, b.thread_id);

        let c = clusterer.assign("c", Language::En, fp(&["Xavier", "Zurich"]));
        assert_eq!(c.thread_id, a.thread_id.min(b.thread_id));
    }

    #[test]
    fn test_min_shared_tokens_threshold() {
        let strict = LanguageThresholds::uniform(ClusterThresholds {
            min_shared_tokens: 2,
            min_similarity: 0.0,
        });
        let mut clusterer = StoryClusterer::new(strict);

        let a = clusterer.assign("a", Language::En, fp(&["Alpha", "Beta", "Gamma"]));
        let b = clusterer.assign("b", Language::En, fp(&["Alpha", "Omega"]));
        assert_ne!(a.thread_id, b.thread_id);

        let c = clusterer.assign("c", Language::En, fp(&["Alpha", "Beta"]));
        assert_eq!(c.thread_id, a.thread_id);
    }

    #[test]
    fn test_similarity_must_exceed_minimum() {
        let thresholds = LanguageThresholds::uniform(ClusterThresholds {
            min_shared_tokens: 1,
            min_similarity: 0.5,
        });
        let mut clusterer = StoryClusterer::new(thresholds);

        let a = clusterer.assign("a", Language::En, fp(&["Alpha", "Beta"]));
        // 2 shared of 4 distinct is exactly 0.5, which does not exceed it
        let b = clusterer.assign("b", Language::En, fp(&["Alpha", "Beta", "Gamma", "Delta"]));
        assert_ne!(a.thread_id, b.thread_id);
    }

    #[test]
    fn test_languages_never_mix() {
        let mut clusterer = StoryClusterer::new(loose());

        let en = clusterer.assign("en.html", Language::En, fp(&["Moscow", "Kremlin"]));
        let ru = clusterer.assign("ru.html", Language::Ru, fp(&["Moscow", "Kremlin"]));
        assert_ne!(en.thread_id, ru.thread_id);

        for thread in clusterer.threads() {
            assert_eq!(thread.members.len(), 1);
        }
        assert_eq!(clusterer.thread(ru.thread_id).unwrap().language, Language::Ru);
    }

    #[test]
    fn test_other_language_always_starts_a_thread() {
        let mut clusterer = StoryClusterer::new(loose());
        let a = clusterer.assign("a", Language::Other, fp(&["Alpha"]));
        let b = clusterer.assign("b", Language::Other, fp(&["Alpha"]));
        assert_ne!(a.thread_id, b.thread_id);
    }

    #[test]
    fn test_clustering_is_deterministic() {
        let docs = [
            ("1", fp(&["Alpha", "Beta"])),
            ("2", fp(&["Beta", "Gamma"])),
            ("3", fp(&["Gamma", "Delta"])),
            ("4", fp(&["Alpha", "Beta", "Gamma"])),
            ("5", fp(&["Omega"])),
            ("6", fp(&["Delta", "Gamma"])),
        ];

        let run = || {
            let mut clusterer = StoryClusterer::new(loose());
            for (key, fingerprint) in docs.iter() {
                clusterer.assign(key, Language::En, fingerprint.clone());
            }
            partition(&clusterer)
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_remove_drops_empty_thread_and_index_entries() {
        let mut clusterer = StoryClusterer::new(loose());
        let a = clusterer.assign("a", Language::En, fp(&["Alpha", "Beta"]));
        clusterer.assign("b", Language::En, fp(&["Alpha", "Beta"]));

        assert_eq!(clusterer.remove("a"), Some(a.thread_id));
        assert!(clusterer.thread(a.thread_id).is_some());
        assert_eq!(clusterer.remove("b"), Some(a.thread_id));
        assert!(clusterer.thread(a.thread_id).is_none());
        assert!(clusterer.index().is_empty());

        assert_eq!(clusterer.remove("b"), None);
        assert_eq!(clusterer.remove("b"), None);
    }

    #[test]
    fn test_thread_ids_are_not_reused() {
        let mut clusterer = StoryClusterer::new(loose());
        let a = clusterer.assign("a", Language::En, fp(&["Alpha"]));
        clusterer.remove("a");
        let b = clusterer.assign("b", Language::En, fp(&["Alpha"]));
        assert!(b.thread_id > a.thread_id);
    }

    #[test]
    fn test_reassign_moves_article_and_keeps_single_membership() {
        let mut clusterer = StoryClusterer::new(loose());
        let a = clusterer.assign("a", Language::En, fp(&["Alpha", "Beta"]));
        let x = clusterer.assign("x", Language::En, fp(&["Omega", "Sigma"]));
        let b = clusterer.assign("b", Language::En, fp(&["Alpha", "Beta"]));
        assert_eq!(b.thread_id, a.thread_id);

        // Same key, new content that now matches the other story
        let moved = clusterer.assign("b", Language::En, fp(&["Omega", "Sigma"]));
        assert_eq!(moved.thread_id, x.thread_id);

        let holders: Vec<ThreadId> = clusterer
            .threads()
            .filter(|thread| thread.members.contains("b"))
            .map(|thread| thread.id)
            .collect();
        assert_eq!(holders, vec![x.thread_id]);
        assert_eq!(clusterer.thread_of("b"), Some(x.thread_id));
    }

    #[test]
    fn test_every_live_token_is_indexed() {
        let mut clusterer = StoryClusterer::new(loose());
        clusterer.assign("a", Language::En, fp(&["Alpha", "Beta"]));
        clusterer.assign("b", Language::En, fp(&["Gamma"]));
        clusterer.remove("b");

        let indexed: BTreeSet<&str> = ["Alpha", "Beta", "Gamma"]
            .into_iter()
            .filter(|token| clusterer.index().contains_token(token))
            .collect();
        assert_eq!(indexed, BTreeSet::from(["Alpha", "Beta"]));
    }
}
