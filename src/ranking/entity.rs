//! Entity ranking by embedding relatedness to the query context.

use std::collections::BTreeSet;

use crate::embedding::{cosine_similarity, EmbeddingTable};
use crate::example::{AspectLinkExample, ContextType};

use super::QueryScores;

/// Scores candidate entities by summed cosine similarity to the context entities.
///
/// A context entity that is itself a candidate contributes its self-similarity
/// to its own score.
#[derive(Debug, Clone, Copy)]
pub struct EntityRanker<'a> {
    embeddings: &'a EmbeddingTable,
}

impl<'a> EntityRanker<'a> {
    /// Creates a ranker over a loaded embedding table.
    #[must_use]
    pub const fn new(embeddings: &'a EmbeddingTable) -> Self {
        Self { embeddings }
    }

    fn context_vectors(&self, context_entities: &BTreeSet<&str>) -> Vec<&'a [f32]> {
        context_entities
            .iter()
            .filter_map(|id| self.embeddings.get(id))
            .collect()
    }

    /// Relatedness of one entity to the context; 0.0 if it has no embedding.
    #[must_use]
    pub fn score_entity(&self, entity_id: &str, context_entities: &BTreeSet<&str>) -> f64 {
        let Some(target) = self.embeddings.get(entity_id) else {
            return 0.0;
        };
        self.context_vectors(context_entities)
            .into_iter()
            .map(|ctx| cosine_similarity(target, ctx))
            .sum()
    }

    /// Scores every candidate and drops those scoring exactly 0.0.
    #[must_use]
    pub fn score(
        &self,
        context_entities: &BTreeSet<&str>,
        candidate_entities: &BTreeSet<&str>,
    ) -> QueryScores {
        let context = self.context_vectors(context_entities);
        let scored = candidate_entities.iter().filter_map(|&entity_id| {
            let target = self.embeddings.get(entity_id)?;
            let score: f64 = context
                .iter()
                .map(|ctx| cosine_similarity(target, ctx))
                .sum();
            (score != 0.0).then_some((entity_id, score))
        });
        QueryScores::from_scores(scored)
    }

    /// Ranks the candidate entities of `example` against its selected context.
    #[must_use]
    pub fn rank_example(
        &self,
        example: &AspectLinkExample,
        context_type: ContextType,
    ) -> QueryScores {
        self.score(
            &example.context_entity_ids(context_type),
            &example.candidate_entity_ids(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::example::{AnnotatedText, Aspect, Context};

    fn table() -> EmbeddingTable {
        [
            ("E1".to_string(), vec![1.0, 0.0]),
            ("E2".to_string(), vec![0.0, 1.0]),
            ("E3".to_string(), vec![1.0, 0.0]),
            ("E4".to_string(), vec![1.0, 1.0]),
            ("E5".to_string(), vec![0.0, -1.0]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn sums_cosine_over_context_entities() {
        let table = table();
        let ranker = EntityRanker::new(&table);
        let context = BTreeSet::from(["E1", "E2"]);
        let scores = ranker.score(&context, &BTreeSet::from(["E3"]));
        assert_eq!(scores.len(), 1);
        assert!((scores.get("E3").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_candidate_scores_zero_and_is_dropped() {
        let table = table();
        let ranker = EntityRanker::new(&table);
        let context = BTreeSet::from(["E1"]);
        assert_eq!(ranker.score_entity("E404", &context), 0.0);
        let scores = ranker.score(&context, &BTreeSet::from(["E404", "E3"]));
        assert_eq!(scores.get("E404"), None);
        assert!(scores.get("E3").is_some());
    }

    #[test]
    fn missing_context_entity_contributes_nothing() {
        let table = table();
        let ranker = EntityRanker::new(&table);
        let with_missing = BTreeSet::from(["E1", "E404"]);
        let without = BTreeSet::from(["E1"]);
        assert_eq!(
            ranker.score_entity("E4", &with_missing),
            ranker.score_entity("E4", &without)
        );
    }

    #[test]
    fn exact_zero_scores_are_filtered() {
        let table = table();
        let ranker = EntityRanker::new(&table);
        // E2 is orthogonal to E1.
        let scores = ranker.score(&BTreeSet::from(["E1"]), &BTreeSet::from(["E2", "E3"]));
        assert_eq!(scores.get("E2"), None);
        assert_eq!(scores.len(), 1);
    }

    #[test]
    fn negative_scores_are_kept_and_ranked_last() {
        let table = table();
        let ranker = EntityRanker::new(&table);
        let scores = ranker.score(&BTreeSet::from(["E2"]), &BTreeSet::from(["E4", "E5"]));
        let ids: Vec<&str> = scores.docs().iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["E4", "E5"]);
        assert!(scores.get("E5").unwrap() < 0.0);
    }

    #[test]
    fn self_similarity_is_included() {
        let table = table();
        let ranker = EntityRanker::new(&table);
        // E1 is both a context entity and a candidate: cos(E1, E1) = 1.0 counts.
        let scores = ranker.score(&BTreeSet::from(["E1", "E2"]), &BTreeSet::from(["E1"]));
        assert!((scores.get("E1").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn equal_scores_tie_break_by_id() {
        let table = table();
        let ranker = EntityRanker::new(&table);
        let scores = ranker.score(&BTreeSet::from(["E1"]), &BTreeSet::from(["E3", "E1"]));
        let ids: Vec<&str> = scores.docs().iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["E1", "E3"]);
    }

    #[test]
    fn rank_example_uses_candidate_union_and_context_span() {
        let table = table();
        let ranker = EntityRanker::new(&table);
        let example = AspectLinkExample {
            id: "q1".to_string(),
            context: Context {
                target_entity: String::new(),
                sentence: AnnotatedText::new("s", ["E2"]),
                paragraph: AnnotatedText::new("p", ["E1"]),
            },
            candidate_aspects: vec![Aspect::new("a", ["E3"]), Aspect::new("b", ["E4"])],
            true_aspect: "a".to_string(),
        };

        let para = ranker.rank_example(&example, ContextType::Paragraph);
        assert_eq!(para.docs()[0].doc_id, "E3");
        assert_eq!(para.len(), 2);

        let sent = ranker.rank_example(&example, ContextType::Sentence);
        // E3 is orthogonal to E2 and is dropped.
        assert_eq!(sent.len(), 1);
        assert_eq!(sent.docs()[0].doc_id, "E4");
    }

    proptest! {
        #[test]
        fn output_ids_are_candidates(
            context in proptest::collection::btree_set("E[0-9]", 0..5),
            candidates in proptest::collection::btree_set("E[0-9]", 0..8),
        ) {
            let table = table();
            let ranker = EntityRanker::new(&table);
            let context: BTreeSet<&str> = context.iter().map(String::as_str).collect();
            let candidates: BTreeSet<&str> = candidates.iter().map(String::as_str).collect();
            let scores = ranker.score(&context, &candidates);
            for doc in scores.docs() {
                prop_assert!(candidates.contains(doc.doc_id.as_str()));
                prop_assert!(doc.score != 0.0);
            }
        }
    }
}
