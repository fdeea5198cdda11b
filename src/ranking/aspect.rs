//! Aspect ranking from an upstream entity ranking.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::example::{Aspect, AspectLinkExample};

use super::{QueryScores, Ranking};

/// Number of top-ranked entities considered per query unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 100;

/// Scores each candidate aspect by how many of the query's top-k entities it mentions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRanker {
    k: usize,
}

impl Default for AspectRanker {
    fn default() -> Self {
        Self { k: DEFAULT_TOP_K }
    }
}

impl AspectRanker {
    /// Creates a ranker that looks at the `k` best entities per query.
    pub fn new(k: usize) -> Result<Self, ValidationError> {
        if k == 0 {
            return Err(ValidationError::ZeroTopK);
        }
        Ok(Self { k })
    }

    /// The top-k cut.
    #[must_use]
    pub const fn k(&self) -> usize {
        self.k
    }

    /// Overlap count between each aspect's entity set and the top-k entities.
    ///
    /// Aspects with no overlap are kept with a score of 0.0.
    #[must_use]
    pub fn score(&self, aspects: &[Aspect], entity_scores: &QueryScores) -> QueryScores {
        let top: Vec<&str> = entity_scores
            .top(self.k)
            .iter()
            .map(|d| d.doc_id.as_str())
            .collect();

        QueryScores::from_scores(aspects.iter().map(|aspect| {
            let members: HashSet<&str> = aspect.entity_ids().into_iter().collect();
            let overlap = top.iter().filter(|id| members.contains(*id)).count();
            #[allow(clippy::cast_precision_loss)]
            let score = overlap as f64;
            (aspect.aspect_id.as_str(), score)
        }))
    }

    /// Ranks the aspects of `example`, or `None` when the upstream ranking has
    /// no entry for its query.
    #[must_use]
    pub fn rank_example(
        &self,
        example: &AspectLinkExample,
        entity_ranking: &Ranking,
    ) -> Option<QueryScores> {
        let entity_scores = entity_ranking.get(&example.id)?;
        Some(self.score(&example.candidate_aspects, entity_scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_scores() -> QueryScores {
        QueryScores::from_scores([("E1", 0.9), ("E2", 0.8), ("E3", 0.7), ("E4", 0.1)])
    }

    #[test]
    fn counts_overlap_with_top_k() {
        let ranker = AspectRanker::new(3).unwrap();
        let aspects = vec![
            Aspect::new("a1", ["E1", "E2", "E9"]),
            Aspect::new("a2", ["E3", "E4"]),
        ];
        let scores = ranker.score(&aspects, &entity_scores());
        assert_eq!(scores.get("a1"), Some(2.0));
        // E4 falls outside the top 3.
        assert_eq!(scores.get("a2"), Some(1.0));
        assert_eq!(scores.docs()[0].doc_id, "a1");
    }

    #[test]
    fn disjoint_aspect_scores_exactly_zero() {
        let ranker = AspectRanker::default();
        let aspects = vec![Aspect::new("a1", ["X", "Y"]), Aspect::new("a2", Vec::<String>::new())];
        let scores = ranker.score(&aspects, &entity_scores());
        assert_eq!(scores.get("a1"), Some(0.0));
        assert_eq!(scores.get("a2"), Some(0.0));
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn top_k_follows_score_order_not_insertion_order() {
        let ranker = AspectRanker::new(1).unwrap();
        let upstream = QueryScores::from_scores([("low", 0.1), ("high", 0.9)]);
        let aspects = vec![Aspect::new("a", ["low"]), Aspect::new("b", ["high"])];
        let scores = ranker.score(&aspects, &upstream);
        assert_eq!(scores.get("a"), Some(0.0));
        assert_eq!(scores.get("b"), Some(1.0));
    }

    #[test]
    fn query_missing_from_upstream_is_dropped() {
        let ranker = AspectRanker::default();
        let mut upstream = Ranking::new();
        upstream.insert("q1", entity_scores());

        let known = AspectLinkExample {
            id: "q1".to_string(),
            candidate_aspects: vec![Aspect::new("a", ["E1"])],
            ..AspectLinkExample::default()
        };
        let unknown = AspectLinkExample {
            id: "q2".to_string(),
            candidate_aspects: vec![Aspect::new("a", ["E1"])],
            ..AspectLinkExample::default()
        };

        assert_eq!(ranker.rank_example(&known, &upstream).unwrap().get("a"), Some(1.0));
        assert!(ranker.rank_example(&unknown, &upstream).is_none());
    }

    #[test]
    fn zero_k_is_rejected() {
        assert!(matches!(AspectRanker::new(0), Err(ValidationError::ZeroTopK)));
        assert_eq!(AspectRanker::default().k(), DEFAULT_TOP_K);
    }
}
