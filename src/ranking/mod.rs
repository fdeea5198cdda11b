//! Per-query score containers and the two rankers built on them.
//!
//! Every score list is kept in one canonical order: descending by score, ties
//! broken by ascending document id. Writers and the aspect ranker's top-k cut
//! both rely on this order, which makes all output reproducible.

mod aspect;
mod entity;

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use aspect::{AspectRanker, DEFAULT_TOP_K};
pub use entity::EntityRanker;

/// A document (entity or aspect) with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    /// Document id.
    pub doc_id: String,
    /// Relevance score.
    pub score: f64,
}

impl ScoredDoc {
    /// Creates a scored document.
    #[must_use]
    pub fn new(doc_id: impl Into<String>, score: f64) -> Self {
        Self {
            doc_id: doc_id.into(),
            score,
        }
    }
}

fn rank_order(a: &ScoredDoc, b: &ScoredDoc) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.doc_id.cmp(&b.doc_id))
}

/// Scores for one query, in canonical rank order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryScores {
    docs: Vec<ScoredDoc>,
}

impl QueryScores {
    /// Builds a ranked list. A repeated document id keeps its last score.
    pub fn from_scores<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let deduped: HashMap<String, f64> = scores
            .into_iter()
            .map(|(id, score)| (id.into(), score))
            .collect();
        let mut docs: Vec<ScoredDoc> = deduped
            .into_iter()
            .map(|(doc_id, score)| ScoredDoc { doc_id, score })
            .collect();
        docs.sort_by(rank_order);
        Self { docs }
    }

    /// Ranked documents, best first.
    #[must_use]
    pub fn docs(&self) -> &[ScoredDoc] {
        &self.docs
    }

    /// The `k` best documents (fewer if the list is shorter).
    #[must_use]
    pub fn top(&self, k: usize) -> &[ScoredDoc] {
        &self.docs[..k.min(self.docs.len())]
    }

    /// Score of `doc_id`, if ranked.
    #[must_use]
    pub fn get(&self, doc_id: &str) -> Option<f64> {
        self.docs
            .iter()
            .find(|d| d.doc_id == doc_id)
            .map(|d| d.score)
    }

    /// Number of ranked documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Returns true if nothing is ranked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Ranked lists keyed by query id, iterated in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    order: Vec<String>,
    by_query: HashMap<String, QueryScores>,
}

impl Ranking {
    /// Creates an empty ranking.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the scores of `query_id`. Re-inserting a query replaces its
    /// scores but keeps its original position.
    pub fn insert(&mut self, query_id: impl Into<String>, scores: QueryScores) {
        let query_id = query_id.into();
        if !self.by_query.contains_key(&query_id) {
            self.order.push(query_id.clone());
        }
        self.by_query.insert(query_id, scores);
    }

    /// Scores for `query_id`.
    #[must_use]
    pub fn get(&self, query_id: &str) -> Option<&QueryScores> {
        self.by_query.get(query_id)
    }

    /// Returns true if `query_id` has an entry.
    #[must_use]
    pub fn contains(&self, query_id: &str) -> bool {
        self.by_query.contains_key(query_id)
    }

    /// Number of queries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no query is ranked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of (query, document) entries.
    #[must_use]
    pub fn num_entries(&self) -> usize {
        self.by_query.values().map(QueryScores::len).sum()
    }

    /// Queries and their scores in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryScores)> {
        self.order
            .iter()
            .filter_map(|q| self.by_query.get(q).map(|s| (q.as_str(), s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_scores_orders_by_score_then_id() {
        let scores = QueryScores::from_scores([("c", 1.0), ("b", 5.0), ("a", 3.0), ("aa", 3.0)]);
        let ids: Vec<&str> = scores.docs().iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "aa", "c"]);
    }

    #[test]
    fn repeated_doc_keeps_last_score() {
        let scores = QueryScores::from_scores([("a", 1.0), ("a", 4.0)]);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores.get("a"), Some(4.0));
    }

    #[test]
    fn negative_scores_rank_below_zero() {
        let scores = QueryScores::from_scores([("neg", -0.5), ("zero", 0.0), ("pos", 0.5)]);
        let ids: Vec<&str> = scores.docs().iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["pos", "zero", "neg"]);
    }

    #[test]
    fn top_is_clamped() {
        let scores = QueryScores::from_scores([("a", 1.0), ("b", 2.0)]);
        assert_eq!(scores.top(1)[0].doc_id, "b");
        assert_eq!(scores.top(10).len(), 2);
        assert!(scores.top(0).is_empty());
    }

    #[test]
    fn ranking_keeps_first_insertion_position() {
        let mut ranking = Ranking::new();
        ranking.insert("q2", QueryScores::from_scores([("x", 1.0)]));
        ranking.insert("q1", QueryScores::from_scores([("y", 1.0)]));
        ranking.insert("q2", QueryScores::from_scores([("z", 2.0), ("w", 1.0)]));

        let queries: Vec<&str> = ranking.iter().map(|(q, _)| q).collect();
        assert_eq!(queries, vec!["q2", "q1"]);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking.num_entries(), 3);
        assert_eq!(ranking.get("q2").unwrap().get("z"), Some(2.0));
    }
}
