//! Labeled training and evaluation records.
//!
//! Records are derived from the positive/negative entity split of each example
//! and joined against the description store: an entity without a description
//! for the example's query never produces a record.
//!
//! # Shapes
//! - **Pairwise**: `{query_id, query, doc_pos, doc_neg}` over the balanced sets.
//! - **Pointwise**: `{query_id, query, doc, label}` over the balanced sets.
//! - **Evaluation**: `{query_id, query, doc_id, doc, label}` over the full sets.
//!
//! Balancing truncates both sets to `k = min(|pos|, |neg|)` after sorting by
//! entity id. Positive and negative sets may share entities; such an entity
//! appears with both labels in pointwise output, while pairwise output skips
//! only the pair that pairs it with itself.

mod pool;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::descriptions::DescriptionLookup;
use crate::error::ValidationError;
use crate::example::{AspectLinkExample, ContextType};
use crate::text::{TextNormalizer, TextProcessor};

pub use pool::{build_in_order, PoolConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};

/// Shape of training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingMode {
    /// Relative `(doc_pos, doc_neg)` comparisons.
    Pairwise,
    /// Single labeled documents.
    Pointwise,
}

impl TrainingMode {
    /// Returns the command-line spelling of this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pairwise => "pairwise",
            Self::Pointwise => "pointwise",
        }
    }
}

impl fmt::Display for TrainingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pairwise" => Ok(Self::Pairwise),
            "pointwise" => Ok(Self::Pointwise),
            other => Err(ValidationError::UnknownMode {
                value: other.to_string(),
            }),
        }
    }
}

/// One line of a training or evaluation file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrainingRecord {
    /// A (positive, negative) document pair for one query.
    Pairwise {
        /// Query id.
        query_id: String,
        /// Normalized query text.
        query: String,
        /// Normalized description of the positive entity.
        doc_pos: String,
        /// Normalized description of the negative entity.
        doc_neg: String,
    },
    /// A single labeled document for one query.
    Pointwise {
        /// Query id.
        query_id: String,
        /// Normalized query text.
        query: String,
        /// Entity id; present in evaluation records only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        doc_id: Option<String>,
        /// Normalized entity description.
        doc: String,
        /// 1 for a true-aspect entity, 0 otherwise.
        label: u8,
    },
}

impl TrainingRecord {
    /// Query id of the record.
    #[must_use]
    pub fn query_id(&self) -> &str {
        match self {
            Self::Pairwise { query_id, .. } | Self::Pointwise { query_id, .. } => query_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Pairwise,
    Pointwise,
    Evaluation,
}

/// Turns examples into labeled records.
pub struct SampleBuilder {
    shape: Shape,
    context_type: ContextType,
    normalizer: Box<dyn TextNormalizer>,
}

impl fmt::Debug for SampleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleBuilder")
            .field("shape", &self.shape)
            .field("context_type", &self.context_type)
            .finish_non_exhaustive()
    }
}

impl SampleBuilder {
    /// Balanced training records in `mode`.
    #[must_use]
    pub fn training(mode: TrainingMode, context_type: ContextType) -> Self {
        let shape = match mode {
            TrainingMode::Pairwise => Shape::Pairwise,
            TrainingMode::Pointwise => Shape::Pointwise,
        };
        Self {
            shape,
            context_type,
            normalizer: Box::new(TextProcessor::new()),
        }
    }

    /// Unbalanced pointwise records carrying entity ids, for dev/test files.
    #[must_use]
    pub fn evaluation(context_type: ContextType) -> Self {
        Self {
            shape: Shape::Evaluation,
            context_type,
            normalizer: Box::new(TextProcessor::new()),
        }
    }

    /// Replaces the text normalizer.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: impl TextNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    /// Context span used as the query.
    #[must_use]
    pub const fn context_type(&self) -> ContextType {
        self.context_type
    }

    /// Builds the records of one example.
    ///
    /// Returns nothing when the description store has no entry for the query.
    #[must_use]
    pub fn build(
        &self,
        example: &AspectLinkExample,
        descriptions: &dyn DescriptionLookup,
    ) -> Vec<TrainingRecord> {
        let query_id = example.id.as_str();
        if !descriptions.has_query(query_id) {
            debug!(query_id, "no descriptions for query, skipping example");
            return Vec::new();
        }
        if !example.has_true_aspect() {
            warn!(query_id, true_aspect = %example.true_aspect, "true aspect matches no candidate");
        }

        let query = self.normalizer.normalize(example.query_text(self.context_type));
        let split = example.pos_neg_split();

        let (pos, neg) = match self.shape {
            Shape::Pairwise | Shape::Pointwise => split.balanced(),
            Shape::Evaluation => (
                split.pos.iter().copied().collect(),
                split.neg.iter().copied().collect(),
            ),
        };

        // Normalize each description once, however many records reuse it.
        let docs: HashMap<&str, String> = pos
            .iter()
            .chain(neg.iter())
            .filter_map(|&id| {
                descriptions
                    .describe(query_id, id)
                    .map(|desc| (id, self.normalizer.normalize(desc)))
            })
            .collect();

        let mut records = Vec::new();
        match self.shape {
            Shape::Pairwise => {
                for &p in &pos {
                    for &n in &neg {
                        if p == n {
                            continue;
                        }
                        let (Some(doc_pos), Some(doc_neg)) = (docs.get(p), docs.get(n)) else {
                            continue;
                        };
                        records.push(TrainingRecord::Pairwise {
                            query_id: query_id.to_string(),
                            query: query.clone(),
                            doc_pos: doc_pos.clone(),
                            doc_neg: doc_neg.clone(),
                        });
                    }
                }
            }
            Shape::Pointwise | Shape::Evaluation => {
                let with_ids = self.shape == Shape::Evaluation;
                let labeled = pos.iter().map(|&id| (id, 1u8)).chain(neg.iter().map(|&id| (id, 0u8)));
                for (id, label) in labeled {
                    let Some(doc) = docs.get(id) else {
                        continue;
                    };
                    records.push(TrainingRecord::Pointwise {
                        query_id: query_id.to_string(),
                        query: query.clone(),
                        doc_id: with_ids.then(|| id.to_string()),
                        doc: doc.clone(),
                        label,
                    });
                }
            }
        }
        records
    }
}
