//! Aspect-linking examples and the views the rankers and sample builder take of them.
//!
//! An example bundles a query context (sentence and paragraph, each annotated
//! with entity mentions), an ordered list of candidate aspects, and the id of
//! the true aspect. Entity ids are plain strings; empty ids are ignored
//! everywhere an entity set is derived.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Which span of the example is used as the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContextType {
    /// The sentence containing the target mention (`sent`).
    #[serde(rename = "sent")]
    Sentence,
    /// The surrounding paragraph (`para`).
    #[default]
    #[serde(rename = "para")]
    Paragraph,
}

impl ContextType {
    /// Returns the command-line spelling of this context type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sentence => "sent",
            Self::Paragraph => "para",
        }
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sentence),
            "para" => Ok(Self::Paragraph),
            other => Err(ValidationError::UnknownContextType {
                value: other.to_string(),
            }),
        }
    }
}

/// A single entity mention inside an annotated text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityMention {
    /// Knowledge-base id of the linked entity.
    pub entity_id: String,
    /// Display name of the entity.
    #[serde(default)]
    pub entity_name: String,
    /// Surface form in the text.
    #[serde(default)]
    pub mention: String,
    /// Whether this mention is the one being linked.
    #[serde(default)]
    pub target_mention: bool,
    /// Character offset where the mention starts.
    #[serde(default)]
    pub start: usize,
    /// Character offset where the mention ends.
    #[serde(default)]
    pub end: usize,
}

/// Text annotated with entity mentions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnnotatedText {
    /// Raw text.
    #[serde(default)]
    pub content: String,
    /// Entity mentions occurring in `content`.
    #[serde(default)]
    pub entities: Vec<EntityMention>,
}

impl AnnotatedText {
    /// Creates annotated text from raw content and a list of entity ids.
    #[must_use]
    pub fn new<I, S>(content: impl Into<String>, entity_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: content.into(),
            entities: entity_ids
                .into_iter()
                .map(|id| EntityMention {
                    entity_id: id.into(),
                    ..EntityMention::default()
                })
                .collect(),
        }
    }

    /// Distinct, non-empty entity ids mentioned in this text.
    #[must_use]
    pub fn entity_ids(&self) -> BTreeSet<&str> {
        self.entities
            .iter()
            .map(|e| e.entity_id.as_str())
            .filter(|id| !id.is_empty())
            .collect()
    }
}

/// Sentence and paragraph context around the target mention.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Context {
    /// Entity the target mention refers to.
    #[serde(default)]
    pub target_entity: String,
    /// Sentence containing the mention.
    #[serde(default)]
    pub sentence: AnnotatedText,
    /// Paragraph containing the mention.
    #[serde(default)]
    pub paragraph: AnnotatedText,
}

impl Context {
    /// Returns the span selected by `context_type`.
    #[must_use]
    pub const fn span(&self, context_type: ContextType) -> &AnnotatedText {
        match context_type {
            ContextType::Sentence => &self.sentence,
            ContextType::Paragraph => &self.paragraph,
        }
    }
}

/// A candidate aspect (a section of the target entity's article).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Aspect {
    /// Aspect id, unique within an example.
    pub aspect_id: String,
    /// Section heading.
    #[serde(default)]
    pub aspect_name: String,
    /// Section text and its entity mentions.
    #[serde(default)]
    pub aspect_content: AnnotatedText,
}

impl Aspect {
    /// Creates an aspect with the given id and entity ids.
    #[must_use]
    pub fn new<I, S>(aspect_id: impl Into<String>, entity_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aspect_id: aspect_id.into(),
            aspect_name: String::new(),
            aspect_content: AnnotatedText::new(String::new(), entity_ids),
        }
    }

    /// Distinct entity ids occurring in the aspect content.
    #[must_use]
    pub fn entity_ids(&self) -> BTreeSet<&str> {
        self.aspect_content.entity_ids()
    }
}

/// One annotated aspect-linking instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AspectLinkExample {
    /// Query id.
    pub id: String,
    /// Query context.
    #[serde(default)]
    pub context: Context,
    /// Candidate aspects, in corpus order.
    #[serde(default)]
    pub candidate_aspects: Vec<Aspect>,
    /// Id of the correct aspect; may match no candidate.
    #[serde(default)]
    pub true_aspect: String,
}

impl AspectLinkExample {
    /// Raw query text for the selected context span.
    #[must_use]
    pub fn query_text(&self, context_type: ContextType) -> &str {
        &self.context.span(context_type).content
    }

    /// Entity ids mentioned in the selected context span.
    #[must_use]
    pub fn context_entity_ids(&self, context_type: ContextType) -> BTreeSet<&str> {
        self.context.span(context_type).entity_ids()
    }

    /// Union of the entity sets of every candidate aspect.
    #[must_use]
    pub fn candidate_entity_ids(&self) -> BTreeSet<&str> {
        self.candidate_aspects
            .iter()
            .flat_map(|aspect| aspect.entity_ids())
            .collect()
    }

    /// Returns true when some candidate carries the true-aspect id.
    #[must_use]
    pub fn has_true_aspect(&self) -> bool {
        self.candidate_aspects
            .iter()
            .any(|aspect| aspect.aspect_id == self.true_aspect)
    }

    /// Splits the candidate entities into positives and negatives.
    #[must_use]
    pub fn pos_neg_split(&self) -> PosNegSplit<'_> {
        PosNegSplit::from_example(self)
    }
}

/// Positive and negative entity sets for one example.
///
/// `pos` holds the entities of the true aspect, `neg` the union of the entities
/// of every other candidate. The two sets may overlap: an entity mentioned in
/// both the true aspect and a competing aspect appears in both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PosNegSplit<'a> {
    /// Entities of the true aspect.
    pub pos: BTreeSet<&'a str>,
    /// Entities of all other candidate aspects.
    pub neg: BTreeSet<&'a str>,
}

impl<'a> PosNegSplit<'a> {
    /// Builds the split for `example`.
    #[must_use]
    pub fn from_example(example: &'a AspectLinkExample) -> Self {
        let mut split = Self::default();
        for aspect in &example.candidate_aspects {
            let target = if aspect.aspect_id == example.true_aspect {
                &mut split.pos
            } else {
                &mut split.neg
            };
            target.extend(aspect.entity_ids());
        }
        split
    }

    /// Size of the balanced sets: `min(|pos|, |neg|)`.
    #[must_use]
    pub fn balanced_len(&self) -> usize {
        self.pos.len().min(self.neg.len())
    }

    /// Both sets in ascending id order, truncated to [`Self::balanced_len`].
    #[must_use]
    pub fn balanced(&self) -> (Vec<&'a str>, Vec<&'a str>) {
        let k = self.balanced_len();
        (
            self.pos.iter().copied().take(k).collect(),
            self.neg.iter().copied().take(k).collect(),
        )
    }

    /// Entities that are both positive and negative.
    #[must_use]
    pub fn overlap(&self) -> BTreeSet<&'a str> {
        self.pos.intersection(&self.neg).copied().collect()
    }
}
