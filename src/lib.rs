//! # aspectlink - ranking signals and training data for aspect linking
//!
//! Aspect linking picks, for an entity mention in context, the aspect (a
//! section of the entity's article) that the context talks about. This crate
//! produces the two cheap ranking signals used as baselines and features, and
//! the labeled data used to train and evaluate neural rankers.
//!
//! ## Core Concepts
//!
//! - **Example**: a query context plus candidate aspects and the true aspect
//! - **Entity ranking**: candidate entities scored by embedding similarity to the context entities
//! - **Aspect ranking**: candidate aspects scored by overlap with the top-k ranked entities
//! - **Samples**: pairwise or pointwise records built from balanced positive/negative entity sets
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aspectlink::{ContextType, CorpusFile, EmbeddingTable, EntityRankConfig};
//! use aspectlink::pipeline::rank_entities;
//!
//! let corpus = CorpusFile::new("train.jsonl.gz");
//! let embeddings = EmbeddingTable::load("entity_embeddings.json".as_ref())?;
//! let config = EntityRankConfig {
//!     context_type: ContextType::Sentence,
//!     ..EntityRankConfig::default()
//! };
//! rank_entities(&corpus, &embeddings, "entities.run".as_ref(), &config)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data model and inputs
pub mod corpus;
pub mod descriptions;
pub mod embedding;
pub mod error;
pub mod example;
pub mod text;

// Ranking and sample construction
pub mod ranking;
pub mod samples;
pub mod trec;

// Tool surface
pub mod config;
pub mod pipeline;
pub mod progress;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export primary types at crate root for convenience
pub use config::{AspectRankConfig, EntityRankConfig, EvalDataConfig, QueriesConfig, TrainDataConfig};
pub use corpus::{CorpusFile, ExampleSource};
pub use descriptions::{DescriptionLookup, DescriptionStore};
pub use embedding::{cosine_similarity, EmbeddingTable};
pub use error::{AspectLinkError, AspectLinkResult, DataError, ValidationError};
pub use example::{Aspect, AspectLinkExample, ContextType, PosNegSplit};
pub use progress::ProgressConfig;
pub use ranking::{AspectRanker, EntityRanker, QueryScores, Ranking, ScoredDoc};
pub use samples::{PoolConfig, SampleBuilder, TrainingMode, TrainingRecord};
pub use text::{TextNormalizer, TextProcessor};
