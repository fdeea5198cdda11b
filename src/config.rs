//! Per-tool configuration.
//!
//! Every pipeline stage takes one of these structs. `validate` is called
//! before the corpus is opened so bad settings never cost a partial pass.

use crate::error::ValidationError;
use crate::example::ContextType;
use crate::progress::ProgressConfig;
use crate::ranking::{AspectRanker, DEFAULT_TOP_K};
use crate::samples::{PoolConfig, TrainingMode};

/// Settings for entity ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityRankConfig {
    /// Span whose entities form the query context.
    pub context_type: ContextType,
    /// Progress display.
    pub progress: ProgressConfig,
}

impl EntityRankConfig {
    /// Entity ranking has no settings that can be invalid.
    pub const fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Settings for aspect ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRankConfig {
    /// Number of top-ranked entities considered per query.
    pub k: usize,
    /// Progress display.
    pub progress: ProgressConfig,
}

impl Default for AspectRankConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_TOP_K,
            progress: ProgressConfig::default(),
        }
    }
}

impl AspectRankConfig {
    /// Builds the configured ranker, rejecting `k == 0`.
    pub fn ranker(&self) -> Result<AspectRanker, ValidationError> {
        AspectRanker::new(self.k)
    }

    /// Rejects `k == 0`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ranker().map(drop)
    }
}

/// Settings for balanced training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainDataConfig {
    /// Record shape.
    pub mode: TrainingMode,
    /// Span used as query text.
    pub context_type: ContextType,
    /// Worker pool; a single worker runs on the calling thread.
    pub pool: PoolConfig,
    /// Progress display.
    pub progress: ProgressConfig,
}

impl Default for TrainDataConfig {
    fn default() -> Self {
        Self {
            mode: TrainingMode::Pairwise,
            context_type: ContextType::default(),
            pool: PoolConfig::default(),
            progress: ProgressConfig::default(),
        }
    }
}

impl TrainDataConfig {
    /// Rejects a pool without workers.
    pub const fn validate(&self) -> Result<(), ValidationError> {
        self.pool.validate()
    }

    /// File name of the training output, `train.<mode>.jsonl`.
    #[must_use]
    pub fn output_file_name(&self) -> String {
        format!("train.{}.jsonl", self.mode)
    }
}

/// Settings for unbalanced evaluation data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalDataConfig {
    /// Span used as query text.
    pub context_type: ContextType,
    /// Progress display.
    pub progress: ProgressConfig,
}

impl EvalDataConfig {
    /// Evaluation data has no settings that can be invalid.
    pub const fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Settings for the queries file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueriesConfig {
    /// Span used as query text.
    pub context_type: ContextType,
    /// Progress display.
    pub progress: ProgressConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let aspect = AspectRankConfig::default();
        assert_eq!(aspect.k, 100);
        assert!(aspect.validate().is_ok());

        let train = TrainDataConfig::default();
        assert_eq!(train.pool.workers, 4);
        assert_eq!(train.pool.queue_capacity, 1024);
        assert!(train.validate().is_ok());
    }

    #[test]
    fn zero_k_is_rejected() {
        let config = AspectRankConfig {
            k: 0,
            ..AspectRankConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::ZeroTopK)));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let mut config = TrainDataConfig::default();
        config.pool.workers = 0;
        assert!(matches!(config.validate(), Err(ValidationError::ZeroWorkers)));
    }

    #[test]
    fn output_file_name_follows_mode() {
        let mut config = TrainDataConfig::default();
        assert_eq!(config.output_file_name(), "train.pairwise.jsonl");
        config.mode = TrainingMode::Pointwise;
        assert_eq!(config.output_file_name(), "train.pointwise.jsonl");
    }
}
