//! Builds balanced pairwise or pointwise training data.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use aspectlink::cli::{init_logging, CorpusArgs, DisplayArgs};
use aspectlink::pipeline::make_train_data;
use aspectlink::samples::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
use aspectlink::{ContextType, DescriptionStore, PoolConfig, TrainDataConfig, TrainingMode};

#[derive(Debug, Parser)]
#[command(name = "make-train-data", version, about = "Balanced training data for neural rankers")]
struct Args {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Entity description TSV written by `make-desc-file`.
    #[arg(long)]
    desc: PathBuf,

    /// Directory receiving `train.<mode>.jsonl`.
    #[arg(long)]
    save: PathBuf,

    /// Record shape: `pairwise` or `pointwise`.
    #[arg(long)]
    mode: TrainingMode,

    /// Context span used as query text: `sent` or `para`.
    #[arg(long)]
    context_type: ContextType,

    /// Worker threads; 1 builds on the main thread.
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Examples queued ahead of the workers.
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    #[command(flatten)]
    display: DisplayArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = TrainDataConfig {
        mode: args.mode,
        context_type: args.context_type,
        pool: PoolConfig {
            workers: args.workers,
            queue_capacity: args.queue_capacity,
        },
        progress: args.display.progress(),
    };
    config.validate()?;

    let descriptions = DescriptionStore::load_tsv(&args.desc)
        .with_context(|| format!("loading descriptions from {}", args.desc.display()))?;
    make_train_data(
        &args.corpus.corpus(),
        Arc::new(descriptions),
        &args.save,
        &config,
    )?;
    Ok(())
}
