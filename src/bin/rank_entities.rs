//! Ranks each example's candidate entities by embedding similarity to the
//! context entities and appends a TREC run file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use aspectlink::cli::{init_logging, CorpusArgs, DisplayArgs};
use aspectlink::pipeline::rank_entities;
use aspectlink::{ContextType, EmbeddingTable, EntityRankConfig};

#[derive(Debug, Parser)]
#[command(name = "rank-entities", version, about = "Entity relatedness run from embeddings")]
struct Args {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Entity embeddings: a JSON object mapping entity id to vector.
    #[arg(long)]
    embeddings: PathBuf,

    /// Run file to append to.
    #[arg(long)]
    output: PathBuf,

    /// Context span whose entities form the query: `sent` or `para`.
    #[arg(long)]
    context_type: ContextType,

    #[command(flatten)]
    display: DisplayArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = EntityRankConfig {
        context_type: args.context_type,
        progress: args.display.progress(),
    };
    config.validate()?;

    let embeddings = EmbeddingTable::load(&args.embeddings)
        .with_context(|| format!("loading embeddings from {}", args.embeddings.display()))?;
    rank_entities(&args.corpus.corpus(), &embeddings, &args.output, &config)?;
    Ok(())
}
