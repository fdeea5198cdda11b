//! Ranks each example's candidate aspects by how many of the query's top-k
//! entities they mention, reading the entity run written by `rank-entities`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use aspectlink::cli::{init_logging, CorpusArgs, DisplayArgs};
use aspectlink::pipeline::rank_aspects;
use aspectlink::ranking::DEFAULT_TOP_K;
use aspectlink::trec::read_run;
use aspectlink::AspectRankConfig;

#[derive(Debug, Parser)]
#[command(name = "rank-aspects", version, about = "Aspect run from an entity run")]
struct Args {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Entity run file.
    #[arg(long)]
    entity_run: PathBuf,

    /// Run file to append to.
    #[arg(long)]
    output: PathBuf,

    /// Number of top entities considered per query.
    #[arg(long, short, default_value_t = DEFAULT_TOP_K)]
    k: usize,

    #[command(flatten)]
    display: DisplayArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = AspectRankConfig {
        k: args.k,
        progress: args.display.progress(),
    };
    config.validate()?;

    let entity_ranking = read_run(&args.entity_run)
        .with_context(|| format!("reading entity run {}", args.entity_run.display()))?;
    rank_aspects(&args.corpus.corpus(), &entity_ranking, &args.output, &config)?;
    Ok(())
}
