//! Builds unbalanced pointwise data, with entity ids, for dev and test runs.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use aspectlink::cli::{init_logging, CorpusArgs, DisplayArgs};
use aspectlink::pipeline::make_eval_data;
use aspectlink::{ContextType, DescriptionStore, EvalDataConfig};

#[derive(Debug, Parser)]
#[command(name = "make-eval-data", version, about = "Pointwise evaluation data with entity ids")]
struct Args {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Entity description TSV written by `make-desc-file`.
    #[arg(long)]
    desc: PathBuf,

    /// JSONL file to append to.
    #[arg(long)]
    output: PathBuf,

    /// Context span used as query text: `sent` or `para`.
    #[arg(long)]
    context_type: ContextType,

    #[command(flatten)]
    display: DisplayArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = EvalDataConfig {
        context_type: args.context_type,
        progress: args.display.progress(),
    };
    config.validate()?;

    let descriptions = DescriptionStore::load_tsv(&args.desc)
        .with_context(|| format!("loading descriptions from {}", args.desc.display()))?;
    make_eval_data(
        &args.corpus.corpus(),
        Arc::new(descriptions),
        &args.output,
        &config,
    )?;
    Ok(())
}
