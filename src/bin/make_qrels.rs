//! Writes TREC qrels for the true aspect's entities.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use aspectlink::cli::{init_logging, CorpusArgs, DisplayArgs};
use aspectlink::pipeline::make_qrels;

#[derive(Debug, Parser)]
#[command(name = "make-qrels", version, about = "Entity qrels from the true aspect")]
struct Args {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Qrel file to append to.
    #[arg(long)]
    output: PathBuf,

    #[command(flatten)]
    display: DisplayArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    make_qrels(&args.corpus.corpus(), &args.output, args.display.progress())?;
    Ok(())
}
