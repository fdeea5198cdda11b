//! Writes `query_id \t text` for every query in the corpus.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use aspectlink::cli::{init_logging, CorpusArgs, DisplayArgs};
use aspectlink::pipeline::make_queries;
use aspectlink::{ContextType, QueriesConfig};

#[derive(Debug, Parser)]
#[command(name = "make-queries", version, about = "Query text file")]
struct Args {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// File to append to.
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

    let config = QueriesConfig {
        context_type: args.context_type,
        progress: args.display.progress(),
    };
    make_queries(&args.corpus.corpus(), &args.output, &config)?;
    Ok(())
}
