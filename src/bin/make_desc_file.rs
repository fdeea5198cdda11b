//! Projects the entity description corpus to `query_id \t entity_id \t desc`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use aspectlink::cli::init_logging;
use aspectlink::pipeline::make_desc_file;

#[derive(Debug, Parser)]
#[command(name = "make-desc-file", version, about = "Description TSV from the description corpus")]
struct Args {
    /// Description corpus (JSONL, optionally gzip-compressed).
    #[arg(long)]
    data: PathBuf,

    /// TSV file to append to.
    #[arg(long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    make_desc_file(&args.data, &args.output)
        .with_context(|| format!("projecting {}", args.data.display()))?;
    Ok(())
}
