//! Argument groups and logging setup shared by the command-line tools.

use std::io;
use std::path::PathBuf;

use clap::Args;
use tracing_subscriber::{fmt, EnvFilter};

use crate::corpus::CorpusFile;
use crate::progress::ProgressConfig;

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// The example corpus every tool reads.
#[derive(Debug, Clone, Args)]
pub struct CorpusArgs {
    /// Corpus file: one JSON example per line, gzip-compressed if it ends in `.gz`.
    #[arg(long)]
    pub data: PathBuf,

    /// Number of examples in the corpus. Only used for the progress bar.
    #[arg(long)]
    pub total: Option<u64>,
}

impl CorpusArgs {
    /// Opens the corpus lazily, carrying the length hint.
    #[must_use]
    pub fn corpus(&self) -> CorpusFile {
        CorpusFile::new(&self.data).with_length_hint(self.total)
    }
}

/// Terminal output switches.
#[derive(Debug, Clone, Copy, Args)]
pub struct DisplayArgs {
    /// Hide the progress bar.
    #[arg(long, short)]
    pub quiet: bool,
}

impl DisplayArgs {
    /// Progress settings for these switches.
    #[must_use]
    pub const fn progress(&self) -> ProgressConfig {
        ProgressConfig { hidden: self.quiet }
    }
}
