//! Linestrain - per-line prose strain linting CLI
//!
//! A fast, local-first lint that scores every line of your docs for
//! statistical strain and flags the ones that read like generated
//! filler.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Parse CLI args first so --log-level can seed the filter
    let cli = linestrain::cli::Cli::parse();

    // LINESTRAIN_LOG env var wins over --log-level
    let filter = EnvFilter::try_from_env("LINESTRAIN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    linestrain::cli::run(cli)
}
