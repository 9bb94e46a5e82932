//! CLI entry point for patch sampling and cohort analysis

use clap::Parser;
use histoquant::io::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> histoquant::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.run()
}
