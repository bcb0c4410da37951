//! Codecritic CLI entry point.

use clap::Parser;
use codecritic::cli::{self, Cli, Commands, EXIT_ERROR};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("codecritic=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Analyze(args) => cli::run_analyze(args, &cli.config).await,
        Commands::Batch(args) => cli::run_batch(args, &cli.config).await,
        Commands::Languages => cli::run_languages(&cli.config),
        Commands::Health => cli::run_health(&cli.config).await,
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
