//! Command-line interface for codecritic.

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing::error;

use crate::config::{AppConfig, API_KEY_ENV};
use crate::language::{display_name_for_tag, ALL_LANGUAGES};
use crate::orchestrator::{AnalysisRequest, AnalyzeError, Orchestrator};
use crate::{batch, report};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_INVALID: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Code review pipeline combining rule-based static analysis with
/// generative AI review.
///
/// Every analysis runs the deterministic static analyzer; when a provider
/// API key is configured the same code is also reviewed by a generative
/// model, with the static result substituted transparently whenever the
/// model is unavailable or returns something unusable.
#[derive(Parser)]
#[command(name = "codecritic")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a config YAML file (default: auto-discover codecritic.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a single file, or stdin when no path is given
    #[command(visible_alias = "review")]
    Analyze(AnalyzeArgs),
    /// Analyze every recognized code file under a directory
    Batch(BatchArgs),
    /// List supported languages and input limits
    Languages,
    /// Report provider and cache status
    Health,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// File to analyze; reads stdin when omitted
    pub path: Option<PathBuf>,

    /// Language tag, or "auto" to detect
    #[arg(short, long, default_value = "auto")]
    pub language: String,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the batch command.
#[derive(Parser)]
pub struct BatchArgs {
    /// Directory to scan
    pub path: PathBuf,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

fn load_config(cli_config: &Option<PathBuf>) -> anyhow::Result<AppConfig> {
    AppConfig::load(cli_config.as_deref())
}

fn validate_format(format: &str) -> bool {
    format == "pretty" || format == "json"
}

/// Run the analyze command.
pub async fn run_analyze(args: &AnalyzeArgs, cli_config: &Option<PathBuf>) -> anyhow::Result<i32> {
    if !validate_format(&args.format) {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let (code, source) = match &args.path {
        Some(path) => {
            let code = std::fs::read_to_string(path)?;
            (code, path.display().to_string())
        }
        None => {
            let mut code = String::new();
            std::io::stdin().read_to_string(&mut code)?;
            (code, "<stdin>".to_string())
        }
    };

    let config = load_config(cli_config)?;
    let orchestrator = Orchestrator::from_config(&config);
    let request = AnalysisRequest::new(code, args.language.clone());

    match orchestrator.analyze(&request).await {
        Ok(response) => {
            if args.format == "json" {
                report::write_json(&response)?;
            } else {
                report::write_pretty(&source, &response);
            }
            Ok(EXIT_SUCCESS)
        }
        Err(AnalyzeError::Validation(e)) => {
            eprintln!("Error: {}", e);
            Ok(EXIT_INVALID)
        }
        Err(AnalyzeError::Internal(e)) => {
            error!(error = %e, "analysis failed unexpectedly");
            eprintln!("Error: internal failure, see logs");
            Ok(EXIT_ERROR)
        }
    }
}

/// Run the batch command.
pub async fn run_batch(args: &BatchArgs, cli_config: &Option<PathBuf>) -> anyhow::Result<i32> {
    if !validate_format(&args.format) {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    if !args.path.is_dir() {
        eprintln!("Error: not a directory: {}", args.path.display());
        return Ok(EXIT_ERROR);
    }

    let config = load_config(cli_config)?;
    let orchestrator = Orchestrator::from_config(&config);

    let summary = batch::run(&orchestrator, &args.path, &config.batch).await?;

    if summary.reports.is_empty() && summary.skipped == 0 {
        eprintln!("Warning: no files to analyze");
        return Ok(EXIT_SUCCESS);
    }

    if args.format == "json" {
        report::write_batch_json(&summary)?;
    } else {
        report::write_batch_pretty(&args.path.display().to_string(), &summary);
    }

    Ok(EXIT_SUCCESS)
}

/// Run the languages command.
pub fn run_languages(cli_config: &Option<PathBuf>) -> anyhow::Result<i32> {
    let config = load_config(cli_config)?;

    println!("Supported languages:");
    println!();
    for language in ALL_LANGUAGES {
        println!(
            "  {:<12} {}",
            language.as_str(),
            display_name_for_tag(language.as_str())
        );
    }
    println!();
    println!(
        "Input limits: {} to {} characters",
        config.limits.min_code_chars, config.limits.max_code_chars
    );

    Ok(EXIT_SUCCESS)
}

/// Run the health command.
pub async fn run_health(cli_config: &Option<PathBuf>) -> anyhow::Result<i32> {
    let config = load_config(cli_config)?;
    let orchestrator = Orchestrator::from_config(&config);

    println!("codecritic v{}", env!("CARGO_PKG_VERSION"));
    println!();

    if orchestrator.provider_configured() {
        println!("  provider:  configured (model {})", config.provider.model);
        // Give the warm-up probe a moment before reporting readiness.
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        match orchestrator.provider_ready() {
            Some(true) => println!("  probe:     reachable"),
            Some(false) => println!("  probe:     not yet reachable"),
            None => {}
        }
    } else {
        println!("  provider:  not configured (set {})", API_KEY_ENV);
    }

    if config.cache.enabled {
        println!(
            "  cache:     enabled (ttl {}s{})",
            config.cache.ttl_secs,
            if config.cache.persist { ", persistent" } else { "" }
        );
    } else {
        println!("  cache:     disabled");
    }

    println!("  languages: {}", ALL_LANGUAGES.len());

    Ok(EXIT_SUCCESS)
}
