//! Wallet Credit Scoring - Main Entry Point
//!
//! Loads a batch of wallet transactions, scores every wallet and writes the
//! score file and distribution chart.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wallet_credit_scoring::{
    config::{AppConfig, LoggingConfig},
    pipeline::Pipeline,
};

#[derive(Parser, Debug)]
#[command(name = "wallet-credit-scoring", about = "Score wallets from a transaction batch")]
struct Cli {
    /// Configuration file (defaults to config/config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transaction batch (JSON array)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Score CSV destination
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Distribution chart destination (.png or .svg)
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Skip rendering the distribution chart
    #[arg(long)]
    no_chart: bool,

    /// Model seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::load()?,
    };
    apply_overrides(&mut config, &cli);
    config.validate()?;

    init_logging(&config.logging)?;
    info!("Starting wallet credit scoring");
    info!(
        input = %config.input.path.display(),
        output = %config.output.scores_path.display(),
        seed = config.model.seed,
        contamination = config.model.contamination,
        "Configuration loaded"
    );

    let summary = Pipeline::new(config)
        .run()
        .context("Credit scoring pipeline failed")?;

    info!(
        transactions = summary.transactions,
        wallets = summary.wallets,
        actions = summary.actions.len(),
        "Done"
    );

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(input) = &cli.input {
        config.input.path = input.clone();
    }
    if let Some(output) = &cli.output {
        config.output.scores_path = output.clone();
    }
    if let Some(chart) = &cli.chart {
        config.report.chart_path = chart.clone();
    }
    if cli.no_chart {
        config.report.enabled = false;
    }
    if let Some(seed) = cli.seed {
        config.model.seed = seed;
    }
}

/// `RUST_LOG` adds directives for other targets; the crate's own level comes
/// from `logging.level`. Stage progress lines are `info` events, so a
/// stricter level hides them.
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = log_filter(logging)?;

    if logging.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

fn log_filter(logging: &LoggingConfig) -> Result<EnvFilter> {
    let directive = format!("wallet_credit_scoring={}", logging.level)
        .parse()
        .context("Invalid log level")?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_uses_configured_level() {
        let logging = LoggingConfig {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        };
        let filter = log_filter(&logging).unwrap();
        assert!(filter.to_string().contains("wallet_credit_scoring=warn"));
    }

    #[test]
    fn test_log_filter_rejects_unknown_level() {
        let logging = LoggingConfig {
            level: "loud".to_string(),
            format: "pretty".to_string(),
        };
        assert!(log_filter(&logging).is_err());
    }
}
