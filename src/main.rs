// Deid - Clinical text de-identification
// Copyright (c) 2025 Deid Contributors
// Licensed under the MIT License

use deid::cli::{load_cli_config, Cli, Commands, EXIT_CONFIG_ERROR, EXIT_FATAL};
use deid::config::{DeidConfig, LoggingConfig};
use deid::domain::{DeidError, Result};
use deid::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Init must work without a readable config
    let config = load_cli_config(cli.config.as_deref());

    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().ok().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(|_| LoggingConfig::default());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "deid - clinical text de-identification"
    );

    let exit_code = match execute_command(&cli, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            EXIT_FATAL
        }
    };

    // Flush file logs before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, config: Result<DeidConfig>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Init(args) => args.execute().await,
        Commands::ValidateConfig(args) => args.execute(cli.config.as_deref()).await,
        Commands::Deidentify(args) => match config {
            Ok(config) => args.execute(&config).await,
            Err(e) => Ok(config_error(&e)),
        },
        Commands::Cluster(args) => match config {
            Ok(config) => args.execute(&config).await,
            Err(e) => Ok(config_error(&e)),
        },
        Commands::ListAnnotators(args) => match config {
            Ok(config) => args.execute(&config).await,
            Err(e) => Ok(config_error(&e)),
        },
    }
}

fn config_error(error: &DeidError) -> i32 {
    tracing::error!(error = %error, "Failed to load configuration");
    eprintln!("❌ {error}");
    EXIT_CONFIG_ERROR
}
