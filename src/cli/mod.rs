//! CLI interface and argument parsing

pub mod commands;

use crate::config::{load_config, parse_config, DeidConfig};
use crate::domain::Result;
use clap::{Parser, Subcommand};

/// Exit code: success
pub const EXIT_OK: i32 = 0;
/// Exit code: at least one document failed
pub const EXIT_DOCUMENT_FAILURES: i32 = 1;
/// Exit code: configuration error
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Exit code: fatal error
pub const EXIT_FATAL: i32 = 5;

/// deid - clinical text de-identification
#[derive(Parser, Debug)]
#[command(name = "deid")]
#[command(version, about, long_about = None)]
#[command(author = "Deid Contributors")]
pub struct Cli {
    /// Path to configuration file; built-in defaults when omitted
    #[arg(short, long, env = "DEID_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DEID_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// De-identify text files, or stdin when no file is given
    Deidentify(commands::deidentify::DeidentifyArgs),

    /// Number the <TAG value> markers of already annotated text
    Cluster(commands::cluster::ClusterArgs),

    /// List the annotators of the active library
    ListAnnotators(commands::annotators::ListAnnotatorsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Load the configuration named on the command line
///
/// Without a path the defaults apply, still subject to `DEID_*` overrides.
pub fn load_cli_config(path: Option<&str>) -> Result<DeidConfig> {
    match path {
        Some(path) => load_config(path),
        None => parse_config(""),
    }
}
