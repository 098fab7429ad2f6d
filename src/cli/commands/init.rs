//! Init command implementation
//!
//! Writes a sample `deid.toml`.

use crate::cli::{EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "deid.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Validate it: deid --config {} validate-config", self.output);
                println!("  3. Run: deid --config {} deidentify letter.txt", self.output);
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Sample configuration with every option and its default
    fn generate_config() -> String {
        r#"# deid configuration
#
# Every setting below shows its default. Values may reference environment
# variables as ${VAR_NAME}; any key can also be overridden with
# DEID_<SECTION>_<KEY>, e.g. DEID_PIPELINE_BATCH_CONCURRENCY=8.

[application]
# trace, debug, info, warn, error
log_level = "info"

[pipeline]
# Annotators run when none are named on the command line.
# Omit to run every annotator in the library.
# annotators_enabled = ["person_surname", "date_1", "date_2", "residence"]

# Regex that must match the whole gap between two same-category annotations
# for them to be merged
slack_pattern = '[\.\s\-,]?[\.\s]?'

# Values within this Damerau-Levenshtein distance share a number
edit_distance_threshold = 1

# Documents processed at once (1-256)
batch_concurrency = 4

[annotators]
# Annotator library; the built-in library when omitted
# library = "${DEID_HOME}/annotators.toml"

[audit]
# One record per document; annotated values are stored as SHA-256 hashes
enabled = false
log_path = "./audit/deid_audit.log"
json_format = true

[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"
# daily, hourly or never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeidConfig;
    use tempfile::tempdir;

    #[test]
    fn test_generated_config_parses_with_defaults() {
        let config: DeidConfig = toml::from_str(&InitArgs::generate_config()).unwrap();
        let defaults = DeidConfig::default();

        assert_eq!(config.pipeline.slack_pattern, defaults.pipeline.slack_pattern);
        assert_eq!(config.pipeline.batch_concurrency, defaults.pipeline.batch_concurrency);
        assert_eq!(config.audit.log_path, defaults.audit.log_path);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("deid.toml");
        fs::write(&output, "# existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_CONFIG_ERROR);
        assert_eq!(fs::read_to_string(&output).unwrap(), "# existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), EXIT_OK);
        assert!(fs::read_to_string(&output).unwrap().contains("[pipeline]"));
    }
}
