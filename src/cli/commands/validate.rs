//! Validate config command implementation

use crate::cli::{load_cli_config, EXIT_CONFIG_ERROR, EXIT_OK};
use crate::core::Deidentifier;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loads the file, validates it, and builds the pipeline so that the
    /// annotator library and default annotator names are checked as well.
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let shown_path = config_path.unwrap_or("<defaults>");
        tracing::info!(config_path = %shown_path, "Validating configuration");

        println!("🔍 Validating configuration: {shown_path}");
        println!();

        let config = match load_cli_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let deidentifier = match Deidentifier::from_config(&config) {
            Ok(d) => d,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        match &config.annotators.library {
            Some(path) => println!("  Annotator Library: {}", path.display()),
            None => println!("  Annotator Library: built-in"),
        }
        println!("  Annotators: {}", deidentifier.library().len());
        println!(
            "  Default Annotators: {}",
            deidentifier.default_annotators().join(", ")
        );
        println!("  Slack Pattern: {}", config.pipeline.slack_pattern);
        println!(
            "  Edit Distance Threshold: {}",
            config.pipeline.edit_distance_threshold
        );
        println!("  Batch Concurrency: {}", config.pipeline.batch_concurrency);
        if config.audit.enabled {
            println!("  Audit Log: {}", config.audit.log_path.display());
        } else {
            println!("  Audit Log: disabled");
        }
        println!();

        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_valid_config() {
        let file = config_file("[pipeline]\nannotators_enabled = [\"date_1\"]\n");
        let code = ValidateArgs {}
            .execute(Some(file.path().to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[tokio::test]
    async fn test_unknown_annotator_is_config_error() {
        let file = config_file("[pipeline]\nannotators_enabled = [\"date_7\"]\n");
        let code = ValidateArgs {}
            .execute(Some(file.path().to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG_ERROR);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let code = ValidateArgs {}
            .execute(Some("/nonexistent/deid.toml"))
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG_ERROR);
    }
}
