//! Cluster command implementation
//!
//! Numbers the `<TAG value>` markers of text that was annotated elsewhere.

use crate::cli::{EXIT_CONFIG_ERROR, EXIT_OK};
use crate::config::schema::MAX_EDIT_DISTANCE_THRESHOLD;
use crate::config::DeidConfig;
use crate::core::TagClusterer;
use anyhow::Context;
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

/// Arguments for the cluster command
#[derive(Args, Debug)]
pub struct ClusterArgs {
    /// Tagged text file; stdin when omitted
    pub file: Option<PathBuf>,

    /// Edit-distance threshold, overriding the configuration
    #[arg(long, value_parser = parse_max_distance)]
    pub max_distance: Option<usize>,
}

/// Edit-distance threshold within the configuration's bound
fn parse_max_distance(value: &str) -> Result<usize, String> {
    let distance: usize = value.parse().map_err(|e| format!("{e}"))?;
    if distance > MAX_EDIT_DISTANCE_THRESHOLD {
        return Err(format!("must be <= {MAX_EDIT_DISTANCE_THRESHOLD}"));
    }
    Ok(distance)
}

impl ClusterArgs {
    /// Execute the cluster command
    pub async fn execute(&self, config: &DeidConfig) -> anyhow::Result<i32> {
        if let Some(distance) = self.max_distance.filter(|d| *d > MAX_EDIT_DISTANCE_THRESHOLD) {
            eprintln!("❌ --max-distance {distance} exceeds the maximum of {MAX_EDIT_DISTANCE_THRESHOLD}");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let text = match &self.file {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read stdin")?;
                text
            }
        };

        let max_distance = self
            .max_distance
            .unwrap_or(config.pipeline.edit_distance_threshold);
        tracing::debug!(max_distance, "Clustering tagged text");

        print!("{}", TagClusterer::new(max_distance).cluster(&text));
        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_execute_with_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "<NAME Jansen> en <NAME Janssen>").unwrap();

        let args = ClusterArgs {
            file: Some(file.path().to_path_buf()),
            max_distance: Some(0),
        };
        assert_eq!(args.execute(&DeidConfig::default()).await.unwrap(), EXIT_OK);
    }

    #[test]
    fn test_max_distance_bounded_on_parse() {
        let parsed = Cli::try_parse_from(["deid", "cluster", "--max-distance", "5"]).unwrap();
        match parsed.command {
            Commands::Cluster(args) => assert_eq!(args.max_distance, Some(5)),
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Cli::try_parse_from(["deid", "cluster", "--max-distance", "6"]).is_err());
        assert!(Cli::try_parse_from(["deid", "cluster", "--max-distance", "-1"]).is_err());
    }

    #[tokio::test]
    async fn test_execute_rejects_large_max_distance() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "<NAME Jansen>").unwrap();

        let args = ClusterArgs {
            file: Some(file.path().to_path_buf()),
            max_distance: Some(MAX_EDIT_DISTANCE_THRESHOLD + 1),
        };
        assert_eq!(args.execute(&DeidConfig::default()).await.unwrap(), EXIT_CONFIG_ERROR);
    }

    #[tokio::test]
    async fn test_execute_missing_file() {
        let args = ClusterArgs {
            file: Some(PathBuf::from("/nonexistent/tagged.txt")),
            max_distance: None,
        };
        assert!(args.execute(&DeidConfig::default()).await.is_err());
    }
}
