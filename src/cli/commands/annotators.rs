//! List-annotators command implementation

use crate::cli::{EXIT_CONFIG_ERROR, EXIT_OK};
use crate::config::DeidConfig;
use crate::core::Deidentifier;
use clap::Args;
use serde::Serialize;

/// Arguments for the list-annotators command
#[derive(Args, Debug)]
pub struct ListAnnotatorsArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct AnnotatorRow<'a> {
    name: &'a str,
    kind: &'a str,
    category: &'static str,
    default: bool,
}

impl ListAnnotatorsArgs {
    /// Execute the list-annotators command
    pub async fn execute(&self, config: &DeidConfig) -> anyhow::Result<i32> {
        let deidentifier = match Deidentifier::from_config(config) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("❌ Failed to load annotators: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let defaults = deidentifier.default_annotators();
        let rows: Vec<AnnotatorRow> = deidentifier
            .library()
            .entries()
            .map(|entry| AnnotatorRow {
                name: &entry.name,
                kind: entry.kind,
                category: entry.category.label(),
                default: defaults.iter().any(|d| d == &entry.name),
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            println!("{:<24} {:<8} {:<16} DEFAULT", "NAME", "KIND", "CATEGORY");
            for row in &rows {
                println!(
                    "{:<24} {:<8} {:<16} {}",
                    row.name,
                    row.kind,
                    row.category,
                    if row.default { "yes" } else { "" }
                );
            }
        }

        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_default_library() {
        let args = ListAnnotatorsArgs { json: true };
        assert_eq!(args.execute(&DeidConfig::default()).await.unwrap(), EXIT_OK);
    }

    #[tokio::test]
    async fn test_unknown_default_annotator() {
        let mut config = DeidConfig::default();
        config.pipeline.annotators_enabled = Some(vec!["missing".to_string()]);

        let args = ListAnnotatorsArgs { json: false };
        assert_eq!(args.execute(&config).await.unwrap(), EXIT_CONFIG_ERROR);
    }
}
