//! Configuration schema types
//!
//! Every section has defaults, so an empty file is a valid configuration.

use crate::core::merge::DEFAULT_SLACK_PATTERN;
use crate::logging::structured::{parse_log_level, parse_rotation};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upper bound for `pipeline.batch_concurrency`
pub const MAX_BATCH_CONCURRENCY: usize = 256;

/// Upper bound for `pipeline.edit_distance_threshold`
pub const MAX_EDIT_DISTANCE_THRESHOLD: usize = 5;

/// Root configuration, maps to `deid.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeidConfig {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub annotators: AnnotatorsConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DeidConfig {
    /// Validates the configuration
    ///
    /// Annotator names in `pipeline.annotators_enabled` are checked later,
    /// against the loaded library, when the pipeline is built.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.pipeline.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        parse_log_level(&self.log_level)
            .map(|_| ())
            .map_err(|_| {
                format!(
                    "Invalid log_level '{}'. Must be one of: trace, debug, info, warn, error",
                    self.log_level
                )
            })
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Consolidation pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Annotators run when a caller does not name any; `None` runs the whole library
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotators_enabled: Option<Vec<String>>,

    /// Regex that must match the whole gap between two mergeable annotations
    #[serde(default = "default_slack_pattern")]
    pub slack_pattern: String,

    /// Maximum Damerau-Levenshtein distance for two values to share a number
    #[serde(default = "default_edit_distance_threshold")]
    pub edit_distance_threshold: usize,

    /// Documents processed at once by the batch API
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(names) = &self.annotators_enabled {
            if names.iter().any(|n| n.trim().is_empty()) {
                return Err("pipeline.annotators_enabled contains an empty name".to_string());
            }
        }

        regex::Regex::new(&self.slack_pattern)
            .map_err(|e| format!("Invalid pipeline.slack_pattern: {e}"))?;

        if self.edit_distance_threshold > MAX_EDIT_DISTANCE_THRESHOLD {
            return Err(format!(
                "pipeline.edit_distance_threshold must be <= {MAX_EDIT_DISTANCE_THRESHOLD}"
            ));
        }

        if self.batch_concurrency == 0 || self.batch_concurrency > MAX_BATCH_CONCURRENCY {
            return Err(format!(
                "pipeline.batch_concurrency must be between 1 and {MAX_BATCH_CONCURRENCY}"
            ));
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            annotators_enabled: None,
            slack_pattern: default_slack_pattern(),
            edit_distance_threshold: default_edit_distance_threshold(),
            batch_concurrency: default_batch_concurrency(),
        }
    }
}

/// Annotator library source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotatorsConfig {
    /// Path to an annotator library TOML; the built-in library when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<PathBuf>,
}

/// Audit log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// One JSON object per line instead of plain text
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err("audit.log_path must be set when audit.enabled = true".to_string());
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to `local_path`
    #[serde(default)]
    pub local_enabled: bool,

    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// daily, hourly or never
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        parse_rotation(&self.local_rotation).map_err(|_| {
            format!(
                "Invalid logging.local_rotation '{}'. Must be one of: daily, hourly, never",
                self.local_rotation
            )
        })?;

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path must be set when logging.local_enabled = true".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_slack_pattern() -> String {
    DEFAULT_SLACK_PATTERN.to_string()
}

fn default_edit_distance_threshold() -> usize {
    1
}

fn default_batch_concurrency() -> usize {
    4
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/deid_audit.log")
}

fn default_true() -> bool {
    true
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = DeidConfig::default();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.pipeline.slack_pattern, DEFAULT_SLACK_PATTERN);
        assert_eq!(config.pipeline.edit_distance_threshold, 1);
        assert_eq!(config.pipeline.batch_concurrency, 4);
        assert!(config.pipeline.annotators_enabled.is_none());
        assert!(config.annotators.library.is_none());
        assert!(!config.audit.enabled);
        assert!(config.audit.json_format);
        assert!(!config.logging.local_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: DeidConfig = toml::from_str("").unwrap();
        assert_eq!(config.pipeline.batch_concurrency, 4);
        assert_eq!(config.logging.local_rotation, "daily");
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pipeline_config_validation() {
        let mut config = PipelineConfig::default();
        assert!(config.validate().is_ok());

        config.slack_pattern = "[".to_string();
        assert!(config.validate().unwrap_err().contains("slack_pattern"));

        config.slack_pattern = DEFAULT_SLACK_PATTERN.to_string();
        config.batch_concurrency = 0;
        assert!(config.validate().is_err());

        config.batch_concurrency = MAX_BATCH_CONCURRENCY + 1;
        assert!(config.validate().is_err());

        config.batch_concurrency = 8;
        config.edit_distance_threshold = MAX_EDIT_DISTANCE_THRESHOLD + 1;
        assert!(config.validate().is_err());

        config.edit_distance_threshold = 0;
        config.annotators_enabled = Some(vec!["date_1".to_string(), " ".to_string()]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_audit_config_validation() {
        let mut config = AuditConfig {
            enabled: true,
            ..AuditConfig::default()
        };
        assert!(config.validate().is_ok());

        config.log_path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "size".to_string();
        assert!(config.validate().is_err());

        config.local_rotation = "hourly".to_string();
        config.local_enabled = true;
        config.local_path = String::new();
        assert!(config.validate().is_err());
    }
}
