//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::DeidConfig;
use crate::domain::errors::DeidError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "DEID_";

/// Loads configuration from a TOML file
///
/// 1. Reads the file
/// 2. Substitutes `${VAR}` placeholders from the environment
/// 3. Parses the TOML into [`DeidConfig`]
/// 4. Applies `DEID_<SECTION>_<KEY>` overrides
/// 5. Validates the result
///
/// # Errors
///
/// Returns [`DeidError::Configuration`] if any step fails.
///
/// # Examples
///
/// ```no_run
/// use deid::config::load_config;
///
/// let config = load_config("deid.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DeidConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DeidError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DeidError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML content, with substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<DeidConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: DeidConfig = toml::from_str(&contents)
        .map_err(|e| DeidError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_overrides(&mut config, |key| std::env::var(key).ok())?;

    config.validate().map_err(|e| {
        DeidError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables written as `${VAR_NAME}`
///
/// Comment lines are left alone.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(DeidError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        DeidError::Configuration(format!("Invalid value for {key}: '{value}'"))
    })
}

/// Applies `DEID_<SECTION>_<KEY>` overrides read through `lookup`
///
/// `DEID_PIPELINE_ANNOTATORS_ENABLED` takes a comma-separated list.
fn apply_overrides<F>(config: &mut DeidConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| {
        let key = format!("{ENV_PREFIX}{suffix}");
        lookup(&key).map(|value| (key, value))
    };

    if let Some((_, val)) = var("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Some((_, val)) = var("PIPELINE_ANNOTATORS_ENABLED") {
        config.pipeline.annotators_enabled = Some(
            val.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        );
    }
    if let Some((_, val)) = var("PIPELINE_SLACK_PATTERN") {
        config.pipeline.slack_pattern = val;
    }
    if let Some((key, val)) = var("PIPELINE_EDIT_DISTANCE_THRESHOLD") {
        config.pipeline.edit_distance_threshold = parse_override(&key, &val)?;
    }
    if let Some((key, val)) = var("PIPELINE_BATCH_CONCURRENCY") {
        config.pipeline.batch_concurrency = parse_override(&key, &val)?;
    }

    if let Some((_, val)) = var("ANNOTATORS_LIBRARY") {
        config.annotators.library = Some(PathBuf::from(val));
    }

    if let Some((key, val)) = var("AUDIT_ENABLED") {
        config.audit.enabled = parse_override(&key, &val)?;
    }
    if let Some((_, val)) = var("AUDIT_LOG_PATH") {
        config.audit.log_path = PathBuf::from(val);
    }
    if let Some((key, val)) = var("AUDIT_JSON_FORMAT") {
        config.audit.json_format = parse_override(&key, &val)?;
    }

    if let Some((key, val)) = var("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override(&key, &val)?;
    }
    if let Some((_, val)) = var("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some((_, val)) = var("LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
