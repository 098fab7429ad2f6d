//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold `ENV_MUTEX` so they do not
//! interfere with each other.

use deid::config::load_config;
use deid::Deidentifier;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    std::env::remove_var("DEID_APPLICATION_LOG_LEVEL");
    std::env::remove_var("DEID_PIPELINE_ANNOTATORS_ENABLED");
    std::env::remove_var("DEID_PIPELINE_BATCH_CONCURRENCY");
    std::env::remove_var("DEID_AUDIT_ENABLED");
    std::env::remove_var("TEST_DEID_AUDIT_DIR");
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = config_file(
        r#"
[application]
log_level = "debug"

[pipeline]
annotators_enabled = ["person_surname", "date_1", "residence"]
slack_pattern = '[\s\-]?'
edit_distance_threshold = 2
batch_concurrency = 8

[audit]
enabled = true
log_path = "/var/log/deid/audit.log"
json_format = false

[logging]
local_enabled = true
local_path = "/var/log/deid"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(
        config.pipeline.annotators_enabled,
        Some(vec![
            "person_surname".to_string(),
            "date_1".to_string(),
            "residence".to_string()
        ])
    );
    assert_eq!(config.pipeline.slack_pattern, r"[\s\-]?");
    assert_eq!(config.pipeline.edit_distance_threshold, 2);
    assert_eq!(config.pipeline.batch_concurrency, 8);
    assert!(config.audit.enabled);
    assert!(!config.audit.json_format);
    assert_eq!(config.audit.log_path, PathBuf::from("/var/log/deid/audit.log"));
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = config_file("[application]\nlog_level = \"warn\"\n");
    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "warn");
    assert!(config.pipeline.annotators_enabled.is_none());
    assert_eq!(config.pipeline.edit_distance_threshold, 1);
    assert_eq!(config.pipeline.batch_concurrency, 4);
    assert!(config.annotators.library.is_none());
    assert!(!config.audit.enabled);
    assert!(!config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "daily");

    // Defaults build a pipeline over the whole built-in library
    let deidentifier = Deidentifier::from_config(&config).unwrap();
    assert_eq!(deidentifier.default_annotators().len(), deidentifier.library().len());
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_DEID_AUDIT_DIR", "/srv/audit");

    let file = config_file(
        r#"
[audit]
# log_path = "${NOT_SET_BUT_COMMENTED}"
log_path = "${TEST_DEID_AUDIT_DIR}/deid.log"
"#,
    );
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.expect("Failed to load config");
    assert_eq!(config.audit.log_path, PathBuf::from("/srv/audit/deid.log"));
}

#[test]
fn test_missing_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = config_file("[annotators]\nlibrary = \"${TEST_DEID_AUDIT_DIR}/lib.toml\"\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_DEID_AUDIT_DIR"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("DEID_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("DEID_PIPELINE_ANNOTATORS_ENABLED", "date_1,date_2");
    std::env::set_var("DEID_PIPELINE_BATCH_CONCURRENCY", "16");

    let file = config_file(
        r#"
[application]
log_level = "info"

[pipeline]
annotators_enabled = ["residence"]
batch_concurrency = 2
"#,
    );
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.expect("Failed to load config");
    assert_eq!(config.application.log_level, "trace");
    assert_eq!(
        config.pipeline.annotators_enabled,
        Some(vec!["date_1".to_string(), "date_2".to_string()])
    );
    assert_eq!(config.pipeline.batch_concurrency, 16);
}

#[test]
fn test_invalid_override_value() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("DEID_AUDIT_ENABLED", "sometimes");

    let file = config_file("");
    let result = load_config(file.path());
    cleanup_env_vars();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("DEID_AUDIT_ENABLED"));
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let cases = [
        "[application]\nlog_level = \"loud\"\n",
        "[pipeline]\nbatch_concurrency = 0\n",
        "[pipeline]\nbatch_concurrency = 1000\n",
        "[pipeline]\nedit_distance_threshold = 9\n",
        "[pipeline]\nslack_pattern = '['\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
        "[pipeline]\nannotators_enabled = [\"\"]\n",
    ];

    for content in cases {
        let file = config_file(content);
        let err = load_config(file.path()).unwrap_err();
        assert!(
            err.to_string().contains("Configuration validation failed"),
            "unexpected error for {content:?}: {err}"
        );
    }
}

#[test]
fn test_malformed_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = config_file("[pipeline\nbatch_concurrency = 2\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}

#[test]
fn test_unknown_annotator_caught_when_building_pipeline() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = config_file("[pipeline]\nannotators_enabled = [\"date_1\", \"date_3\"]\n");
    let config = load_config(file.path()).expect("Names are checked against the library later");

    assert!(Deidentifier::from_config(&config).is_err());
}
