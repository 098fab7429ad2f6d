//! Configuration management
//!
//! `deid.toml` is optional; every setting has a default. Values may reference
//! environment variables as `${VAR_NAME}`, and any key can be overridden with
//! `DEID_<SECTION>_<KEY>` (for example `DEID_PIPELINE_BATCH_CONCURRENCY=8`).
//!
//! # Sections
//!
//! - [`ApplicationConfig`] - log level
//! - [`PipelineConfig`] - default annotators, merge slack, clustering threshold, batch concurrency
//! - [`AnnotatorsConfig`] - annotator library file
//! - [`AuditConfig`] - audit log
//! - [`LoggingConfig`] - log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [pipeline]
//! annotators_enabled = ["date_1", "date_2", "person_surname", "residence"]
//! edit_distance_threshold = 1
//! batch_concurrency = 4
//!
//! [annotators]
//! library = "${DEID_HOME}/annotators.toml"
//!
//! [audit]
//! enabled = true
//! log_path = "./audit/deid_audit.log"
//! ```
//!
//! ```rust,no_run
//! use deid::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("deid.toml")?;
//! println!("Batch concurrency: {}", config.pipeline.batch_concurrency);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config};
pub use schema::{
    AnnotatorsConfig, ApplicationConfig, AuditConfig, DeidConfig, LoggingConfig, PipelineConfig,
};
