//! Logging and observability
//!
//! Structured logging on top of `tracing`:
//! - human-readable console output
//! - optional JSON log files with rotation
//! - configurable log levels, overridable with `RUST_LOG`
//!
//! Log events carry document ids, counts, stage names and timings. Annotated
//! values are never logged.
//!
//! # Example
//!
//! ```no_run
//! use deid::logging::init_logging;
//! use deid::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the completion of a consolidation stage
///
/// # Example
///
/// ```no_run
/// use deid::log_stage_complete;
/// use std::time::Duration;
///
/// log_stage_complete!("overlap_resolver", 12, 9, Duration::from_micros(150));
/// ```
#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $input:expr, $output:expr, $duration:expr) => {
        tracing::debug!(
            stage = $stage,
            input = $input,
            output = $output,
            duration_us = $duration.as_micros() as u64,
            "Stage completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use deid::log_error_with_context;
/// use deid::domain::DeidError;
///
/// let error = DeidError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log batch progress
///
/// # Example
///
/// ```no_run
/// use deid::log_batch_progress;
///
/// log_batch_progress!(10, 200);
/// ```
#[macro_export]
macro_rules! log_batch_progress {
    ($current:expr, $total:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Processing batch"
        );
    };
}
