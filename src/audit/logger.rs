//! Audit logger for de-identification runs

use crate::core::pipeline::DeidentifiedDocument;
use crate::domain::{Annotation, DeidError, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry<'a> {
    timestamp: String,
    document_id: &'a str,
    annotation_count: usize,
    processing_time_ms: u64,
    annotations: Vec<AuditAnnotation>,
}

/// Audited annotation, the raw value is only present as a hash
#[derive(Debug, Serialize)]
struct AuditAnnotation {
    category: &'static str,
    start_char: usize,
    end_char: usize,
    value_hash: String,
}

impl From<&Annotation> for AuditAnnotation {
    fn from(annotation: &Annotation) -> Self {
        Self {
            category: annotation.tag().label(),
            start_char: annotation.start_char(),
            end_char: annotation.end_char(),
            value_hash: hash_value(annotation.text()),
        }
    }
}

/// SHA-256 of a value, lowercase hex
pub fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Appends audit records to a file
#[derive(Debug)]
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    write_lock: Mutex<()>,
}

impl AuditLogger {
    /// Create a logger, creating the parent directory if needed
    pub fn new(log_path: impl Into<PathBuf>, json_format: bool) -> Result<Self> {
        let log_path = log_path.into();
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DeidError::Io(format!(
                    "Failed to create audit log directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        Ok(Self {
            log_path,
            json_format,
            write_lock: Mutex::new(()),
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Record a de-identified document
    pub fn log_document(&self, document: &DeidentifiedDocument, processing_time_ms: u64) -> Result<()> {
        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            document_id: document.id.as_str(),
            annotation_count: document.annotations.len(),
            processing_time_ms,
            annotations: document.annotations.iter().map(AuditAnnotation::from).collect(),
        };

        let line = if self.json_format {
            serde_json::to_string(&entry)?
        } else {
            let categories: Vec<&str> = entry.annotations.iter().map(|a| a.category).collect();
            format!(
                "[{}] Document: {} | Annotations: {} | Categories: {} | Time: {}ms",
                entry.timestamp,
                entry.document_id,
                entry.annotation_count,
                categories.join(","),
                entry.processing_time_ms
            )
        };

        self.write_line(&line)
    }

    fn write_line(&self, line: &str) -> Result<()> {
        // A poisoned lock leaves the file intact
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| {
                DeidError::Io(format!(
                    "Failed to open audit log {}: {e}",
                    self.log_path.display()
                ))
            })?;

        file.write_all(format!("{line}\n").as_bytes())
            .map_err(|e| DeidError::Io(format!("Failed to write audit entry: {e}")))
    }
}
