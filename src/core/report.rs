//! Batch reporting
//!
//! Totals, failures and per-category annotation counts for a batch run.

use super::pipeline::DeidentifiedDocument;
use crate::domain::{DeidError, DocumentId, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Report over a batch of documents
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total_documents: usize,
    pub successful: usize,
    pub failed: usize,

    /// Total annotations over all successful documents
    pub total_annotations: usize,

    /// Annotation counts keyed by category label
    pub annotations_by_category: BTreeMap<String, usize>,

    pub failures: Vec<DocumentFailure>,

    pub stats: ProcessingStats,
}

/// A document that could not be de-identified
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    pub document_id: String,
    pub error: String,
    /// Caused by the document rather than by configuration
    pub input_error: bool,
}

/// Processing statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingStats {
    pub total_processing_time_ms: u64,
    pub avg_processing_time_ms: u64,
    pub max_processing_time_ms: u64,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a de-identified document
    pub fn add_success(&mut self, document: &DeidentifiedDocument, processing_time_ms: u64) {
        self.successful += 1;
        self.total_annotations += document.annotations.len();
        for annotation in &document.annotations {
            *self
                .annotations_by_category
                .entry(annotation.tag().label().to_string())
                .or_insert(0) += 1;
        }
        self.record_time(processing_time_ms);
    }

    /// Record a failed document
    pub fn add_failure(&mut self, document_id: &DocumentId, error: &DeidError, processing_time_ms: u64) {
        self.failed += 1;
        self.failures.push(DocumentFailure {
            document_id: document_id.to_string(),
            error: error.to_string(),
            input_error: error.is_input_error(),
        });
        self.record_time(processing_time_ms);
    }

    fn record_time(&mut self, processing_time_ms: u64) {
        self.total_documents += 1;
        self.stats.total_processing_time_ms += processing_time_ms;
        self.stats.max_processing_time_ms = self.stats.max_processing_time_ms.max(processing_time_ms);
        self.stats.avg_processing_time_ms =
            self.stats.total_processing_time_ms / self.total_documents as u64;
    }

    /// No document failed
    pub fn is_successful(&self) -> bool {
        self.failed == 0
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                  DE-IDENTIFICATION REPORT                     \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("📊 SUMMARY\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("  Documents Processed:   {}\n", self.total_documents));
        output.push_str(&format!("  Successful:            {}\n", self.successful));
        output.push_str(&format!("  Failed:                {}\n", self.failed));
        output.push_str(&format!("  Annotations:           {}\n", self.total_annotations));
        output.push_str(&format!(
            "  Avg Processing Time:   {} ms\n",
            self.stats.avg_processing_time_ms
        ));
        output.push('\n');

        if !self.annotations_by_category.is_empty() {
            output.push_str("🔍 ANNOTATIONS BY CATEGORY\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");

            let mut categories: Vec<_> = self.annotations_by_category.iter().collect();
            categories.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

            for (category, count) in categories {
                output.push_str(&format!("  {category:30} {count:>5}\n"));
            }
            output.push('\n');
        }

        if !self.failures.is_empty() {
            output.push_str("⚠️  FAILURES\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for failure in &self.failures {
                output.push_str(&format!("  • {}: {}\n", failure.document_id, failure.error));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to a file
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.format_json()?)?;
        Ok(())
    }
}
